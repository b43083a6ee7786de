use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One line of the transcript. `text` may contain newlines.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Which path of the resolver produced an answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Greeting,
    Thanks,
    Help,
    Knowledge { category: String, score: u32 },
    /// Single ambiguous word; the answer lists options for `topic`.
    Clarify { topic: String },
    /// A question about something outside the knowledge base.
    TopicMenu,
    Unrecognized,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub answer: String,
    pub resolution: Resolution,
}

impl MatchResult {
    pub fn matched(answer: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            matched: true,
            answer: answer.into(),
            resolution,
        }
    }

    pub fn unmatched(answer: impl Into<String>) -> Self {
        Self {
            matched: false,
            answer: answer.into(),
            resolution: Resolution::Unrecognized,
        }
    }

    /// True for greetings, thanks, help and knowledge-base hits; false for fallback answers.
    pub fn is_confident(&self) -> bool {
        !matches!(
            self.resolution,
            Resolution::Clarify { .. } | Resolution::TopicMenu | Resolution::Unrecognized
        )
    }
}
