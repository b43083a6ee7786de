use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
use crate::model::{MatchResult, Resolution};
use crate::preprocess;
use crate::similarity::matches_term;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Greetings and help requests longer than this are treated as real questions.
pub const SHORT_INPUT_TOKENS: usize = 3;

pub const QUESTION_WORDS: &[&str] = &["how", "what", "where", "when", "why", "can", "do"];

/// Word groups guessed at when the whole input is a single word, with their options prompt.
const TOPIC_GROUPS: &[(&str, &[&str], &str)] = &[
    (
        "vehicle",
        &["vehicle", "car", "vehical"],
        "I can help with vehicles! Do you want to:\n• Add a new vehicle?\n• Edit an existing vehicle?\n• Delete a vehicle?\n\nPlease let me know what you need!",
    ),
    (
        "booking",
        &["book", "booking", "appoint"],
        "I can help with appointments! Do you want to:\n• Book a new appointment?\n• View your appointments?\n• Cancel an appointment?\n\nPlease specify!",
    ),
    (
        "service",
        &["service", "repair", "servic"],
        "We offer many services! Types include:\n• Regular Service\n• Oil Change\n• Brake Service\n• Engine Repair\n• AC Service\nAnd more! What specific service do you need?",
    ),
    (
        "pricing",
        &["price", "cost", "payment", "pay"],
        "About pricing:\n• Prices vary by service type\n• 5% discount on weekdays!\n• Pay after service completion\n• Accept cash & cards\n\nWhat would you like to know?",
    ),
];

const TOPIC_MENU_ANSWER: &str = "I'm not sure about that specific question. Here are some topics I can help with:\n\n📅 Booking appointments\n🚗 Adding/managing vehicles\n💰 Discounts & payments\n📊 Service status\n⭐ Feedback & reviews\n\nPlease try asking about one of these topics, or click a question below!";

const UNRECOGNIZED_ANSWER: &str = "I didn't quite understand that. 🤔 Let me help you! I can answer questions about:\n\n• How to book appointments\n• Adding your vehicle\n• Service types & pricing\n• Off-peak discounts\n• Canceling bookings\n• Payment methods\n\nTry clicking a question below or ask in your own words!";

static BUILTIN: Lazy<IntentResolver> =
    Lazy::new(|| IntentResolver::new(Arc::new(KnowledgeBase::builtin())));

/// Resolves input against the built-in knowledge base.
pub fn resolve(input: &str) -> MatchResult {
    BUILTIN.resolve(input)
}

fn is_question_word(token: &str) -> bool {
    QUESTION_WORDS.contains(&token)
}

fn any_match(tokens: &[String], triggers: &[String]) -> bool {
    tokens
        .iter()
        .any(|token| triggers.iter().any(|trigger| matches_term(token, trigger)))
}

/// Points a token earns against one keyword.
///
/// Deliberate departure from plain similarity: a question word only counts
/// when it is the keyword itself. Otherwise "can" lands inside "cancel", and
/// "Can I edit my appointment?" or "can I pay by card" would score the
/// cancellation entry. This is the only place the rule lives.
fn keyword_points(token: &str, keyword: &str) -> u32 {
    let hit = if is_question_word(token) {
        token == keyword
    } else {
        matches_term(token, keyword)
    };
    if hit {
        2
    } else {
        0
    }
}

fn entry_score(entry: &KnowledgeEntry, tokens: &[String]) -> u32 {
    entry
        .keywords
        .iter()
        .flat_map(|keyword| tokens.iter().map(move |token| keyword_points(token, keyword)))
        .sum()
}

#[derive(Debug, Clone)]
pub struct IntentResolver {
    knowledge: Arc<KnowledgeBase>,
}

impl IntentResolver {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    /// Maps any input to an answer. Never fails and never returns an empty answer.
    pub fn resolve(&self, input: &str) -> MatchResult {
        let tokens = preprocess::tokens(input);
        let result = self.resolve_tokens(&tokens);
        log::debug!(
            "Resolved {:?} ({} tokens) as {:?}",
            input,
            tokens.len(),
            result.resolution
        );
        result
    }

    fn resolve_tokens(&self, tokens: &[String]) -> MatchResult {
        let specials = self.knowledge.specials();
        let short = tokens.len() <= SHORT_INPUT_TOKENS;

        if short && any_match(tokens, &specials.greetings) {
            return MatchResult::matched(specials.greeting_answer.as_str(), Resolution::Greeting);
        }
        if any_match(tokens, &specials.thanks) {
            return MatchResult::matched(specials.thanks_answer.as_str(), Resolution::Thanks);
        }
        if short && any_match(tokens, &specials.help) {
            return MatchResult::matched(specials.help_answer.as_str(), Resolution::Help);
        }

        // The topic groups are all knowledge keywords, so this has to run before scoring.
        if let [word] = tokens {
            if let Some(result) = clarify_single_word(word) {
                return result;
            }
        }

        if let Some((entry, score)) = self.best_entry(tokens) {
            return MatchResult::matched(
                entry.answer.as_str(),
                Resolution::Knowledge {
                    category: entry.category.clone(),
                    score,
                },
            );
        }

        fallback(tokens)
    }

    /// Score of every entry, in knowledge-base order.
    pub fn score(&self, tokens: &[String]) -> Vec<u32> {
        self.knowledge
            .entries()
            .iter()
            .map(|entry| entry_score(entry, tokens))
            .collect()
    }

    /// Highest-scoring entry with at least one point; the earliest entry wins ties.
    fn best_entry(&self, tokens: &[String]) -> Option<(&KnowledgeEntry, u32)> {
        let mut best: Option<(&KnowledgeEntry, u32)> = None;
        for entry in self.knowledge.entries() {
            let score = entry_score(entry, tokens);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((entry, score));
            }
        }
        best
    }
}

impl Default for IntentResolver {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

fn clarify_single_word(word: &str) -> Option<MatchResult> {
    TOPIC_GROUPS
        .iter()
        .find(|(_, group, _)| group.iter().any(|w| matches_term(word, w)))
        .map(|(topic, _, prompt)| {
            MatchResult::matched(
                *prompt,
                Resolution::Clarify {
                    topic: topic.to_string(),
                },
            )
        })
}

fn fallback(tokens: &[String]) -> MatchResult {
    let has_question_word = tokens.iter().any(|t| is_question_word(t));
    let has_content = tokens
        .iter()
        .any(|t| !is_question_word(t) && t.chars().count() > 2);

    if has_question_word && has_content {
        MatchResult::matched(TOPIC_MENU_ANSWER, Resolution::TopicMenu)
    } else {
        MatchResult::unmatched(UNRECOGNIZED_ANSWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::QuickAction;

    fn answer_of(category: &str) -> String {
        KnowledgeBase::builtin()
            .entries()
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.answer.clone())
            .unwrap()
    }

    fn category_of(result: &MatchResult) -> Option<&str> {
        match &result.resolution {
            Resolution::Knowledge { category, .. } => Some(category.as_str()),
            _ => None,
        }
    }

    #[test]
    fn bare_greetings() {
        for input in ["hi", "Hello there!", "hey", "good morning", "helo"] {
            let result = resolve(input);
            assert_eq!(result.resolution, Resolution::Greeting, "{input}");
            assert!(result.matched);
        }
    }

    #[test]
    fn greeting_inside_a_question_falls_through_to_scoring() {
        let result = resolve("hi how do I book an appointment please");
        assert_eq!(category_of(&result), Some("booking"));
        assert_eq!(result.answer, answer_of("booking"));
    }

    #[test]
    fn thanks_has_no_length_cap() {
        assert_eq!(resolve("thanks").resolution, Resolution::Thanks);
        assert_eq!(
            resolve("ok that was really useful, thank you so much").resolution,
            Resolution::Thanks
        );
    }

    #[test]
    fn help_is_capped() {
        assert_eq!(resolve("support").resolution, Resolution::Help);
        assert_eq!(resolve("I need assistance").resolution, Resolution::Help);
        assert_ne!(
            resolve("please help me pay by card").resolution,
            Resolution::Help
        );
    }

    #[test]
    fn bare_help_is_answered_as_a_greeting() {
        // "help" is positionally similar to "hello" and greetings are checked first.
        let result = resolve("help");
        assert_eq!(result.resolution, Resolution::Greeting);
        assert_eq!(result.answer, KnowledgeBase::builtin().specials().greeting_answer);
    }

    #[test]
    fn canonical_questions_resolve_to_their_own_entry() {
        let base = KnowledgeBase::builtin();
        for (category, question) in base.questions() {
            let result = resolve(question);
            assert_eq!(category_of(&result), Some(category), "{question}");
            assert_eq!(result.answer, answer_of(category));
        }
    }

    #[test]
    fn quick_actions_resolve_to_their_own_entry() {
        let base = KnowledgeBase::builtin();
        for QuickAction { question, .. } in base.quick_actions() {
            let expected = base
                .entries()
                .iter()
                .find(|e| &e.question == question)
                .unwrap();
            let result = resolve(question);
            assert_eq!(category_of(&result), Some(expected.category.as_str()), "{question}");
        }
    }

    #[test]
    fn misspelled_keywords_still_match() {
        assert_eq!(category_of(&resolve("how to cancle my boking")), Some("cancel"));
        assert_eq!(category_of(&resolve("paymnt by card?")), Some("payment"));
        assert_eq!(category_of(&resolve("what are your opening hours")), Some("time"));
    }

    #[test]
    fn question_words_do_not_score_by_containment() {
        let tokens = preprocess::tokens("can i pay by card");
        let resolver = IntentResolver::default();
        let scores = resolver.score(&tokens);
        let base = resolver.knowledge();
        let cancel = base.entries().iter().position(|e| e.category == "cancel").unwrap();
        assert_eq!(scores[cancel], 0);
        assert_eq!(category_of(&resolver.resolve("can i pay by card")), Some("payment"));
        assert_eq!(category_of(&resolver.resolve("Can I edit my appointment?")), Some("edit"));
    }

    #[test]
    fn adding_a_keyword_never_lowers_a_score() {
        let resolver = IntentResolver::default();
        let mut tokens = preprocess::tokens("where is my car");
        let before = resolver.score(&tokens);
        tokens.push("appointment".to_string());
        let after = resolver.score(&tokens);
        for (b, a) in before.iter().zip(&after) {
            assert!(a >= b);
        }
        let booking = resolver
            .knowledge()
            .entries()
            .iter()
            .position(|e| e.category == "booking")
            .unwrap();
        assert!(after[booking] > before[booking]);
    }

    #[test]
    fn ties_go_to_the_earlier_entry() {
        let entries = vec![
            KnowledgeEntry {
                category: "first".to_string(),
                keywords: vec!["oil".to_string()],
                question: "Oil?".to_string(),
                answer: "first answer".to_string(),
            },
            KnowledgeEntry {
                category: "second".to_string(),
                keywords: vec!["oil".to_string()],
                question: "Oil again?".to_string(),
                answer: "second answer".to_string(),
            },
        ];
        let builtin = KnowledgeBase::builtin();
        let base =
            KnowledgeBase::new(entries, builtin.specials().clone(), vec![]).unwrap();
        let resolver = IntentResolver::new(Arc::new(base));
        for _ in 0..5 {
            assert_eq!(resolver.resolve("oil change").answer, "first answer");
        }
    }

    #[test]
    fn single_words_get_an_options_prompt() {
        let cases = [
            ("vehicle", "vehicle"),
            ("car", "vehicle"),
            ("booking", "booking"),
            ("repair", "service"),
            ("price", "pricing"),
        ];
        for (input, topic) in cases {
            let result = resolve(input);
            assert_eq!(
                result.resolution,
                Resolution::Clarify {
                    topic: topic.to_string()
                },
                "{input}"
            );
            assert!(result.matched);
            assert!(!result.is_confident());
        }
    }

    #[test]
    fn single_word_outside_groups_is_scored() {
        assert_eq!(category_of(&resolve("cancel")), Some("cancel"));
    }

    #[test]
    fn unknown_question_gets_topic_menu() {
        let result = resolve("why is the sky blue");
        assert_eq!(result.resolution, Resolution::TopicMenu);
        assert!(result.matched);
        assert_eq!(result.answer, TOPIC_MENU_ANSWER);
    }

    #[test]
    fn question_word_without_content_is_unrecognized() {
        let result = resolve("why do");
        assert_eq!(result.resolution, Resolution::Unrecognized);
    }

    #[test]
    fn noise_is_unrecognized() {
        let result = resolve("zzz qqq");
        assert!(!result.matched);
        assert_eq!(result.answer, UNRECOGNIZED_ANSWER);
    }

    #[test]
    fn every_input_gets_an_answer() {
        for input in ["", "   ", "?!", "\t\n", "a", "xyz", "🚗", "how", "hi hi hi hi"] {
            let result = resolve(input);
            assert!(!result.answer.is_empty(), "{input:?}");
        }
        assert!(!resolve("").matched);
    }
}
