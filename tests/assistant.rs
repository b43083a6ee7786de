use std::sync::Arc;
use std::time::Duration;

use service_assistant::{
    is_similar, resolve, Conversation, IntentResolver, KnowledgeBase, Message, Resolution, Sender,
    ThinkingDelay,
};

fn booking_answer() -> String {
    KnowledgeBase::builtin()
        .entries()
        .iter()
        .find(|e| e.category == "booking")
        .map(|e| e.answer.clone())
        .unwrap()
}

#[test]
fn every_input_gets_a_non_empty_answer() {
    let inputs = [
        "",
        " ",
        "!!!???",
        "hi",
        "thanks",
        "What payment methods do you accept?",
        "qwertyuiop asdfghjkl",
        "how",
        "ñandú über straße",
        "a b c d e f g h i j k l m n o p",
    ];
    for input in inputs {
        assert!(!resolve(input).answer.is_empty(), "{input:?}");
    }
}

#[test]
fn words_are_similar_to_themselves() {
    for word in ["car", "appointment", "registration", "x", "off-peak"] {
        assert!(is_similar(word, word));
    }
}

#[test]
fn worked_similarity_examples() {
    assert!(!is_similar("book", "boking"));
    assert!(!is_similar("book", "buk"));
    assert!(is_similar("servis", "service"));
}

#[test]
fn short_greetings_get_the_greeting() {
    for input in ["hi", "hello there"] {
        let result = resolve(input);
        assert!(result.matched);
        assert_eq!(result.resolution, Resolution::Greeting);
    }
}

#[test]
fn long_sentence_with_greeting_is_answered_from_the_knowledge_base() {
    let result = resolve("hi how do I book an appointment please");
    assert!(result.matched);
    assert_eq!(result.answer, booking_answer());
}

#[test]
fn fallback_tiers() {
    let vehicle = resolve("vehicle");
    assert_eq!(
        vehicle.resolution,
        Resolution::Clarify {
            topic: "vehicle".to_string()
        }
    );
    assert!(vehicle.answer.contains("Add a new vehicle?"));

    // A question with a known keyword is scored, never sent to the topic menu.
    let keyworded = resolve("why is my appointment blue");
    assert!(keyworded.is_confident());
    assert_eq!(keyworded.answer, booking_answer());

    let menu = resolve("why is the sky blue");
    assert_eq!(menu.resolution, Resolution::TopicMenu);
    assert!(menu.matched);

    let noise = resolve("zzz qqq");
    assert_eq!(noise.resolution, Resolution::Unrecognized);
    assert!(!noise.matched);
}

#[test]
fn resolution_is_deterministic() {
    let resolver = IntentResolver::default();
    let first = resolver.resolve("where can I check the progress of my repair");
    for _ in 0..10 {
        assert_eq!(resolver.resolve("where can I check the progress of my repair"), first);
    }
}

#[tokio::test]
async fn unawaited_posts_are_answered_in_order() {
    let conversation = Conversation::start(
        Arc::new(IntentResolver::default()),
        ThinkingDelay::new(Duration::from_millis(5), Duration::from_millis(25)),
    );
    let questions = ["hello", "What are your service hours?", "zzz qqq"];
    let pending: Vec<_> = questions
        .iter()
        .map(|q| conversation.post(q).unwrap())
        .collect();

    let mut answers = Vec::new();
    for reply in pending.into_iter().rev() {
        answers.push(reply.wait().await.unwrap().answer);
    }
    answers.reverse();

    let transcript = conversation.transcript();
    let users: Vec<_> = transcript.iter().filter(|m| m.sender == Sender::User).collect();
    let bots: Vec<_> = transcript
        .iter()
        .filter(|m| m.sender == Sender::Bot)
        .skip(1)
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(users.len(), 3);
    assert_eq!(users[1], &Message::user("What are your service hours?"));
    assert_eq!(bots, answers);
}

#[tokio::test]
async fn dropped_session_never_gets_its_reply() {
    let conversation = Conversation::start(
        Arc::new(IntentResolver::default()),
        ThinkingDelay::fixed(Duration::from_secs(10)),
    );
    let pending = conversation.select_suggestion("How do I leave feedback?").unwrap();
    drop(conversation);
    assert!(pending.wait().await.is_none());
}
