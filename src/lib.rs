pub mod api;
pub mod conversation;
pub mod knowledge;
pub mod model;
pub mod preprocess;
pub mod resolver;
pub mod settings;
pub mod similarity;

pub use conversation::{Conversation, PendingReply, SessionLimits, SessionStore, ThinkingDelay};
pub use knowledge::{KnowledgeBase, KnowledgeEntry, QuickAction, SpecialIntents};
pub use model::{MatchResult, Message, Resolution, Sender};
pub use resolver::{resolve, IntentResolver};
pub use settings::Settings;
pub use similarity::is_similar;
