//! Conversation memory: the ordered chat transcript owned by one assistant.

pub mod conversation;

pub use conversation::{ConversationMemory, ConversationTurn, Role};
