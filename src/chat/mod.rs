pub mod arithmetic;
pub mod conversation;
pub mod responder;

pub use conversation::{thinking_delay, ChatMessage, ChatRole, Conversation, SUGGESTIONS};
pub use responder::{classify, respond, Topic};
