pub mod error_handling;
pub mod guards;

pub use guards::{ConversationParticipant, User};
