pub mod contact;
pub mod conversation;
pub mod identity;
pub mod interest;
pub mod message;
pub mod profile;

pub use contact::{ContactSubmission, NewContact};
pub use conversation::{Conversation, ConversationView, ParticipantPair};
pub use identity::{Identity, NewIdentity, UserSummary};
pub use interest::Interest;
pub use message::{Message, MessageView, SendMessageRequest};
pub use profile::{Education, MaritalStatus, MatchFilter, Profile, ProfileData, ProfilePatch};
