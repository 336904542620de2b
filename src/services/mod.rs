pub mod auth_service;
pub mod contact_service;
pub mod conversation_service;
pub mod interest_service;
pub mod message_service;
pub mod profile_service;

pub use auth_service::AuthService;
pub use contact_service::ContactService;
pub use conversation_service::ConversationService;
pub use interest_service::InterestService;
pub use message_service::MessageService;
pub use profile_service::ProfileService;
