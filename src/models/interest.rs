use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Directed "sender is interested in receiver" fact, unique per ordered pair
#[derive(Debug, Clone, Serialize)]
pub struct Interest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_accepted: bool,
}
