use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{message::MessageView, profile::Profile};
use crate::error::AppError;

/// Canonical key of a two-party conversation.
///
/// The two identities are stored sorted so that (a, b) and (b, a) map to the
/// same key; the store enforces uniqueness on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: Uuid,
    high: Uuid,
}

impl ParticipantPair {
    pub fn new(a: Uuid, b: Uuid) -> Result<Self, AppError> {
        if a == b {
            return Err(AppError::SelfReference(
                "Cannot create a conversation with yourself".into(),
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    /// Current participants. Fewer than two once an identity is deleted.
    pub participants: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }

    /// First participant that is not `viewer`
    pub fn other_participant(&self, viewer: Uuid) -> Option<Uuid> {
        self.participants.iter().copied().find(|p| *p != viewer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: Uuid,
    pub participants: Vec<Profile>,
    pub other_participant: Option<Profile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message: Option<MessageView>,
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ab = ParticipantPair::new(a, b).unwrap();
        let ba = ParticipantPair::new(b, a).unwrap();

        assert_eq!(ab, ba);
        assert!(ab.low() < ab.high());
        assert_eq!((ab.low(), ab.high()), (a.min(b), a.max(b)));
    }

    #[test]
    fn test_pair_rejects_self() {
        let a = Uuid::new_v4();
        assert!(matches!(
            ParticipantPair::new(a, a),
            Err(AppError::SelfReference(_))
        ));
    }

    #[test]
    fn test_other_participant() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let conv = Conversation {
            id: Uuid::new_v4(),
            participants: vec![a, b],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(conv.other_participant(a), Some(b));
        assert_eq!(conv.other_participant(b), Some(a));

        let degenerate = Conversation {
            participants: vec![a],
            ..conv
        };
        assert_eq!(degenerate.other_participant(a), None);
    }
}
