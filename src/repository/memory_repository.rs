use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MatchRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContactSubmission, Conversation, Identity, Interest, MatchFilter, Message, NewContact,
    NewIdentity, ParticipantPair, Profile, ProfileData, UserSummary,
};

struct StoredProfile {
    id: Uuid,
    data: ProfileData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    is_active: bool,
    seq: u64,
}

struct StoredConversation {
    id: Uuid,
    participants: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_seq: u64,
    touched_seq: u64,
}

impl StoredConversation {
    fn to_model(&self) -> Conversation {
        Conversation {
            id: self.id,
            participants: self.participants.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Default)]
struct Store {
    seq: u64,
    identities: HashMap<Uuid, Identity>,
    profiles: HashMap<Uuid, StoredProfile>,
    interests: Vec<Interest>,
    conversations: HashMap<Uuid, StoredConversation>,
    messages: Vec<Message>,
    contacts: Vec<ContactSubmission>,
}

impl Store {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn profile(&self, user_id: Uuid) -> Option<Profile> {
        let stored = self.profiles.get(&user_id)?;
        let identity = self.identities.get(&user_id)?;
        Some(Profile {
            id: stored.id,
            user: UserSummary::from(identity),
            data: stored.data.clone(),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            is_active: stored.is_active,
        })
    }
}

/// Process-local store used for `STORAGE_BACKEND=memory` and in tests.
///
/// All mutations happen under one write lock, which gives the same
/// insert-if-absent atomicity the Postgres unique constraints provide.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a conversation row directly, bypassing pair uniqueness.
    ///
    /// Used to load rows written before the pair constraint existed, which may
    /// duplicate a pair or reference fewer than two live identities.
    pub async fn import_conversation(&self, participants: Vec<Uuid>) -> Conversation {
        let mut store = self.store.write().await;
        let seq = store.next_seq();
        let now = Utc::now();
        let stored = StoredConversation {
            id: Uuid::new_v4(),
            participants,
            created_at: now,
            updated_at: now,
            created_seq: seq,
            touched_seq: seq,
        };
        let model = stored.to_model();
        store.conversations.insert(stored.id, stored);
        model
    }
}

#[async_trait::async_trait]
impl MatchRepository for MemoryRepository {
    async fn create_identity(&self, new: NewIdentity) -> AppResult<Identity> {
        let mut store = self.store.write().await;
        if store
            .identities
            .values()
            .any(|i| i.username == new.username)
        {
            return Err(AppError::Conflict("username already exists".into()));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        store.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.store.read().await.identities.get(&id).cloned())
    }

    async fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        Ok(self
            .store
            .read()
            .await
            .identities
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn delete_identity(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store.identities.remove(&id).is_none() {
            return Ok(false);
        }

        store.profiles.remove(&id);
        store
            .interests
            .retain(|i| i.sender_id != id && i.receiver_id != id);
        store.messages.retain(|m| m.sender_id != id);
        for conversation in store.conversations.values_mut() {
            conversation.participants.retain(|p| *p != id);
        }
        Ok(true)
    }

    async fn create_profile(&self, user_id: Uuid, data: &ProfileData) -> AppResult<Profile> {
        let mut store = self.store.write().await;
        if !store.identities.contains_key(&user_id) {
            return Err(AppError::NotFound("User not found".into()));
        }
        if store.profiles.contains_key(&user_id) {
            return Err(AppError::Conflict("profile already exists".into()));
        }

        let seq = store.next_seq();
        let now = Utc::now();
        store.profiles.insert(
            user_id,
            StoredProfile {
                id: Uuid::new_v4(),
                data: data.clone(),
                created_at: now,
                updated_at: now,
                is_active: true,
                seq,
            },
        );
        store
            .profile(user_id)
            .ok_or_else(|| AppError::Internal("profile vanished after insert".into()))
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        Ok(self.store.read().await.profile(user_id))
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        data: &ProfileData,
    ) -> AppResult<Option<Profile>> {
        let mut store = self.store.write().await;
        match store.profiles.get_mut(&user_id) {
            Some(stored) => {
                stored.data = data.clone();
                stored.updated_at = Utc::now();
            }
            None => return Ok(None),
        }
        Ok(store.profile(user_id))
    }

    async fn search_profiles(
        &self,
        exclude_user: Uuid,
        filter: Option<&MatchFilter>,
    ) -> AppResult<Vec<Profile>> {
        let store = self.store.read().await;
        let mut candidates: Vec<(u64, Profile)> = store
            .profiles
            .iter()
            .filter(|(user_id, _)| **user_id != exclude_user)
            .filter_map(|(user_id, stored)| store.profile(*user_id).map(|p| (stored.seq, p)))
            .filter(|(_, p)| filter.map_or(true, |f| f.matches(p)))
            .collect();

        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(candidates.into_iter().map(|(_, p)| p).collect())
    }

    async fn insert_interest_if_absent(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Interest>> {
        let mut store = self.store.write().await;
        if store
            .interests
            .iter()
            .any(|i| i.sender_id == sender_id && i.receiver_id == receiver_id)
        {
            return Ok(None);
        }

        let interest = Interest {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            created_at: Utc::now(),
            is_accepted: false,
        };
        store.interests.push(interest.clone());
        Ok(Some(interest))
    }

    async fn insert_conversation_if_absent(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<(Conversation, bool)> {
        let mut store = self.store.write().await;

        let existing = store
            .conversations
            .values()
            .filter(|c| {
                c.participants.contains(&pair.low()) && c.participants.contains(&pair.high())
            })
            .min_by_key(|c| c.created_seq);
        if let Some(existing) = existing {
            return Ok((existing.to_model(), false));
        }

        let seq = store.next_seq();
        let now = Utc::now();
        let stored = StoredConversation {
            id: Uuid::new_v4(),
            participants: vec![pair.low(), pair.high()],
            created_at: now,
            updated_at: now,
            created_seq: seq,
            touched_seq: seq,
        };
        let model = stored.to_model();
        store.conversations.insert(stored.id, stored);
        Ok((model, true))
    }

    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self
            .store
            .read()
            .await
            .conversations
            .get(&id)
            .map(StoredConversation::to_model))
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let store = self.store.read().await;
        let mut rows: Vec<&StoredConversation> = store
            .conversations
            .values()
            .filter(|c| c.participants.contains(&user_id))
            .collect();
        rows.sort_by(|a, b| b.touched_seq.cmp(&a.touched_seq));
        Ok(rows.into_iter().map(StoredConversation::to_model).collect())
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> AppResult<Message> {
        let mut store = self.store.write().await;
        let seq = store.next_seq();
        let now = Utc::now();

        let conversation = store
            .conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
        if !conversation.participants.contains(&sender_id) {
            return Err(AppError::Database(
                "sender is not a participant of the conversation".into(),
            ));
        }
        conversation.updated_at = now;
        conversation.touched_seq = seq;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content: content.to_string(),
            created_at: now,
            is_read: false,
        };
        store.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        Ok(self
            .store
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn find_message(&self, id: Uuid) -> AppResult<Option<Message>> {
        Ok(self
            .store
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn mark_message_read(&self, id: Uuid) -> AppResult<Option<Message>> {
        let mut store = self.store.write().await;
        Ok(store.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.is_read = true;
            m.clone()
        }))
    }

    async fn count_unread(&self, conversation_id: Uuid, viewer: Uuid) -> AppResult<i64> {
        let count = self
            .store
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && !m.is_read && m.sender_id != viewer)
            .count();
        Ok(count as i64)
    }

    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>> {
        Ok(self
            .store
            .read()
            .await
            .messages
            .iter()
            .rev()
            .find(|m| m.conversation_id == conversation_id)
            .cloned())
    }

    async fn insert_contact(&self, new: &NewContact) -> AppResult<ContactSubmission> {
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            email: new.email.clone(),
            subject: new.subject.clone(),
            message: new.message.clone(),
            created_at: Utc::now(),
            is_read: false,
        };
        self.store.write().await.contacts.push(submission.clone());
        Ok(submission)
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}
