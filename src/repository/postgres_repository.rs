use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use uuid::Uuid;

use super::MatchRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    ContactSubmission, Conversation, Education, Identity, Interest, MaritalStatus, MatchFilter,
    Message, NewContact, NewIdentity, ParticipantPair, Profile, ProfileData, UserSummary,
};

const IDENTITY_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, created_at";

const PROFILE_SELECT: &str = r#"
    SELECT p.id, p.user_id, i.username, i.first_name, i.last_name,
           p.profile_picture, p.age, p.height, p.religion, p.marital_status, p.education,
           p.occupation, p.income, p.location, p.bio,
           p.preferred_age_min, p.preferred_age_max,
           p.preferred_height_min, p.preferred_height_max,
           p.preferred_religion, p.preferred_marital_status, p.preferred_education,
           p.preferred_location, p.preferred_income_min, p.preferred_income_max,
           p.created_at, p.updated_at, p.is_active
    FROM profiles p
    JOIN identities i ON i.id = p.user_id
"#;

// Participants come from the membership table, so a deleted identity drops out
const CONVERSATION_SELECT: &str = r#"
    SELECT c.id, c.created_at, c.updated_at,
           ARRAY(
               SELECT cp.user_id FROM conversation_participants cp
               WHERE cp.conversation_id = c.id
               ORDER BY cp.joined_at, cp.user_id
           ) AS participants
    FROM conversations c
"#;

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, created_at, is_read";

fn is_unique_violation(e: &tokio_postgres::Error) -> bool {
    e.code() == Some(&SqlState::UNIQUE_VIOLATION)
}

fn row_to_identity(row: &Row) -> Identity {
    Identity {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn parse_marital_status(row: &Row, column: &str) -> AppResult<MaritalStatus> {
    let raw: String = row.get(column);
    MaritalStatus::from_db(&raw)
        .ok_or_else(|| AppError::Database(format!("invalid {column} in database: {raw}")))
}

fn parse_education(row: &Row, column: &str) -> AppResult<Education> {
    let raw: String = row.get(column);
    Education::from_db(&raw)
        .ok_or_else(|| AppError::Database(format!("invalid {column} in database: {raw}")))
}

fn row_to_profile(row: &Row) -> AppResult<Profile> {
    Ok(Profile {
        id: row.get("id"),
        user: UserSummary {
            id: row.get("user_id"),
            username: row.get("username"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        },
        data: ProfileData {
            profile_picture: row.get("profile_picture"),
            age: row.get("age"),
            height: row.get("height"),
            religion: row.get("religion"),
            marital_status: parse_marital_status(row, "marital_status")?,
            education: parse_education(row, "education")?,
            occupation: row.get("occupation"),
            income: row.get("income"),
            location: row.get("location"),
            bio: row.get("bio"),
            preferred_age_min: row.get("preferred_age_min"),
            preferred_age_max: row.get("preferred_age_max"),
            preferred_height_min: row.get("preferred_height_min"),
            preferred_height_max: row.get("preferred_height_max"),
            preferred_religion: row.get("preferred_religion"),
            preferred_marital_status: parse_marital_status(row, "preferred_marital_status")?,
            preferred_education: parse_education(row, "preferred_education")?,
            preferred_location: row.get("preferred_location"),
            preferred_income_min: row.get("preferred_income_min"),
            preferred_income_max: row.get("preferred_income_max"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        is_active: row.get("is_active"),
    })
}

fn row_to_conversation(row: &Row) -> Conversation {
    Conversation {
        id: row.get("id"),
        participants: row.get("participants"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_message(row: &Row) -> Message {
    Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        is_read: row.get("is_read"),
    }
}

/// tokio-postgres backed repository over a deadpool pool
#[derive(Clone)]
pub struct PostgresRepository {
    pool: Pool,
}

impl PostgresRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MatchRepository for PostgresRepository {
    async fn create_identity(&self, new: NewIdentity) -> AppResult<Identity> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                &format!(
                    "INSERT INTO identities (id, username, email, first_name, last_name, password_hash)
                     VALUES ($1, $2, $3, $4, $5, $6)
                     RETURNING {IDENTITY_COLUMNS}"
                ),
                &[
                    &Uuid::new_v4(),
                    &new.username,
                    &new.email,
                    &new.first_name,
                    &new.last_name,
                    &new.password_hash,
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("username already exists".into())
                } else {
                    AppError::from(e)
                }
            })?;
        Ok(row_to_identity(&row))
    }

    async fn find_identity(&self, id: Uuid) -> AppResult<Option<Identity>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"),
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_identity))
    }

    async fn find_identity_by_username(&self, username: &str) -> AppResult<Option<Identity>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = $1"),
                &[&username],
            )
            .await?;
        Ok(row.as_ref().map(row_to_identity))
    }

    async fn delete_identity(&self, id: Uuid) -> AppResult<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM identities WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }

    async fn create_profile(&self, user_id: Uuid, data: &ProfileData) -> AppResult<Profile> {
        let client = self.pool.get().await?;
        let inserted = client
            .execute(
                r#"
                INSERT INTO profiles (
                    id, user_id, profile_picture, age, height, religion, marital_status, education,
                    occupation, income, location, bio,
                    preferred_age_min, preferred_age_max, preferred_height_min, preferred_height_max,
                    preferred_religion, preferred_marital_status, preferred_education,
                    preferred_location, preferred_income_min, preferred_income_max
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                        $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
                ON CONFLICT (user_id) DO NOTHING
                "#,
                &[
                    &Uuid::new_v4(),
                    &user_id,
                    &data.profile_picture,
                    &data.age,
                    &data.height,
                    &data.religion,
                    &data.marital_status.to_db(),
                    &data.education.to_db(),
                    &data.occupation,
                    &data.income,
                    &data.location,
                    &data.bio,
                    &data.preferred_age_min,
                    &data.preferred_age_max,
                    &data.preferred_height_min,
                    &data.preferred_height_max,
                    &data.preferred_religion,
                    &data.preferred_marital_status.to_db(),
                    &data.preferred_education.to_db(),
                    &data.preferred_location,
                    &data.preferred_income_min,
                    &data.preferred_income_max,
                ],
            )
            .await?;

        if inserted == 0 {
            return Err(AppError::Conflict("profile already exists".into()));
        }

        let row = client
            .query_one(&format!("{PROFILE_SELECT} WHERE p.user_id = $1"), &[&user_id])
            .await?;
        row_to_profile(&row)
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(&format!("{PROFILE_SELECT} WHERE p.user_id = $1"), &[&user_id])
            .await?;
        row.as_ref().map(row_to_profile).transpose()
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        data: &ProfileData,
    ) -> AppResult<Option<Profile>> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                r#"
                UPDATE profiles SET
                    profile_picture = $2, age = $3, height = $4, religion = $5,
                    marital_status = $6, education = $7, occupation = $8, income = $9,
                    location = $10, bio = $11,
                    preferred_age_min = $12, preferred_age_max = $13,
                    preferred_height_min = $14, preferred_height_max = $15,
                    preferred_religion = $16, preferred_marital_status = $17,
                    preferred_education = $18, preferred_location = $19,
                    preferred_income_min = $20, preferred_income_max = $21,
                    updated_at = NOW()
                WHERE user_id = $1
                "#,
                &[
                    &user_id,
                    &data.profile_picture,
                    &data.age,
                    &data.height,
                    &data.religion,
                    &data.marital_status.to_db(),
                    &data.education.to_db(),
                    &data.occupation,
                    &data.income,
                    &data.location,
                    &data.bio,
                    &data.preferred_age_min,
                    &data.preferred_age_max,
                    &data.preferred_height_min,
                    &data.preferred_height_max,
                    &data.preferred_religion,
                    &data.preferred_marital_status.to_db(),
                    &data.preferred_education.to_db(),
                    &data.preferred_location,
                    &data.preferred_income_min,
                    &data.preferred_income_max,
                ],
            )
            .await?;

        if updated == 0 {
            return Ok(None);
        }

        let row = client
            .query_one(&format!("{PROFILE_SELECT} WHERE p.user_id = $1"), &[&user_id])
            .await?;
        row_to_profile(&row).map(Some)
    }

    async fn search_profiles(
        &self,
        exclude_user: Uuid,
        filter: Option<&MatchFilter>,
    ) -> AppResult<Vec<Profile>> {
        let age_range = filter.and_then(MatchFilter::age_range);
        let religion = filter.and_then(MatchFilter::religion);
        let marital_status = filter.and_then(MatchFilter::marital_status);
        let education = filter.and_then(MatchFilter::education);
        let location = filter.and_then(MatchFilter::location);

        let mut clauses = vec!["p.user_id <> $1".to_string()];
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![&exclude_user];

        if let Some((min, max)) = &age_range {
            params.push(min);
            clauses.push(format!("p.age >= ${}", params.len()));
            params.push(max);
            clauses.push(format!("p.age <= ${}", params.len()));
        }
        for (column, value) in [
            ("p.religion", &religion),
            ("p.marital_status", &marital_status),
            ("p.education", &education),
            ("p.location", &location),
        ] {
            if let Some(value) = value {
                params.push(value);
                clauses.push(format!("{column} = ${}", params.len()));
            }
        }

        let sql = format!(
            "{PROFILE_SELECT} WHERE {} ORDER BY p.created_at DESC, p.id",
            clauses.join(" AND ")
        );

        let client = self.pool.get().await?;
        let rows = client.query(&sql, &params).await?;
        rows.iter().map(row_to_profile).collect()
    }

    async fn insert_interest_if_absent(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Interest>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                INSERT INTO interests (id, sender_id, receiver_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (sender_id, receiver_id) DO NOTHING
                RETURNING id, sender_id, receiver_id, created_at, is_accepted
                "#,
                &[&Uuid::new_v4(), &sender_id, &receiver_id],
            )
            .await?;

        Ok(row.map(|row| Interest {
            id: row.get("id"),
            sender_id: row.get("sender_id"),
            receiver_id: row.get("receiver_id"),
            created_at: row.get("created_at"),
            is_accepted: row.get("is_accepted"),
        }))
    }

    async fn insert_conversation_if_absent(
        &self,
        pair: ParticipantPair,
    ) -> AppResult<(Conversation, bool)> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        // A concurrent insert of the same pair blocks here until it commits,
        // then DO NOTHING returns no row and we fall through to the select.
        let inserted = tx
            .query_opt(
                r#"
                INSERT INTO conversations (id, participant_low, participant_high)
                VALUES ($1, $2, $3)
                ON CONFLICT (participant_low, participant_high) DO NOTHING
                RETURNING id
                "#,
                &[&Uuid::new_v4(), &pair.low(), &pair.high()],
            )
            .await?;

        let created = match inserted {
            Some(row) => {
                let id: Uuid = row.get("id");
                tx.execute(
                    "INSERT INTO conversation_participants (conversation_id, user_id)
                     VALUES ($1, $2), ($1, $3)",
                    &[&id, &pair.low(), &pair.high()],
                )
                .await?;
                true
            }
            None => false,
        };

        let row = tx
            .query_one(
                &format!(
                    "{CONVERSATION_SELECT} WHERE c.participant_low = $1 AND c.participant_high = $2"
                ),
                &[&pair.low(), &pair.high()],
            )
            .await?;
        tx.commit().await?;

        Ok((row_to_conversation(&row), created))
    }

    async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(&format!("{CONVERSATION_SELECT} WHERE c.id = $1"), &[&id])
            .await?;
        Ok(row.as_ref().map(row_to_conversation))
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "{CONVERSATION_SELECT}
                     WHERE EXISTS (
                         SELECT 1 FROM conversation_participants cp
                         WHERE cp.conversation_id = c.id AND cp.user_id = $1
                     )
                     ORDER BY c.updated_at DESC, c.created_at DESC"
                ),
                &[&user_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_conversation).collect())
    }

    async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> AppResult<Message> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let row = tx
            .query_one(
                &format!(
                    "INSERT INTO messages (id, conversation_id, sender_id, content)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {MESSAGE_COLUMNS}"
                ),
                &[&Uuid::new_v4(), &conversation_id, &sender_id, &content],
            )
            .await?;
        tx.execute(
            "UPDATE conversations SET updated_at = NOW() WHERE id = $1",
            &[&conversation_id],
        )
        .await?;
        tx.commit().await?;

        Ok(row_to_message(&row))
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE conversation_id = $1
                     ORDER BY created_at ASC, id ASC"
                ),
                &[&conversation_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_message).collect())
    }

    async fn find_message(&self, id: Uuid) -> AppResult<Option<Message>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"),
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_message))
    }

    async fn mark_message_read(&self, id: Uuid) -> AppResult<Option<Message>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!(
                    "UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
                ),
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_message))
    }

    async fn count_unread(&self, conversation_id: Uuid, viewer: Uuid) -> AppResult<i64> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM messages
                 WHERE conversation_id = $1 AND is_read = FALSE AND sender_id <> $2",
                &[&conversation_id, &viewer],
            )
            .await?;
        Ok(row.get(0))
    }

    async fn last_message(&self, conversation_id: Uuid) -> AppResult<Option<Message>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE conversation_id = $1
                     ORDER BY created_at DESC, id DESC
                     LIMIT 1"
                ),
                &[&conversation_id],
            )
            .await?;
        Ok(row.as_ref().map(row_to_message))
    }

    async fn insert_contact(&self, new: &NewContact) -> AppResult<ContactSubmission> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                r#"
                INSERT INTO contact_submissions (id, name, email, subject, message)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, name, email, subject, message, created_at, is_read
                "#,
                &[
                    &Uuid::new_v4(),
                    &new.name,
                    &new.email,
                    &new.subject,
                    &new.message,
                ],
            )
            .await?;

        Ok(ContactSubmission {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            subject: row.get("subject"),
            message: row.get("message"),
            created_at: row.get("created_at"),
            is_read: row.get("is_read"),
        })
    }

    async fn health_check(&self) -> AppResult<()> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}
