use validator::Validate;

use crate::error::AppResult;
use crate::models::{ContactSubmission, NewContact};
use crate::repository::MatchRepository;

pub const CONTACT_ACK: &str =
    "Your message has been sent successfully. We'll get back to you soon.";

pub struct ContactService;

impl ContactService {
    pub async fn submit(
        repo: &dyn MatchRepository,
        new: NewContact,
    ) -> AppResult<ContactSubmission> {
        new.validate()?;
        let submission = repo.insert_contact(&new).await?;
        tracing::info!(contact_id = %submission.id, "contact submission stored");
        Ok(submission)
    }
}
