use crate::{config::Config, repository::MatchRepository};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn MatchRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<dyn MatchRepository>, config: Arc<Config>) -> Self {
        Self { repo, config }
    }

    pub fn repo(&self) -> &dyn MatchRepository {
        self.repo.as_ref()
    }
}
