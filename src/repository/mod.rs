mod memory_repository;
mod postgres_repository;
mod r#trait;

pub use memory_repository::MemoryRepository;
pub use postgres_repository::PostgresRepository;
pub use r#trait::MatchRepository;
