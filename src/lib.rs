//! Matchmaking backend: identities, profiles, interests, two-party
//! conversations and a contact form, served over actix-web.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
