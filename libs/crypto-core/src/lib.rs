//! Credential primitives shared by the HTTP layer and the identity service:
//! bearer token issue/validation and password hashing.

pub mod jwt;
pub mod password;
