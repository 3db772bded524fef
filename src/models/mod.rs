//! Core data models for the image server.
//!
//! These entities represent the two managed resource types and their API
//! summaries. They map cleanly to database tables via `sqlx::FromRow` and
//! serialize naturally as JSON via `serde`.

pub mod product;
pub mod user;
