//! Database module: engine lifecycle, sessions, and the contact store.
//!
//! Layout:
//! - `engine.rs`: connection provider and the process-wide engine container
//! - `session.rs`: scoped session acquisition with commit/rollback and retry
//! - `contacts.rs`: row-level operations for the contact table
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database

pub mod contacts;
pub mod engine;
pub mod models;
pub mod schema;
pub mod session;

pub use engine::{Backend, Db, Engine, EngineChoice, get_engine};
pub use models::Contact;
