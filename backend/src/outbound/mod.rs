//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: process-local repositories for database-free runs
//! - **images**: Cloudinary and in-memory image stores
//! - **security**: Argon2 password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business rules.

pub mod images;
pub mod memory;
pub mod persistence;
pub mod security;
