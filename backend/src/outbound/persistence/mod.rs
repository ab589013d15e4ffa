//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs and domain types and
//! map database failures onto port errors. Row structs (`models.rs`) and the
//! schema (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```ignore
//! use storyscape::outbound::persistence::{DbPool, DieselBlogRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/storyscape")).await?;
//! let blogs = DieselBlogRepository::new(pool);
//! ```

mod diesel_blog_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_blog_repository::DieselBlogRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
