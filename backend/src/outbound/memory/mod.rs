//! Process-local repositories for running without PostgreSQL.
//!
//! State lives behind a `Mutex` and is lost on restart. The server wires
//! these in when no database URL is configured; integration tests use them
//! to drive the full HTTP stack.

mod blog_repository;
mod user_repository;

pub use blog_repository::InMemoryBlogRepository;
pub use user_repository::InMemoryUserRepository;
