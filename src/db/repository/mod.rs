//! Repository trait definitions for database operations.
//!
//! This module provides a collection of focused repository traits that
//! abstract storage operations. By splitting responsibilities across multiple
//! traits, implementations can be more focused and testable.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`teachers`]: Teacher profiles and slot grids
//! - [`students`]: Student records (with phone uniqueness)
//! - [`sessions`]: The append-only session ledger
//! - [`finance`]: Transactions and monthly accounting summaries
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the
//! [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository>(repo: &R) -> RepositoryResult<()> {
//!     let teacher = repo.get_teacher(teacher_id).await?;
//!     repo.append_sessions(&sessions).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod finance;
pub mod sessions;
pub mod students;
pub mod teachers;

// Re-export error types
pub use error::{RepositoryError, RepositoryResult};

// Re-export all traits
pub use finance::FinanceRepository;
pub use sessions::SessionRepository;
pub use students::StudentRepository;
pub use teachers::TeacherRepository;

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all four
/// repository traits. Use this as a convenient bound when a service needs
/// access to every storage concern.
pub trait FullRepository:
    TeacherRepository + StudentRepository + SessionRepository + FinanceRepository
{
}

// Blanket implementation: implementing all four traits implies FullRepository
impl<T> FullRepository for T where
    T: TeacherRepository + StudentRepository + SessionRepository + FinanceRepository
{
}
