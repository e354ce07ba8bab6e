//! Teacher repository trait: profiles and slot grids.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Teacher, TeacherId};

/// Repository trait for teacher records.
///
/// The teacher document (profile plus the whole slot grid) is the unit of
/// storage: `update_teacher` replaces it atomically, which is what makes a
/// multi-slot booking commit all-or-nothing. Callers serialize grid mutations
/// per teacher through the booking engine's lock registry; the repository
/// itself only guarantees that a single update is not interleaved.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TeacherRepository: Send + Sync {
    /// Check if the storage backend is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store a new teacher and assign its id.
    ///
    /// # Returns
    /// * `Ok(TeacherId)` - The id assigned to the stored teacher
    async fn store_teacher(&self, teacher: &Teacher) -> RepositoryResult<TeacherId>;

    /// Retrieve a teacher (profile and full slot grid) by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the teacher doesn't exist
    async fn get_teacher(&self, teacher_id: TeacherId) -> RepositoryResult<Teacher>;

    /// List all teachers.
    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>>;

    /// Replace a stored teacher document atomically.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the teacher doesn't exist
    async fn update_teacher(&self, teacher: &Teacher) -> RepositoryResult<()>;
}
