//! Student repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Student, StudentId};

/// Repository trait for student records.
///
/// Phone uniqueness is enforced at this layer (the storage analog of a
/// unique index): `store_student` and `update_student` fail with
/// `RepositoryError::Conflict` when another student already holds the phone
/// number, archived or not.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Store a new student and assign its id.
    ///
    /// # Returns
    /// * `Ok(StudentId)` - The id assigned to the stored student
    /// * `Err(RepositoryError::Conflict)` - If the phone number is taken
    async fn store_student(&self, student: &Student) -> RepositoryResult<StudentId>;

    /// Retrieve a student by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the student doesn't exist
    async fn get_student(&self, student_id: StudentId) -> RepositoryResult<Student>;

    /// Find a student by phone number.
    async fn find_student_by_phone(&self, phone: &str) -> RepositoryResult<Option<Student>>;

    /// List all students, archived included.
    async fn list_students(&self) -> RepositoryResult<Vec<Student>>;

    /// Replace a stored student record.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the student doesn't exist
    /// * `Err(RepositoryError::Conflict)` - If the new phone number is taken
    async fn update_student(&self, student: &Student) -> RepositoryResult<()>;

    /// Remove a student record entirely.
    ///
    /// This is the compensating action for a failed creation flow (student
    /// stored, slot reservation rejected). Domain-level removal is archival,
    /// not deletion.
    async fn delete_student(&self, student_id: StudentId) -> RepositoryResult<()>;
}
