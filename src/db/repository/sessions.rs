//! Session ledger repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Session, SessionId, StudentId};

/// Repository trait for the append-only session ledger.
///
/// Sessions are appended by the booking engine and mutated only through
/// status updates; there is no delete operation by design.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Append a batch of freshly scheduled sessions to the ledger.
    async fn append_sessions(&self, sessions: &[Session]) -> RepositoryResult<()>;

    /// Retrieve a session by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the session doesn't exist
    async fn get_session(&self, session_id: SessionId) -> RepositoryResult<Session>;

    /// Replace a stored session (status/report updates only).
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the session doesn't exist
    async fn update_session(&self, session: &Session) -> RepositoryResult<()>;

    /// All ledger entries for one student, in append order.
    async fn sessions_for_student(&self, student_id: StudentId) -> RepositoryResult<Vec<Session>>;
}
