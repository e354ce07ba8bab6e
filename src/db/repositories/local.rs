//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing, local development and single-process
//! deployments. All data is stored in memory using HashMap and Vec
//! structures, providing fast, deterministic, and isolated execution.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::repository::*;
use crate::models::{
    AccountingSummary, MonthKey, Session, SessionId, Student, StudentId, Teacher, TeacherId,
    Transaction, TransactionId,
};

/// In-memory local repository.
///
/// Stores all data in HashMaps behind a single `RwLock`, so each repository
/// call is atomic with respect to every other call. Cross-call invariants
/// (e.g. "validate, then commit" during booking) are the responsibility of
/// the service layer's per-teacher serialization.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    teachers: HashMap<TeacherId, Teacher>,
    students: HashMap<StudentId, Student>,
    sessions: HashMap<SessionId, Session>,
    // Ledger append order, for deterministic per-student listings
    session_order: Vec<SessionId>,
    transactions: Vec<Transaction>,
    summaries: HashMap<MonthKey, AccountingSummary>,

    // ID counters
    next_teacher_id: i64,
    next_student_id: i64,
    next_transaction_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            teachers: HashMap::new(),
            students: HashMap::new(),
            sessions: HashMap::new(),
            session_order: Vec::new(),
            transactions: Vec::new(),
            summaries: HashMap::new(),
            next_teacher_id: 1,
            next_student_id: 1,
            next_transaction_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of teachers stored.
    pub fn teacher_count(&self) -> usize {
        self.data.read().unwrap().teachers.len()
    }

    /// Number of students stored.
    pub fn student_count(&self) -> usize {
        self.data.read().unwrap().students.len()
    }

    /// Number of ledger entries stored.
    pub fn session_count(&self) -> usize {
        self.data.read().unwrap().sessions.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::ConnectionError(
                "Database is not healthy".to_string(),
            ));
        }
        Ok(())
    }

    fn phone_conflict(data: &LocalData, phone: &str, exclude: Option<StudentId>) -> bool {
        data.students
            .values()
            .any(|s| s.phone == phone && Some(s.id) != exclude)
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeacherRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let data = self.data.read().unwrap();
        Ok(data.is_healthy)
    }

    async fn store_teacher(&self, teacher: &Teacher) -> RepositoryResult<TeacherId> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let teacher_id = TeacherId(data.next_teacher_id);
        data.next_teacher_id += 1;

        let mut stored = teacher.clone();
        stored.id = teacher_id;
        data.teachers.insert(teacher_id, stored);
        Ok(teacher_id)
    }

    async fn get_teacher(&self, teacher_id: TeacherId) -> RepositoryResult<Teacher> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.teachers
            .get(&teacher_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Teacher {} not found", teacher_id)))
    }

    async fn list_teachers(&self) -> RepositoryResult<Vec<Teacher>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        let mut teachers: Vec<Teacher> = data.teachers.values().cloned().collect();
        teachers.sort_by_key(|t| t.id);
        Ok(teachers)
    }

    async fn update_teacher(&self, teacher: &Teacher) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        if !data.teachers.contains_key(&teacher.id) {
            return Err(RepositoryError::NotFound(format!(
                "Teacher {} not found",
                teacher.id
            )));
        }
        data.teachers.insert(teacher.id, teacher.clone());
        Ok(())
    }
}

#[async_trait]
impl StudentRepository for LocalRepository {
    async fn store_student(&self, student: &Student) -> RepositoryResult<StudentId> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        if Self::phone_conflict(&data, &student.phone, None) {
            return Err(RepositoryError::Conflict(format!(
                "Phone number {} already registered",
                student.phone
            )));
        }

        let student_id = StudentId(data.next_student_id);
        data.next_student_id += 1;

        let mut stored = student.clone();
        stored.id = student_id;
        data.students.insert(student_id, stored);
        Ok(student_id)
    }

    async fn get_student(&self, student_id: StudentId) -> RepositoryResult<Student> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.students
            .get(&student_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Student {} not found", student_id)))
    }

    async fn find_student_by_phone(&self, phone: &str) -> RepositoryResult<Option<Student>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.students.values().find(|s| s.phone == phone).cloned())
    }

    async fn list_students(&self) -> RepositoryResult<Vec<Student>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        let mut students: Vec<Student> = data.students.values().cloned().collect();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    async fn update_student(&self, student: &Student) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        if !data.students.contains_key(&student.id) {
            return Err(RepositoryError::NotFound(format!(
                "Student {} not found",
                student.id
            )));
        }
        if Self::phone_conflict(&data, &student.phone, Some(student.id)) {
            return Err(RepositoryError::Conflict(format!(
                "Phone number {} already registered",
                student.phone
            )));
        }
        data.students.insert(student.id, student.clone());
        Ok(())
    }

    async fn delete_student(&self, student_id: StudentId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        if data.students.remove(&student_id).is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Student {} not found",
                student_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for LocalRepository {
    async fn append_sessions(&self, sessions: &[Session]) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        for session in sessions {
            data.sessions.insert(session.id, session.clone());
            data.session_order.push(session.id);
        }
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> RepositoryResult<Session> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        data.sessions
            .get(&session_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Session {} not found", session_id)))
    }

    async fn update_session(&self, session: &Session) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        if !data.sessions.contains_key(&session.id) {
            return Err(RepositoryError::NotFound(format!(
                "Session {} not found",
                session.id
            )));
        }
        data.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn sessions_for_student(&self, student_id: StudentId) -> RepositoryResult<Vec<Session>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data
            .session_order
            .iter()
            .filter_map(|id| data.sessions.get(id))
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FinanceRepository for LocalRepository {
    async fn add_transaction(&self, transaction: &Transaction) -> RepositoryResult<TransactionId> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        let id = TransactionId(data.next_transaction_id);
        data.next_transaction_id += 1;

        let mut stored = transaction.clone();
        stored.id = id;
        data.transactions.push(stored);
        Ok(id)
    }

    async fn transactions_in_month(&self, month: MonthKey) -> RepositoryResult<Vec<Transaction>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data
            .transactions
            .iter()
            .filter(|t| month.contains(t.date))
            .cloned()
            .collect())
    }

    async fn upsert_summary(&self, summary: &AccountingSummary) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write().unwrap();
        data.summaries.insert(summary.month_key(), summary.clone());
        Ok(())
    }

    async fn get_summary(&self, month: MonthKey) -> RepositoryResult<Option<AccountingSummary>> {
        self.check_health()?;
        let data = self.data.read().unwrap();
        Ok(data.summaries.get(&month).cloned())
    }
}
