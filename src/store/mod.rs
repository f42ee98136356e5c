//! Entity store seam: reads on the pool, writes inside a [`StudentTx`].
//!
//! Every student write goes through one of the `create_stu` / `update_stu` /
//! `delete_stu` procedures; implementations must not write student rows any
//! other way.

mod bootstrap;
mod postgres;

pub use bootstrap::{ensure_database_exists, ensure_schema};
pub use postgres::PgStudentStore;

use crate::error::AppError;
use crate::model::{ClassRoom, Role, StudentRecord, StudentWrite};
use crate::pagination::PageRequest;
use async_trait::async_trait;

/// Result of a write procedure, decoded from its integer out-flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureOutcome {
    Applied,
    Rejected,
}

impl ProcedureOutcome {
    /// `0` (or no value) is a rejection; anything else succeeded.
    pub fn from_flag(flag: Option<i32>) -> Self {
        match flag {
            Some(0) | None => ProcedureOutcome::Rejected,
            Some(_) => ProcedureOutcome::Applied,
        }
    }

    pub fn into_result(self, reason: &str) -> Result<(), AppError> {
        match self {
            ProcedureOutcome::Applied => Ok(()),
            ProcedureOutcome::Rejected => Err(AppError::ProcedureFailed(reason.to_string())),
        }
    }
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Open a unit of work. Dropping it without [`StudentTx::commit`] rolls back.
    async fn begin(&self) -> Result<Box<dyn StudentTx>, AppError>;

    async fn list_all(&self) -> Result<Vec<StudentRecord>, AppError>;

    /// One page plus the total number of students.
    async fn list_page(&self, page: PageRequest) -> Result<(Vec<StudentRecord>, u64), AppError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<StudentRecord>, AppError>;

    /// Connectivity check for readiness.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait StudentTx: Send {
    async fn student_exists(&mut self, code: &str) -> Result<bool, AppError>;

    /// Code of the student currently holding `email`, if any.
    async fn email_owner(&mut self, email: &str) -> Result<Option<String>, AppError>;

    async fn class_by_name(&mut self, class_name: &str) -> Result<Option<ClassRoom>, AppError>;

    async fn role_by_id(&mut self, id: i64) -> Result<Option<Role>, AppError>;

    async fn find_student(&mut self, code: &str) -> Result<Option<StudentRecord>, AppError>;

    async fn create_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError>;

    async fn update_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError>;

    async fn delete_student(&mut self, code: &str) -> Result<ProcedureOutcome, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}
