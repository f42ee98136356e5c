//! Student workflows: every write is checked, then handed to a procedure,
//! inside one transaction.
//!
//! Check order fixes which error a client sees when several rules are broken
//! at once; the procedure call comes last so that 404/409 answers never depend
//! on classroom capacity.

use crate::error::AppError;
use crate::model::{NewStudent, StudentProfile, StudentView, StudentWrite};
use crate::pagination::{PageSelection, Paginated};
use crate::service::password::hash_password;
use crate::store::{StudentStore, StudentTx};
use serde::Serialize;
use std::sync::Arc;

const STUDENT_NOT_FOUND: &str = "Student code not found";
const CREATE_FAILED: &str = "Failed to create student - possibly class is full";
const UPDATE_FAILED: &str = "Failed to update student - possibly class is full";
const DELETE_FAILED: &str = "Failed to delete student - possibly referential constraint or already removed";

/// Either the full list or one page, depending on the query.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StudentListing {
    All(Vec<StudentView>),
    Page(Paginated<StudentView>),
}

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
    default_role_id: i64,
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>, default_role_id: i64) -> Self {
        StudentService { store, default_role_id }
    }

    pub fn store(&self) -> &dyn StudentStore {
        self.store.as_ref()
    }

    pub async fn list(&self, selection: PageSelection) -> Result<StudentListing, AppError> {
        match selection {
            PageSelection::All => {
                let rows = self.store.list_all().await?;
                Ok(StudentListing::All(rows.into_iter().map(StudentView::from).collect()))
            }
            PageSelection::Page(request) => {
                let (rows, total) = self.store.list_page(request).await?;
                Ok(StudentListing::Page(Paginated::new(request, total, rows).map(StudentView::from)))
            }
        }
    }

    pub async fn get(&self, code: &str) -> Result<StudentView, AppError> {
        self.store
            .find_by_code(code)
            .await?
            .map(StudentView::from)
            .ok_or_else(|| AppError::NotFound(STUDENT_NOT_FOUND.into()))
    }

    /// Duplicate code, duplicate email, class, role, then `create_stu`.
    pub async fn create(&self, student: NewStudent) -> Result<StudentView, AppError> {
        let NewStudent { code, profile } = student;
        let mut tx = self.store.begin().await?;

        if tx.student_exists(&code).await? {
            return Err(AppError::DuplicateCode(code));
        }
        if tx.email_owner(&profile.email).await?.is_some() {
            return Err(AppError::DuplicateEmail(profile.email));
        }
        let (class_id, role_id) = self.resolve_references(&mut *tx, &profile).await?;
        let password_hash = hash_password(&profile.password)?;

        let write = StudentWrite {
            code: &code,
            class_id,
            role_id,
            password_hash: &password_hash,
            profile: &profile,
        };
        tx.create_student(&write).await?.into_result(CREATE_FAILED)?;
        let view = read_back(&mut *tx, &code).await?;
        tx.commit().await?;

        tracing::info!(code = %code, class = %profile.class_name, "student created");
        Ok(view)
    }

    /// Existence, email ownership, class, role, then `update_stu`.
    /// A student may keep its own email.
    pub async fn update(&self, code: &str, profile: StudentProfile) -> Result<StudentView, AppError> {
        let mut tx = self.store.begin().await?;

        if !tx.student_exists(code).await? {
            return Err(AppError::NotFound(STUDENT_NOT_FOUND.into()));
        }
        if let Some(owner) = tx.email_owner(&profile.email).await? {
            if owner != code {
                return Err(AppError::EmailTaken);
            }
        }
        let (class_id, role_id) = self.resolve_references(&mut *tx, &profile).await?;
        let password_hash = hash_password(&profile.password)?;

        let write = StudentWrite {
            code,
            class_id,
            role_id,
            password_hash: &password_hash,
            profile: &profile,
        };
        tx.update_student(&write).await?.into_result(UPDATE_FAILED)?;
        let view = read_back(&mut *tx, code).await?;
        tx.commit().await?;

        tracing::info!(code = %code, class = %profile.class_name, "student updated");
        Ok(view)
    }

    /// Existence, then `delete_stu`. The procedure is not called for unknown codes.
    pub async fn delete(&self, code: &str) -> Result<(), AppError> {
        let mut tx = self.store.begin().await?;
        if !tx.student_exists(code).await? {
            return Err(AppError::NotFound(STUDENT_NOT_FOUND.into()));
        }
        tx.delete_student(code).await?.into_result(DELETE_FAILED)?;
        tx.commit().await?;

        tracing::info!(code = %code, "student deleted");
        Ok(())
    }

    async fn resolve_references(
        &self,
        tx: &mut dyn StudentTx,
        profile: &StudentProfile,
    ) -> Result<(i64, i64), AppError> {
        let class = tx
            .class_by_name(&profile.class_name)
            .await?
            .ok_or_else(|| AppError::ClassNotFound(profile.class_name.clone()))?;
        let role_id = profile.role_id.unwrap_or(self.default_role_id);
        let role = tx.role_by_id(role_id).await?.ok_or(AppError::RoleNotFound(role_id))?;
        Ok((class.id, role.id))
    }
}

async fn read_back(tx: &mut dyn StudentTx, code: &str) -> Result<StudentView, AppError> {
    tx.find_student(code)
        .await?
        .map(StudentView::from)
        .ok_or_else(|| AppError::Unexpected(format!("student {} missing after write", code)))
}
