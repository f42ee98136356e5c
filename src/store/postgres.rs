//! PostgreSQL implementation of the student store.

use super::{ProcedureOutcome, StudentStore, StudentTx};
use crate::error::AppError;
use crate::model::{ClassRoom, Role, StudentRecord, StudentWrite};
use crate::pagination::PageRequest;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

macro_rules! select_student {
    ($tail:literal) => {
        concat!(
            "SELECT s.student_code, s.full_name, s.email, s.password, s.date_of_birth, ",
            "s.address, s.gender, c.class_name, s.role_id ",
            "FROM students s JOIN class_rooms c ON c.id = s.class_room_id",
            $tail
        )
    };
}

const SELECT_ALL: &str = select_student!(" ORDER BY s.id");
const SELECT_PAGE: &str = select_student!(" ORDER BY s.id LIMIT $1 OFFSET $2");
const SELECT_BY_CODE: &str = select_student!(" WHERE s.student_code = $1");
const COUNT_STUDENTS: &str = "SELECT COUNT(*) FROM students";
/// First statement of the paging transaction.
const PAGE_SNAPSHOT: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

const CALL_CREATE: &str = "CALL create_stu($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL)";
const CALL_UPDATE: &str = "CALL update_stu($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL)";
const CALL_DELETE: &str = "CALL delete_stu($1, NULL)";

#[derive(sqlx::FromRow)]
struct StudentRow {
    student_code: String,
    full_name: String,
    email: String,
    password: String,
    date_of_birth: NaiveDate,
    address: String,
    gender: String,
    class_name: String,
    role_id: i64,
}

impl TryFrom<StudentRow> for StudentRecord {
    type Error = AppError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        let gender = row.gender.parse().map_err(|e| {
            AppError::Unexpected(format!("student {} has invalid gender: {}", row.student_code, e))
        })?;
        Ok(StudentRecord {
            code: row.student_code,
            full_name: row.full_name,
            email: row.email,
            password_hash: row.password,
            date_of_birth: row.date_of_birth,
            address: row.address,
            gender,
            class_name: row.class_name,
            role_id: row.role_id,
        })
    }
}

fn into_records(rows: Vec<StudentRow>) -> Result<Vec<StudentRecord>, AppError> {
    rows.into_iter().map(StudentRecord::try_from).collect()
}

async fn fetch_student(conn: &mut PgConnection, code: &str) -> Result<Option<StudentRecord>, AppError> {
    tracing::debug!(sql = SELECT_BY_CODE, code, "query");
    sqlx::query_as::<_, StudentRow>(SELECT_BY_CODE)
        .bind(code)
        .fetch_optional(conn)
        .await?
        .map(StudentRecord::try_from)
        .transpose()
}

#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        PgStudentStore { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn begin(&self) -> Result<Box<dyn StudentTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStudentTx { tx }))
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, AppError> {
        tracing::debug!(sql = SELECT_ALL, "query");
        let rows = sqlx::query_as::<_, StudentRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;
        into_records(rows)
    }

    /// The page and the total come from one snapshot, so `total` always
    /// agrees with the rows returned.
    async fn list_page(&self, page: PageRequest) -> Result<(Vec<StudentRecord>, u64), AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(PAGE_SNAPSHOT).execute(&mut *tx).await?;

        tracing::debug!(sql = SELECT_PAGE, limit = page.limit(), offset = page.offset(), "query");
        let rows = sqlx::query_as::<_, StudentRow>(SELECT_PAGE)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&mut *tx)
            .await?;
        let total: i64 = sqlx::query_scalar(COUNT_STUDENTS).fetch_one(&mut *tx).await?;
        tx.commit().await?;

        Ok((into_records(rows)?, u64::try_from(total).unwrap_or(0)))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<StudentRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_student(&mut conn, code).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgStudentTx {
    tx: Transaction<'static, Postgres>,
}

impl PgStudentTx {
    async fn call_write(&mut self, sql: &'static str, w: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError> {
        tracing::debug!(sql, code = w.code, class_id = w.class_id, "call");
        let flag: Option<i32> = sqlx::query_scalar(sql)
            .bind(w.class_id)
            .bind(&w.profile.full_name)
            .bind(&w.profile.email)
            .bind(w.password_hash)
            .bind(w.profile.date_of_birth)
            .bind(&w.profile.address)
            .bind(w.profile.gender.as_str())
            .bind(w.code)
            .bind(w.role_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(ProcedureOutcome::from_flag(flag))
    }
}

#[async_trait]
impl StudentTx for PgStudentTx {
    async fn student_exists(&mut self, code: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_code = $1)")
            .bind(code)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(exists)
    }

    async fn email_owner(&mut self, email: &str) -> Result<Option<String>, AppError> {
        let owner: Option<String> = sqlx::query_scalar("SELECT student_code FROM students WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(owner)
    }

    async fn class_by_name(&mut self, class_name: &str) -> Result<Option<ClassRoom>, AppError> {
        let row: Option<(i64, String, Option<String>, i32, i32)> = sqlx::query_as(
            "SELECT id, class_name, description, max_students, current_students FROM class_rooms WHERE class_name = $1",
        )
        .bind(class_name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(|(id, class_name, description, max_students, current_students)| ClassRoom {
            id,
            class_name,
            description,
            max_students,
            current_students,
        }))
    }

    async fn role_by_id(&mut self, id: i64) -> Result<Option<Role>, AppError> {
        let row: Option<(i64, String)> = sqlx::query_as("SELECT id, name_role FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(|(id, name)| Role { id, name }))
    }

    async fn find_student(&mut self, code: &str) -> Result<Option<StudentRecord>, AppError> {
        fetch_student(&mut *self.tx, code).await
    }

    async fn create_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError> {
        self.call_write(CALL_CREATE, write).await
    }

    async fn update_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError> {
        self.call_write(CALL_UPDATE, write).await
    }

    async fn delete_student(&mut self, code: &str) -> Result<ProcedureOutcome, AppError> {
        tracing::debug!(sql = CALL_DELETE, code, "call");
        let flag: Option<i32> = sqlx::query_scalar(CALL_DELETE)
            .bind(code)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(ProcedureOutcome::from_flag(flag))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
