//! In-memory store emulating the tables and write procedures, plus HTTP helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use student_records::model::{ClassRoom, Role, StudentRecord, StudentWrite};
use student_records::{app, AppError, AppState, PageRequest, ProcedureOutcome, StudentStore, StudentTx};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower::ServiceExt;

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub students: Vec<(StudentRecord, i64)>,
    pub classes: Vec<ClassRoom>,
    pub roles: Vec<Role>,
}

impl Tables {
    fn class_by_id(&mut self, id: i64) -> Option<&mut ClassRoom> {
        self.classes.iter_mut().find(|c| c.id == id)
    }

    fn record(&mut self, w: &StudentWrite<'_>) -> Option<StudentRecord> {
        let class_name = self.class_by_id(w.class_id)?.class_name.clone();
        Some(StudentRecord {
            code: w.code.to_string(),
            full_name: w.profile.full_name.clone(),
            email: w.profile.email.clone(),
            password_hash: w.password_hash.to_string(),
            date_of_birth: w.profile.date_of_birth,
            address: w.profile.address.clone(),
            gender: w.profile.gender,
            class_name,
            role_id: w.role_id,
        })
    }

    /// Increment the class counter when there is room.
    fn take_seat(&mut self, class_id: i64) -> bool {
        match self.class_by_id(class_id) {
            Some(c) if c.current_students < c.max_students => {
                c.current_students += 1;
                true
            }
            _ => false,
        }
    }

    fn free_seat(&mut self, class_id: i64) {
        if let Some(c) = self.class_by_id(class_id) {
            c.current_students = (c.current_students - 1).max(0);
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    calls: Arc<StdMutex<Vec<String>>>,
    reject: Arc<AtomicBool>,
    broken: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails like an unreachable database.
    pub fn broken() -> Self {
        MemoryStore {
            broken: true,
            ..Self::default()
        }
    }

    pub async fn add_class(&self, name: &str, max_students: i32) -> i64 {
        let mut t = self.tables.lock().await;
        let id = t.classes.len() as i64 + 1;
        t.classes.push(ClassRoom {
            id,
            class_name: name.to_string(),
            description: None,
            max_students,
            current_students: 0,
        });
        id
    }

    pub async fn add_role(&self, id: i64, name: &str) {
        self.tables.lock().await.roles.push(Role {
            id,
            name: name.to_string(),
        });
    }

    pub async fn tables(&self) -> Tables {
        self.tables.lock().await.clone()
    }

    pub async fn class(&self, name: &str) -> ClassRoom {
        self.tables()
            .await
            .classes
            .into_iter()
            .find(|c| c.class_name == name)
            .expect("class seeded")
    }

    pub async fn student(&self, code: &str) -> Option<StudentRecord> {
        self.tables()
            .await
            .students
            .into_iter()
            .find(|(s, _)| s.code == code)
            .map(|(s, _)| s)
    }

    /// From now on every procedure call reports failure (flag 0), as when a
    /// database-side constraint stops it.
    pub fn reject_procedures(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    /// Names of the procedures invoked so far, in order.
    pub fn procedure_calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.broken {
            Err(AppError::Db(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StudentTx>, AppError> {
        self.check()?;
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            calls: self.calls.clone(),
            reject: self.reject.load(Ordering::SeqCst),
        }))
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, AppError> {
        self.check()?;
        Ok(self.tables().await.students.into_iter().map(|(s, _)| s).collect())
    }

    async fn list_page(&self, page: PageRequest) -> Result<(Vec<StudentRecord>, u64), AppError> {
        self.check()?;
        let all = self.list_all().await?;
        let total = all.len() as u64;
        let rows = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((rows, total))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<StudentRecord>, AppError> {
        self.check()?;
        Ok(self.student(code).await)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    calls: Arc<StdMutex<Vec<String>>>,
    reject: bool,
}

impl MemoryTx {
    /// Record the call; false when the procedure must report failure.
    fn call(&self, name: &str) -> bool {
        self.calls.lock().expect("calls lock").push(name.to_string());
        !self.reject
    }
}

#[async_trait]
impl StudentTx for MemoryTx {
    async fn student_exists(&mut self, code: &str) -> Result<bool, AppError> {
        Ok(self.staged.students.iter().any(|(s, _)| s.code == code))
    }

    async fn email_owner(&mut self, email: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .staged
            .students
            .iter()
            .find(|(s, _)| s.email == email)
            .map(|(s, _)| s.code.clone()))
    }

    async fn class_by_name(&mut self, class_name: &str) -> Result<Option<ClassRoom>, AppError> {
        Ok(self.staged.classes.iter().find(|c| c.class_name == class_name).cloned())
    }

    async fn role_by_id(&mut self, id: i64) -> Result<Option<Role>, AppError> {
        Ok(self.staged.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_student(&mut self, code: &str) -> Result<Option<StudentRecord>, AppError> {
        Ok(self
            .staged
            .students
            .iter()
            .find(|(s, _)| s.code == code)
            .map(|(s, _)| s.clone()))
    }

    async fn create_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError> {
        if !self.call("create_stu") || !self.staged.take_seat(write.class_id) {
            return Ok(ProcedureOutcome::Rejected);
        }
        let Some(record) = self.staged.record(write) else {
            return Ok(ProcedureOutcome::Rejected);
        };
        self.staged.students.push((record, write.class_id));
        Ok(ProcedureOutcome::Applied)
    }

    async fn update_student(&mut self, write: &StudentWrite<'_>) -> Result<ProcedureOutcome, AppError> {
        if !self.call("update_stu") {
            return Ok(ProcedureOutcome::Rejected);
        }
        let Some(index) = self.staged.students.iter().position(|(s, _)| s.code == write.code) else {
            return Ok(ProcedureOutcome::Rejected);
        };
        let old_class = self.staged.students[index].1;
        if old_class != write.class_id {
            if !self.staged.take_seat(write.class_id) {
                return Ok(ProcedureOutcome::Rejected);
            }
            self.staged.free_seat(old_class);
        }
        let Some(record) = self.staged.record(write) else {
            return Ok(ProcedureOutcome::Rejected);
        };
        self.staged.students[index] = (record, write.class_id);
        Ok(ProcedureOutcome::Applied)
    }

    async fn delete_student(&mut self, code: &str) -> Result<ProcedureOutcome, AppError> {
        if !self.call("delete_stu") {
            return Ok(ProcedureOutcome::Rejected);
        }
        let Some(index) = self.staged.students.iter().position(|(s, _)| s.code == code) else {
            return Ok(ProcedureOutcome::Rejected);
        };
        let (_, class_id) = self.staged.students.remove(index);
        self.staged.free_seat(class_id);
        Ok(ProcedureOutcome::Applied)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTx { mut guard, staged, .. } = *self;
        *guard = staged;
        Ok(())
    }
}

/// Store with one role (id 1) and classes `CNTT1` (capacity 30) and `FULL1` (capacity 0).
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.add_role(1, "STUDENT").await;
    store.add_class("CNTT1", 30).await;
    store.add_class("FULL1", 0).await;
    store
}

pub fn router(store: &MemoryStore) -> Router {
    let state = AppState::new(Arc::new(store.clone()), 1);
    app(state, 64 * 1024)
}

/// Send one request; returns the status and the JSON body (`Null` when empty).
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("infallible router");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

pub fn student_json(code: &str, email: &str, class_name: &str) -> Value {
    serde_json::json!({
        "studentCode": code,
        "fullName": "Nguyen Van A",
        "email": email,
        "password": "secret1",
        "dateOfBirth": "2003-04-05",
        "address": "Ha Noi",
        "gender": "MALE",
        "className": class_name
    })
}
