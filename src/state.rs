//! Shared application state for all routes.

use crate::service::StudentService;
use crate::store::StudentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
}

impl AppState {
    pub fn new(store: Arc<dyn StudentStore>, default_role_id: i64) -> Self {
        AppState {
            students: StudentService::new(store, default_role_id),
        }
    }
}
