//! Student records: a REST backend for student and classroom data.
//!
//! Writes are validated, ordered checks followed by a PostgreSQL stored
//! procedure; every response leaves through one envelope shape.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{init_tracing, AppConfig};
pub use error::{classify, AppError, Classification, ConfigError};
pub use model::{Gender, StudentCreateRequest, StudentUpdateRequest, StudentView};
pub use pagination::{PageRequest, PageSelection, Paginated};
pub use response::{envelope, Envelope, Message};
pub use routes::{app, common_routes_with_ready, docs_routes, student_routes};
pub use service::{StudentListing, StudentService};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_schema, PgStudentStore, ProcedureOutcome, StudentStore, StudentTx};
