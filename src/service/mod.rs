//! StudentService: validated, procedure-backed student workflows.

pub mod password;
mod student;
mod validation;
pub use student::{StudentListing, StudentService};
pub use validation::RequestValidator;
