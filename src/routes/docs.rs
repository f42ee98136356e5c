//! OpenAPI document, served raw (outside the response envelope).

use crate::handlers::student;
use crate::model::{Gender, ProfileFields, StudentCreateRequest, StudentUpdateRequest, StudentView};
use crate::pagination::PageMeta;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Student Records API"),
    paths(student::list, student::read, student::create, student::update, student::delete),
    components(schemas(StudentView, Gender, StudentCreateRequest, StudentUpdateRequest, ProfileFields, PageMeta)),
    tags((name = "students", description = "Student records"))
)]
pub struct ApiDoc;

async fn api_docs() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn docs_routes() -> Router {
    Router::new().route("/v3/api-docs", get(api_docs))
}
