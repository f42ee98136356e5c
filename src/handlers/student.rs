//! Student handlers: list, read, create, update, delete.

use crate::error::AppError;
use crate::extractors::{PageQuery, Payload};
use crate::model::{StudentCreateRequest, StudentUpdateRequest, StudentView};
use crate::pagination::PageParams;
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    params(PageParams),
    responses(
        (status = 200, description = "All students, or one page when both parameters are given", body = Vec<StudentView>),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    PageQuery(selection): PageQuery,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.students.list(selection).await?;
    Ok((StatusCode::OK, Json(listing)))
}

#[utoipa::path(
    get,
    path = "/students/{code}",
    tag = "students",
    params(("code" = String, Path, description = "Student code")),
    responses(
        (status = 200, description = "Student found", body = StudentView),
        (status = 404, description = "Student code not found")
    )
)]
pub async fn read(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.students.get(&code).await?;
    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    request_body = StudentCreateRequest,
    responses(
        (status = 201, description = "Student created", body = StudentView),
        (status = 400, description = "Validation error or class is full"),
        (status = 404, description = "Class or role not found"),
        (status = 409, description = "Student code or email already exists")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    Payload(body): Payload<StudentCreateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student = RequestValidator::create(body)?;
    let view = state.students.create(student).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    put,
    path = "/students/{code}",
    tag = "students",
    params(("code" = String, Path, description = "Student code")),
    request_body = StudentUpdateRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentView),
        (status = 400, description = "Validation error or class is full"),
        (status = 404, description = "Student, class or role not found"),
        (status = 409, description = "Email belongs to another student")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Payload(body): Payload<StudentUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = RequestValidator::update(body)?;
    let view = state.students.update(&code, profile).await?;
    Ok((StatusCode::OK, Json(view)))
}

#[utoipa::path(
    delete,
    path = "/students/{code}",
    tag = "students",
    params(("code" = String, Path, description = "Student code")),
    responses(
        (status = 200, description = "Student deleted"),
        (status = 400, description = "Delete procedure failed"),
        (status = 404, description = "Student code not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.students.delete(&code).await?;
    Ok(StatusCode::OK)
}
