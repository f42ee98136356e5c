//! Page parameter resolution and the paginated result shape.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const INVALID_PARAMS: &str = "Invalid current or pageSize";

/// Raw `current` / `pageSize` query values, kept as text so that [`resolve`]
/// decides what is malformed.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page number.
    pub current: Option<String>,
    pub page_size: Option<String>,
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// What the list endpoint should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    All,
    Page(PageRequest),
}

/// Interpret the raw `current` (1-based) and `pageSize` query values.
pub fn resolve(current: Option<&str>, page_size: Option<&str>) -> Result<PageSelection, AppError> {
    let (current, page_size) = match (current, page_size) {
        (None, None) => return Ok(PageSelection::All),
        (Some(c), Some(s)) => (c, s),
        _ => {
            return Err(AppError::BadRequest(
                "Both current and pageSize must be provided".into(),
            ))
        }
    };
    let (current, page_size) = match (current.parse::<i32>(), page_size.parse::<i32>()) {
        (Ok(c), Ok(s)) => (c, s),
        _ => return Err(AppError::BadRequest(INVALID_PARAMS.into())),
    };
    if current <= 0 || page_size <= 0 {
        return Err(AppError::BadRequest("Page and size must be positive".into()));
    }
    Ok(PageSelection::Page(PageRequest {
        page: (current - 1) as u32,
        size: page_size as u32,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
    pub pages: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub result: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(request: PageRequest, total: u64, result: Vec<T>) -> Self {
        let size = u64::from(request.size);
        let pages = if size == 0 { 0 } else { total.div_ceil(size) };
        Paginated {
            meta: PageMeta {
                page: request.page,
                page_size: request.size,
                pages,
                total,
            },
            result,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            meta: self.meta,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}
