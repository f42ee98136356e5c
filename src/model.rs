//! Entities, request payloads, and outbound views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    /// Exact match only; the stored and wire form is upper-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRoom {
    pub id: i64,
    pub class_name: String,
    pub description: Option<String>,
    pub max_students: i32,
    pub current_students: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A persisted student joined with its class name.
#[derive(Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub code: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub gender: Gender,
    pub class_name: String,
    pub role_id: i64,
}

impl fmt::Debug for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentRecord")
            .field("code", &self.code)
            .field("email", &self.email)
            .field("class_name", &self.class_name)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// Outbound projection of a student. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub student_code: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub gender: Gender,
    pub class_name: String,
    pub role_id: i64,
}

impl From<StudentRecord> for StudentView {
    fn from(r: StudentRecord) -> Self {
        StudentView {
            student_code: r.code,
            full_name: r.full_name,
            email: r.email,
            date_of_birth: r.date_of_birth,
            address: r.address,
            gender: r.gender,
            class_name: r.class_name,
            role_id: r.role_id,
        }
    }
}

/// Body of `POST /students`. Fields are optional so that missing values are
/// reported as field violations rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCreateRequest {
    pub student_code: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileFields,
}

/// Body of `PUT /students/{code}`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdateRequest {
    #[serde(flatten)]
    pub profile: ProfileFields,
}

#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    /// `MALE` or `FEMALE`.
    pub gender: Option<String>,
    pub class_name: Option<String>,
    pub role_id: Option<i64>,
}

impl fmt::Debug for ProfileFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileFields")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("date_of_birth", &self.date_of_birth)
            .field("address", &self.address)
            .field("gender", &self.gender)
            .field("class_name", &self.class_name)
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Validated profile shared by create and update.
#[derive(Clone, PartialEq, Eq)]
pub struct StudentProfile {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub gender: Gender,
    pub class_name: String,
    pub role_id: Option<i64>,
}

impl fmt::Debug for StudentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentProfile")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("date_of_birth", &self.date_of_birth)
            .field("gender", &self.gender)
            .field("class_name", &self.class_name)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// Validated create payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub code: String,
    pub profile: StudentProfile,
}

/// Parameters handed to the write procedures. The password is already hashed.
#[derive(Clone, Copy)]
pub struct StudentWrite<'a> {
    pub code: &'a str,
    pub class_id: i64,
    pub role_id: i64,
    pub password_hash: &'a str,
    pub profile: &'a StudentProfile,
}

impl fmt::Debug for StudentWrite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentWrite")
            .field("code", &self.code)
            .field("class_id", &self.class_id)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}
