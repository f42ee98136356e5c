//! Request validation for student payloads.

use crate::error::AppError;
use crate::model::{
    Gender, NewStudent, ProfileFields, StudentCreateRequest, StudentProfile, StudentUpdateRequest,
};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

const MIN_PASSWORD_CHARS: usize = 5;

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("static email pattern"))
}

fn gender_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(MALE|FEMALE)$").expect("static gender pattern"))
}

/// Collects field violations in declaration order, first violation per field.
#[derive(Debug, Default)]
pub struct RequestValidator {
    errors: Vec<String>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a create payload against today's date.
    pub fn create(req: StudentCreateRequest) -> Result<NewStudent, AppError> {
        Self::create_at(req, Utc::now().date_naive())
    }

    pub fn create_at(req: StudentCreateRequest, today: NaiveDate) -> Result<NewStudent, AppError> {
        let mut v = Self::new();
        let code = v.required(req.student_code, "StudentCode cannot be blank");
        let profile = v.profile(req.profile, "FullName cannot be blank", today);
        v.finish()?;
        match (code, profile) {
            (Some(code), Some(profile)) => Ok(NewStudent { code, profile }),
            _ => Err(AppError::Unexpected("validator accepted an incomplete payload".into())),
        }
    }

    /// Validate an update payload against today's date.
    pub fn update(req: StudentUpdateRequest) -> Result<StudentProfile, AppError> {
        Self::update_at(req, Utc::now().date_naive())
    }

    pub fn update_at(req: StudentUpdateRequest, today: NaiveDate) -> Result<StudentProfile, AppError> {
        let mut v = Self::new();
        let profile = v.profile(req.profile, "Full name cannot be blank", today);
        v.finish()?;
        profile.ok_or_else(|| AppError::Unexpected("validator accepted an incomplete payload".into()))
    }

    fn profile(&mut self, p: ProfileFields, full_name_msg: &str, today: NaiveDate) -> Option<StudentProfile> {
        let full_name = self.required(p.full_name, full_name_msg);
        let email = self
            .required(p.email, "Email cannot be blank")
            .and_then(|e| self.check(e, |e| email_pattern().is_match(e), "Email should be valid"));
        let password = self.required_raw(p.password, "Password cannot be blank").and_then(|pw| {
            self.check(pw, |pw| pw.chars().count() >= MIN_PASSWORD_CHARS, "Password must be at least 5 characters long")
        });
        let date_of_birth = self.birth_date(p.date_of_birth, today);
        let address = self.required(p.address, "Address cannot be blank");
        let gender = self
            .required(p.gender, "Gender cannot be blank")
            .and_then(|g| self.check(g, |g| gender_pattern().is_match(g), "Gender must be either MALE or FEMALE"))
            .and_then(|g| g.parse::<Gender>().ok());
        let class_name = self.required(p.class_name, "ClassName cannot be blank");

        Some(StudentProfile {
            full_name: full_name?,
            email: email?,
            password: password?,
            date_of_birth: date_of_birth?,
            address: address?,
            gender: gender?,
            class_name: class_name?,
            role_id: p.role_id,
        })
    }

    /// Not blank; surrounding whitespace is trimmed from the accepted value.
    fn required(&mut self, value: Option<String>, msg: &str) -> Option<String> {
        self.required_raw(value, msg).map(|s| s.trim().to_string())
    }

    /// Not blank; the value is kept verbatim (passwords).
    fn required_raw(&mut self, value: Option<String>, msg: &str) -> Option<String> {
        match value {
            Some(s) if !s.trim().is_empty() => Some(s),
            _ => {
                self.errors.push(msg.to_string());
                None
            }
        }
    }

    fn check(&mut self, value: String, ok: impl Fn(&str) -> bool, msg: &str) -> Option<String> {
        if ok(&value) {
            Some(value)
        } else {
            self.errors.push(msg.to_string());
            None
        }
    }

    fn birth_date(&mut self, value: Option<String>, today: NaiveDate) -> Option<NaiveDate> {
        let raw = self.required(value, "dateOfBirth cannot be blank")?;
        let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") else {
            self.errors.push("dateOfBirth must be a valid date (YYYY-MM-DD)".into());
            return None;
        };
        if date >= today {
            self.errors.push("Birth date must be in the past".into());
            return None;
        }
        Some(date)
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
