use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::repo_types::User, error::AppError};

pub const NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 150;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 100;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Emails are compared case-insensitively everywhere.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.chars().count() > EMAIL_MAX || !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(())
}

impl RegisterRequest {
    pub fn normalized(mut self) -> Result<Self, AppError> {
        self.name = self.name.trim().to_string();
        self.email = normalize_email(&self.email);

        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > NAME_MAX {
            return Err(AppError::Validation(format!(
                "Name must be between 1 and {NAME_MAX} characters"
            )));
        }
        check_email(&self.email)?;
        let pw_len = self.password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&pw_len) {
            return Err(AppError::Validation(format!(
                "Password must be between {PASSWORD_MIN} and {PASSWORD_MAX} characters"
            )));
        }
        Ok(self)
    }
}

impl LoginRequest {
    pub fn normalized(mut self) -> Result<Self, AppError> {
        self.email = normalize_email(&self.email);
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::Validation("Password is required".into()));
        }
        Ok(self)
    }
}
