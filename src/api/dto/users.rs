/*
 * Responsibility
 * - Users の request/response DTO
 * - UserResponse は公開フィールドのみ (hash は絶対に出さない)
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::{Role, User};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Partial self-update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateMeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.len() < 3 || name.len() > 50 {
                return Err("name must be between 3 and 50 characters");
            }
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err("email should be valid");
        }
        if let Some(password) = &self.password
            && password.len() < 6
        {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }

    pub fn changes_credentials(&self) -> bool {
        self.email.is_some() || self.password.is_some()
    }
}

/// Admin-side partial update; may also change the role.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl AdminUpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.len() < 3 || name.len() > 50 {
                return Err("name must be between 3 and 50 characters");
            }
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err("email should be valid");
        }
        if let Some(password) = &self.password
            && password.len() < 6
        {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }
}
