/*
 * Responsibility
 * - Auth (login/register) の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name.trim();
        if name.len() < 3 || name.len() > 50 {
            return Err("name must be between 3 and 50 characters");
        }
        if !self.email.contains('@') {
            return Err("email should be valid");
        }
        if self.password.len() < 6 {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }
}
