use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::accessor::Entity;

/// Youngest and oldest ages accepted on user payloads
pub const MIN_AGE: i32 = 4;
pub const MAX_AGE: i32 = 130;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub login: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub age: i32,
    pub is_deleted: bool,
}

impl Entity for User {
    const KIND: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }

    fn search_key(&self) -> &str {
        &self.login
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }
}

/// Body of `POST /user` and `PUT /user/:id`
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub login: String,
    pub password: String,
    pub age: i32,
}

impl UserPayload {
    /// Field-level validation. Returns every failing field at once.
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();

        if self.login.trim().is_empty() {
            errors.insert("login".to_string(), "Login cannot be empty".to_string());
        }

        if let Err(msg) = validate_password(&self.password) {
            errors.insert("password".to_string(), msg.to_string());
        }

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            errors.insert(
                "age".to_string(),
                format!("Age must be between {} and {}", MIN_AGE, MAX_AGE),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// New, not yet persisted user. The accessor assigns the id.
    pub fn into_user(self) -> User {
        User {
            id: String::new(),
            login: self.login.trim().to_string(),
            password: self.password,
            age: self.age,
            is_deleted: false,
        }
    }

    /// Overwrite the mutable fields of an existing record
    pub fn apply_to(self, user: &mut User) {
        user.login = self.login.trim().to_string();
        user.password = self.password;
        user.age = self.age;
    }
}

fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password cannot be empty");
    }
    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Password can only contain letters and numbers");
    }
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err("Password must contain both letters and numbers");
    }
    Ok(())
}
