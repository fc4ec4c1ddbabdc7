//! User identity models

use serde::{Deserialize, Serialize};

/// Role of an authenticated user. Roles gate destructive and
/// administrative operations; they are not otherwise part of the core
/// invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Worker,
    Intern,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Worker => "worker",
            UserRole::Intern => "intern",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "manager" => Some(UserRole::Manager),
            "worker" => Some(UserRole::Worker),
            "intern" => Some(UserRole::Intern),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Whether the role may force-delete records that still carry history.
    pub fn can_force_delete(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}
