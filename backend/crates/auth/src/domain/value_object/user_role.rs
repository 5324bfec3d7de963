use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Manager,
    Admin,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Manager => "manager",
            Admin => "admin",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, UnknownRole> {
        use UserRole::*;
        match code {
            "user" => Ok(User),
            "manager" => Ok(Manager),
            "admin" => Ok(Admin),
            _ => Err(UnknownRole(code.to_string())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// Role code not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl From<UnknownRole> for AuthError {
    fn from(err: UnknownRole) -> Self {
        // Only stored rows are parsed with from_code; requests go through serde
        AuthError::Internal(err.to_string())
    }
}
