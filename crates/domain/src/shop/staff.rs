//! Staff accounts

use serde::{Deserialize, Serialize};

use crate::auth::UserRole;
use crate::id::EntityId;

/// A barber or administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Server id.
    pub id: EntityId,
    /// Login name.
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
    /// Commission share of sales, as a percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_percent: Option<f64>,
    /// Whether the account may sign in.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Body for creating a staff account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStaffMember {
    /// Login name.
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Commission share of sales, as a percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_percent: Option<f64>,
}

impl std::fmt::Debug for NewStaffMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewStaffMember")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Partial update of a staff account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    /// New commission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_percent: Option<f64>,
    /// Enable or disable the account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
