use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Customer,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Staff accounts manage the store and never shop from it.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}
