use core::str::FromStr;

use serde::{Deserialize, Serialize};

use supplyflow_core::DomainError;

/// The three kinds of actor on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Franchisee placing orders.
    Buyer,
    /// Fulfilment staff packing and shipping.
    Warehouse,
    /// Approver with catalog and cancellation rights.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Warehouse => "warehouse",
            Role::Admin => "admin",
        }
    }

    /// Staff roles see every order, not only their own.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Warehouse | Role::Admin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" | "franchisee" => Ok(Role::Buyer),
            "warehouse" => Ok(Role::Warehouse),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Warehouse".parse::<Role>().unwrap(), Role::Warehouse);
        assert_eq!("franchisee".parse::<Role>().unwrap(), Role::Buyer);
        assert!("driver".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
