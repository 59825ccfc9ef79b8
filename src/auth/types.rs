use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Account role. Numeric values are the ones persisted in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin = 1,
    PgAdmin = 2,
    Staff = 3,
    Tenant = 4,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::PgAdmin, Role::Staff, Role::Tenant];

    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::PgAdmin => "PGAdmin",
            Role::Staff => "Staff",
            Role::Tenant => "Tenant",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::SuperAdmin => "Full access to every PG and user",
            Role::PgAdmin => "Manages the PGs they own and their staff and tenants",
            Role::Staff => "Maintains rooms and handles complaints",
            Role::Tenant => "Resident; files complaints",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Role {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Role::ALL
            .into_iter()
            .find(|role| role.value() == value)
            .ok_or(())
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        if let Ok(number) = value.parse::<i32>() {
            return Role::try_from(number);
        }
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
            .ok_or(())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRole {
            Number(i32),
            Name(String),
        }

        match RawRole::deserialize(deserializer)? {
            RawRole::Number(value) => Role::try_from(value).map_err(|_| {
                serde::de::Error::custom(format!("unknown role value: {value}"))
            }),
            RawRole::Name(name) => Role::try_from(name.as_str()).map_err(|_| {
                serde::de::Error::custom(format!(
                    "unknown role '{name}'; expected SuperAdmin, PGAdmin, Staff or Tenant"
                ))
            }),
        }
    }
}

/// Route-level role gate used by `AuthRoleGuard`.
pub trait AllowedRoles {
    fn allowed() -> &'static [Role];
}

/// SuperAdmin and PGAdmin.
pub struct Admins;

impl AllowedRoles for Admins {
    fn allowed() -> &'static [Role] {
        &[Role::SuperAdmin, Role::PgAdmin]
    }
}

pub struct SuperAdminOnly;

impl AllowedRoles for SuperAdminOnly {
    fn allowed() -> &'static [Role] {
        &[Role::SuperAdmin]
    }
}

/// Everyone who runs a PG day to day: SuperAdmin, PGAdmin and Staff.
pub struct Operators;

impl AllowedRoles for Operators {
    fn allowed() -> &'static [Role] {
        &[Role::SuperAdmin, Role::PgAdmin, Role::Staff]
    }
}

pub struct Tenants;

impl AllowedRoles for Tenants {
    fn allowed() -> &'static [Role] {
        &[Role::Tenant]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // user id
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<uuid::Uuid> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn role_values_match_storage_numbers() {
        assert_eq!(Role::SuperAdmin.value(), 1);
        assert_eq!(Role::PgAdmin.value(), 2);
        assert_eq!(Role::Staff.value(), 3);
        assert_eq!(Role::Tenant.value(), 4);
        assert_eq!(Role::try_from(2), Ok(Role::PgAdmin));
        assert!(Role::try_from(0).is_err());
    }

    #[test]
    fn deserializes_from_name_or_number() {
        let by_name: Role = serde_json::from_str("\"pgadmin\"").expect("name should parse");
        let by_number: Role = serde_json::from_str("3").expect("number should parse");
        let by_numeric_string: Role = serde_json::from_str("\"4\"").expect("string number");

        assert_eq!(by_name, Role::PgAdmin);
        assert_eq!(by_number, Role::Staff);
        assert_eq!(by_numeric_string, Role::Tenant);
        assert!(serde_json::from_str::<Role>("\"Manager\"").is_err());
        assert!(serde_json::from_str::<Role>("9").is_err());
    }

    #[test]
    fn serializes_as_name() {
        assert_eq!(
            serde_json::to_string(&Role::PgAdmin).expect("serialize"),
            "\"PGAdmin\""
        );
    }
}
