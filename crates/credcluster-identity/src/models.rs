//! Identity risk data models
//!
//! These mirror the records returned by the `entities` query. The API omits
//! or nulls optional fields freely, so every field that may be absent is
//! either an `Option` or defaults to its empty value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declares a string-backed enum that keeps unrecognized values verbatim
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Value this build does not know about
            Other(String),
        }

        impl $name {
            /// Wire representation
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(raw) => raw,
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_enum! {
    /// Category of a risk-bearing entity
    EntityKind {
        /// User account
        User => "USER",
        /// Endpoint / computer account
        Endpoint => "ENDPOINT",
    }
}

impl Default for EntityKind {
    fn default() -> Self {
        EntityKind::Other(String::new())
    }
}

open_enum! {
    /// Risk factor type, also used as the query filter
    RiskFactorType {
        /// Several accounts share one password
        DuplicatePassword => "DUPLICATE_PASSWORD",
        /// Password fails the complexity policy
        WeakPassword => "WEAK_PASSWORD",
        /// Password found in a breach corpus
        CompromisedPassword => "COMPROMISED_PASSWORD",
        /// Password is configured never to expire
        PasswordNeverExpires => "PASSWORD_NEVER_EXPIRES",
        /// Account has not been used for a long time
        StaleAccount => "STALE_ACCOUNT",
    }
}

impl FromStr for RiskFactorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        if normalized.is_empty() {
            return Err("risk factor type cannot be empty".to_string());
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(format!("invalid risk factor type: {s}"));
        }
        Ok(RiskFactorType::from(normalized))
    }
}

open_enum! {
    /// Severity attached to a risk factor
    RiskSeverity {
        Normal => "NORMAL",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

/// Password attributes of an account descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordAttributes {
    /// Raw timestamp of the last password change
    #[serde(default)]
    pub last_change: Option<String>,
}

/// Account descriptor attached to an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub password_attributes: Option<PasswordAttributes>,
}

impl Account {
    /// Account carrying the given last-change value
    pub fn with_last_change(last_change: Option<&str>) -> Self {
        Self {
            password_attributes: Some(PasswordAttributes {
                last_change: last_change.map(str::to_string),
            }),
        }
    }

    /// Raw password-change timestamp, if the account reports one
    pub fn password_last_changed(&self) -> Option<&str> {
        self.password_attributes
            .as_ref()
            .and_then(|attrs| attrs.last_change.as_deref())
    }
}

/// Entity referenced along an attack path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntity {
    #[serde(default)]
    pub primary_display_name: Option<String>,
    #[serde(default)]
    pub secondary_display_name: Option<String>,
}

/// One hop of an attack path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPathStep {
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub entity: Option<PathEntity>,
}

/// Variant-specific payload of a risk factor
#[derive(Debug, Clone, PartialEq)]
pub enum RiskFactorDetail {
    /// Member of a password-sharing cluster
    DuplicatePassword { group_id: Option<String> },
    /// Risk derived from a path to a privileged entity
    AttackPath { attack_path: Vec<AttackPathStep> },
    /// Any other variant; its payload is not consumed
    Opaque,
}

/// A detected condition contributing to an entity's risk score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRiskFactor", into = "WireRiskFactor")]
pub struct RiskFactor {
    pub kind: RiskFactorType,
    pub score: Option<f64>,
    pub severity: Option<RiskSeverity>,
    pub detail: RiskFactorDetail,
}

impl RiskFactor {
    /// Duplicate-password factor for the given cluster
    pub fn duplicate_password(group_id: Option<&str>) -> Self {
        Self {
            kind: RiskFactorType::DuplicatePassword,
            score: None,
            severity: None,
            detail: RiskFactorDetail::DuplicatePassword {
                group_id: group_id.map(str::to_string),
            },
        }
    }

    /// Cluster key when this is a duplicate-password factor with a usable group id
    pub fn duplicate_password_group(&self) -> Option<&str> {
        match &self.detail {
            RiskFactorDetail::DuplicatePassword {
                group_id: Some(group_id),
            } if !group_id.is_empty() => Some(group_id.as_str()),
            _ => None,
        }
    }
}

/// Flat wire shape of a risk factor; the union is resolved by `type`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRiskFactor {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    severity: Option<RiskSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attack_path: Option<Vec<AttackPathStep>>,
}

impl From<WireRiskFactor> for RiskFactor {
    fn from(wire: WireRiskFactor) -> Self {
        let kind = RiskFactorType::from(wire.kind);
        let detail = match (&kind, wire.attack_path) {
            (RiskFactorType::DuplicatePassword, _) => RiskFactorDetail::DuplicatePassword {
                group_id: wire.group_id,
            },
            (_, Some(attack_path)) => RiskFactorDetail::AttackPath { attack_path },
            _ => RiskFactorDetail::Opaque,
        };
        Self {
            kind,
            score: wire.score,
            severity: wire.severity,
            detail,
        }
    }
}

impl From<RiskFactor> for WireRiskFactor {
    fn from(factor: RiskFactor) -> Self {
        let mut wire = WireRiskFactor {
            kind: factor.kind.into(),
            score: factor.score,
            severity: factor.severity,
            ..Default::default()
        };
        match factor.detail {
            RiskFactorDetail::DuplicatePassword { group_id } => wire.group_id = group_id,
            RiskFactorDetail::AttackPath { attack_path } => wire.attack_path = Some(attack_path),
            RiskFactorDetail::Opaque => {}
        }
        wire
    }
}

/// A risk-bearing identity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entity_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_display_name: String,
    #[serde(default)]
    pub secondary_display_name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EntityKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accounts: Vec<Account>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_factors: Vec<RiskFactor>,
}

impl Entity {
    /// First password-change value in account order
    pub fn first_password_change(&self) -> Option<&str> {
        self.accounts.iter().find_map(Account::password_last_changed)
    }
}

/// Cursor state reported with every page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}
