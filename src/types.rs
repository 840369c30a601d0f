use derive_more::{Display, From, Into};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Opaque bearer credential written by the login flow.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct Token(pub String);

impl Token {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Backend user identifier. The upstream emits both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        id_from_value(JsonValue::deserialize(deserializer)?)
            .map(Self)
            .ok_or_else(|| D::Error::custom("user id must be a string or number"))
    }
}

/// School identifier. Same string-or-number leniency as [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Display, From, Into)]
#[serde(transparent)]
pub struct SchoolId(pub String);

impl<'de> Deserialize<'de> for SchoolId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        id_from_value(JsonValue::deserialize(deserializer)?)
            .map(Self)
            .ok_or_else(|| D::Error::custom("school id must be a string or number"))
    }
}

fn id_from_value(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Signed-in user, as stored in the `portal_user` cookie.
///
/// Every field is optional and unknown fields are kept: any JSON object
/// written by the login flow counts as a present user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// A school the user can act on behalf of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// Permission names granted to the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(pub Vec<String>);

impl PermissionSet {
    #[must_use]
    pub fn allows(&self, permission: &str) -> bool {
        self.0.iter().any(|p| p == permission)
    }
}

/// Session reconstructed from the independently-keyed credential cookies.
#[derive(Debug, Clone, Default)]
pub struct SessionCredential {
    pub user: Option<UserRecord>,
    pub token: Option<Token>,
    pub temp_token: Option<Token>,
    pub selected_school: Option<School>,
    pub permissions: Option<PermissionSet>,
}

impl SessionCredential {
    /// `user` and `token` are both present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// `user` and `temp_token` are both present (mid school selection).
    #[must_use]
    pub fn is_transitional(&self) -> bool {
        self.user.is_some() && self.temp_token.is_some()
    }
}
