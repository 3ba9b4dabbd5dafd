use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// `id` and `role` are required: a token missing either one fails to decode.
/// `exp` is only present when expiration was explicitly requested, tokens
/// without it never expire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Identifier of the user the token was issued to
    pub id: String,

    /// Role held by the user at issuance
    pub role: String,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Create claims for a user, stamped with the current time.
    ///
    /// # Arguments
    /// * `id` - Unique user identifier
    /// * `role` - Role name carried by the token
    ///
    /// # Returns
    /// Claims with id, role and iat set, without expiration
    pub fn new(id: impl ToString, role: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            iat: Some(Utc::now().timestamp()),
            exp: None,
        }
    }

    /// Expire the token `hours` after its issuance time.
    pub fn with_expiration_hours(mut self, hours: i64) -> Self {
        let issued_at = self.iat.unwrap_or_else(|| Utc::now().timestamp());
        self.exp = Some(issued_at + Duration::hours(hours).num_seconds());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }
}
