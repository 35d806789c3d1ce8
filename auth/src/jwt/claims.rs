use serde::Deserialize;
use serde::Serialize;

/// Claim set carried inside a signed token.
///
/// This struct is the wire contract: standard RFC 7519 claims plus the
/// service's custom claims. `roles` is omitted from the payload entirely
/// when empty; existing clients expect the claim to be absent rather than
/// an empty array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject: stringified account id
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Account id as a number
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Username at issuance time
    pub username: String,

    /// Role names; absent when the account carries no roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Claims {
    /// Role names, empty slice when the claim is absent.
    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or(&[])
    }
}
