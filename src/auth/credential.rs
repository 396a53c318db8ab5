//! Caller credentials

use std::fmt;

/// Proof of caller identity presented on connect
///
/// Callers never branch on the credential shape; the gate dispatches on it.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Bearer token from the `Authorization` header
    Bearer(String),
    /// One-time webhook token scoped to a dataset
    Webhook(String),
}

impl Credential {
    /// Build a credential from the optional parts of a connect request
    ///
    /// Empty strings count as absent. When both are present the bearer
    /// token wins. Returns `None` if neither is usable.
    pub fn from_parts(bearer: Option<&str>, webhook: Option<&str>) -> Option<Self> {
        let bearer = bearer.map(str::trim).filter(|t| !t.is_empty());
        let webhook = webhook.map(str::trim).filter(|t| !t.is_empty());

        match (bearer, webhook) {
            (Some(token), _) => Some(Credential::Bearer(token.to_owned())),
            (None, Some(token)) => Some(Credential::Webhook(token.to_owned())),
            (None, None) => None,
        }
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn bearer_from_header(value: &str) -> Option<&str> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if scheme.eq_ignore_ascii_case("bearer") {
            let token = token.trim();
            (!token.is_empty()).then_some(token)
        } else {
            None
        }
    }

    /// The raw token
    pub fn token(&self) -> &str {
        match self {
            Credential::Bearer(token) | Credential::Webhook(token) => token,
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Bearer(_) => "bearer",
            Credential::Webhook(_) => "webhook",
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::Webhook(_) => f.write_str("Webhook(***)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(
            Credential::from_parts(Some("abc"), None),
            Some(Credential::Bearer("abc".into()))
        );
        assert_eq!(
            Credential::from_parts(None, Some("xyz")),
            Some(Credential::Webhook("xyz".into()))
        );
        assert_eq!(
            Credential::from_parts(Some("abc"), Some("xyz")),
            Some(Credential::Bearer("abc".into()))
        );
        assert_eq!(Credential::from_parts(None, None), None);
        assert_eq!(Credential::from_parts(Some(""), Some("  ")), None);
    }

    #[test]
    fn test_bearer_from_header() {
        assert_eq!(Credential::bearer_from_header("Bearer abc"), Some("abc"));
        assert_eq!(Credential::bearer_from_header("bearer  abc "), Some("abc"));
        assert_eq!(Credential::bearer_from_header("Basic abc"), None);
        assert_eq!(Credential::bearer_from_header("Bearer "), None);
        assert_eq!(Credential::bearer_from_header("abc"), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::Bearer("secret-token".into());
        assert_eq!(format!("{:?}", cred), "Bearer(***)");
        assert_eq!(cred.token(), "secret-token");
        assert_eq!(cred.kind(), "bearer");
    }
}
