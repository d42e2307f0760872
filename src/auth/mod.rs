//! Caller authentication
//!
//! Bearer credentials are handed to an external identity provider that
//! answers with a stable user id. Handlers only ever see that id.

mod firebase;
mod static_tokens;

use async_trait::async_trait;
use thiserror::Error;

pub use firebase::FirebaseIdentityVerifier;
pub use static_tokens::StaticIdentityVerifier;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingCredentials,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Identity provider collaborator
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an ID token and return the user id it was issued for
    async fn verify(&self, id_token: &str) -> Result<String, AuthError>;
}

/// Extract the token from a `Bearer <token>` authorization value
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    if header.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Parse the header and verify the token in one step
pub async fn authenticate(verifier: &dyn IdentityVerifier, header: &str) -> Result<String, AuthError> {
    let token = parse_bearer(header)?;
    let uid = verifier.verify(token).await?;
    tracing::debug!(uid = %uid, "caller authenticated");
    Ok(uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def"), Ok("abc.def"));
        assert_eq!(parse_bearer(""), Err(AuthError::MissingCredentials));
        assert_eq!(parse_bearer("abc.def"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("bearer abc"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Bearer a b"), Err(AuthError::MalformedHeader));
        assert_eq!(parse_bearer("Bearer "), Err(AuthError::MalformedHeader));
    }

    #[tokio::test]
    async fn test_authenticate_with_static_tokens() {
        let verifier = StaticIdentityVerifier::from_pairs([("tok-1", "user-1")]);

        assert_eq!(authenticate(&verifier, "Bearer tok-1").await, Ok("user-1".to_string()));
        assert_eq!(
            authenticate(&verifier, "Bearer tok-2").await,
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            authenticate(&verifier, "Token tok-1").await,
            Err(AuthError::MalformedHeader)
        );
    }
}
