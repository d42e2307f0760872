//! Firebase ID token verification via the Identity Toolkit REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{AuthError, IdentityVerifier};

pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    disabled: bool,
}

/// Verifies tokens with `accounts:lookup`
#[derive(Debug, Clone)]
pub struct FirebaseIdentityVerifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl FirebaseIdentityVerifier {
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
        })
    }

    fn lookup_url(&self) -> String {
        format!("{}/accounts:lookup?key={}", self.endpoint, self.api_key)
    }
}

fn uid_from_lookup(response: LookupResponse) -> Result<String, AuthError> {
    match response.users.into_iter().next() {
        Some(user) if !user.disabled && !user.local_id.is_empty() => Ok(user.local_id),
        _ => Err(AuthError::InvalidToken),
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(self.lookup_url())
            .json(&LookupRequest { id_token })
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        match response.status() {
            // Identity Toolkit answers 400 INVALID_ID_TOKEN / TOKEN_EXPIRED
            StatusCode::BAD_REQUEST => {
                tracing::debug!("identity provider rejected token");
                Err(AuthError::InvalidToken)
            }
            status if status.is_success() => {
                let body: LookupResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Provider(e.to_string()))?;
                uid_from_lookup(body)
            }
            status => {
                tracing::warn!(%status, "identity provider returned unexpected status");
                Err(AuthError::Provider(format!("unexpected status {}", status)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> LookupResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_uid_from_lookup() {
        let body = parse(r#"{"kind": "identitytoolkit#GetAccountInfoResponse", "users": [{"localId": "uid-123", "email": "a@b.c"}]}"#);
        assert_eq!(uid_from_lookup(body), Ok("uid-123".to_string()));
    }

    #[test]
    fn test_uid_from_lookup_rejects_empty_and_disabled() {
        assert_eq!(uid_from_lookup(parse("{}")), Err(AuthError::InvalidToken));
        assert_eq!(
            uid_from_lookup(parse(r#"{"users": [{"localId": "uid-1", "disabled": true}]}"#)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_lookup_url_trims_trailing_slash() {
        let verifier =
            FirebaseIdentityVerifier::new("key-1", Some("http://localhost:9099/v1/".to_string())).unwrap();
        assert_eq!(verifier.lookup_url(), "http://localhost:9099/v1/accounts:lookup?key=key-1");
    }
}
