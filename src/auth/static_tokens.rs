//! Fixed token table for development and tests

use std::collections::HashMap;

use async_trait::async_trait;

use super::{AuthError, IdentityVerifier};

#[derive(Debug, Clone, Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, String>,
}

impl StaticIdentityVerifier {
    pub fn from_pairs<I, T, U>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            tokens: pairs
                .into_iter()
                .map(|(token, uid)| (token.into(), uid.into()))
                .collect(),
        }
    }

    /// Parse `token:uid,token:uid`. Entries without a `:` are skipped.
    pub fn parse(table: &str) -> Self {
        Self::from_pairs(table.split(',').filter_map(|entry| {
            let (token, uid) = entry.trim().split_once(':')?;
            let (token, uid) = (token.trim(), uid.trim());
            (!token.is_empty() && !uid.is_empty()).then(|| (token.to_string(), uid.to_string()))
        }))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(id_token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
