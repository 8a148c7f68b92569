use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::profile::error::{ProfileError, validation_error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env {
        var: String,
    },
    InlineToken {
        token: String,
    },
    #[default]
    None,
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub auth_header: Option<String>,
}

impl ResolvedCredential {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn bearer(token: &str) -> Self {
        Self {
            auth_header: Some(format!("Bearer {}", token.trim())),
        }
    }
}

impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("auth_header", &self.auth_header.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, ProfileError>;
}

#[derive(Default)]
pub struct EnvCredentialProvider;

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn resolve(&self, reference: &CredentialRef) -> Result<ResolvedCredential, ProfileError> {
        match reference {
            CredentialRef::Env { var } => match env::var(var) {
                Ok(token) if !token.trim().is_empty() => Ok(ResolvedCredential::bearer(&token)),
                _ => {
                    tracing::warn!(
                        target: "credentials",
                        var = %var,
                        "credential_env_missing_falling_back_to_anonymous"
                    );
                    Ok(ResolvedCredential::none())
                }
            },
            CredentialRef::InlineToken { token } => {
                if token.trim().is_empty() {
                    return Err(validation_error("inline credential token cannot be empty"));
                }
                Ok(ResolvedCredential::bearer(token))
            }
            CredentialRef::None => Ok(ResolvedCredential::none()),
        }
    }
}
