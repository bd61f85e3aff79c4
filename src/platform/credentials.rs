use crate::error::{LakehouseError, Result};
use crate::platform::{CredentialProvider, TokenScope};

/// Hands out a token read from configuration (`LAKEHOUSE_STORAGE_TOKEN`).
///
/// Without a token every request fails, so OneLake writes surface a
/// credential failure instead of an anonymous request.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl CredentialProvider for StaticTokenProvider {
    fn token(&self, scope: TokenScope) -> Result<String> {
        self.token
            .clone()
            .ok_or_else(|| LakehouseError::Credential(format!("no token configured for scope '{}'", scope)))
    }
}
