//! Client configuration.
//!
//! A `ClientConfig` is built once, validated on construction and never
//! mutated afterwards.

use std::fmt;

use crate::error::ApiError;

/// Environment variable holding the API root, e.g. `https://mautic.example.com`.
pub const ENV_BASE_URL: &str = "MAUTIC_BASE_URL";
/// Environment variable holding the Basic auth user.
pub const ENV_USER: &str = "MAUTIC_USER";
/// Environment variable holding the Basic auth password.
pub const ENV_PASSWORD: &str = "MAUTIC_PASSWORD";

/// Password wrapper that never reveals its contents in `Debug`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<secret>")
    }
}

/// Connection settings: where the API lives and who is calling it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    user: String,
    password: Secret,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Read the configuration from `MAUTIC_BASE_URL`, `MAUTIC_USER` and
    /// `MAUTIC_PASSWORD`.
    pub fn from_env() -> Result<Self, ApiError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| ApiError::ConfigMissing(name.to_string()))
        };
        Self::builder()
            .base_url(var(ENV_BASE_URL)?)
            .user(var(ENV_USER)?)
            .password(var(ENV_PASSWORD)?)
            .build()
    }

    /// API root that every request path is appended to, verbatim.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        self.password.expose()
    }
}

/// Named options for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: String,
    user: String,
    password: Secret,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Secret::new(password);
        self
    }

    /// Validate and freeze the configuration. The base URL must be non-empty
    /// and carry an `http://` or `https://` scheme; it is otherwise kept
    /// exactly as given.
    pub fn build(self) -> Result<ClientConfig, ApiError> {
        if self.base_url.is_empty() {
            return Err(ApiError::ConfigMissing("base_url".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        Ok(ClientConfig {
            base_url: self.base_url,
            user: self.user,
            password: self.password,
        })
    }
}
