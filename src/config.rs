//! Serializable resource configuration.
//!
//! [`ResourceConfig`] mirrors the options accepted by
//! [`ResourceBuilder`](crate::ResourceBuilder), so resources can be declared in
//! JSON (or any other serde format) instead of code.

use crate::resource::{CredentialKeys, Resource, ResourceBuilder};
use crate::{Error, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A declarative resource description.
///
/// # Examples
///
/// ```
/// use weary::Resource;
///
/// let resource = Resource::from_json(r#"{
///     "method": "post",
///     "url": "https://api.example.com/users/{id}/notes",
///     "required": ["body"],
///     "defaults": { "format": "markdown" },
///     "optional": ["format"],
///     "userAgent": "notes-cli/2.1",
///     "basicAuth": { "usernameKey": "login" }
/// }"#)?;
///
/// assert_eq!(resource.method(), "POST");
/// assert!(resource.authenticates());
/// assert_eq!(resource.credential_keys().unwrap().username_key, "login");
/// assert_eq!(resource.credential_keys().unwrap().password_key, "password");
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    /// HTTP method name, case-insensitive. Defaults to `GET`.
    #[serde(default = "default_method")]
    pub method: String,

    /// URL template string.
    pub url: String,

    /// Optional parameter names.
    #[serde(default)]
    pub optional: Vec<String>,

    /// Required parameter names.
    #[serde(default)]
    pub required: Vec<String>,

    /// Default parameter values.
    #[serde(default)]
    pub defaults: HashMap<String, String>,

    /// Static headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Value for the `User-Agent` header; applied after `headers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Enables basic auth when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuthConfig>,
}

/// Credential parameter names for [`ResourceConfig::basic_auth`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuthConfig {
    /// Parameter holding the username.
    #[serde(default = "default_username_key")]
    pub username_key: String,

    /// Parameter holding the password.
    #[serde(default = "default_password_key")]
    pub password_key: String,
}

impl Default for BasicAuthConfig {
    fn default() -> Self {
        let keys = CredentialKeys::default();
        Self {
            username_key: keys.username_key,
            password_key: keys.password_key,
        }
    }
}

fn default_method() -> String {
    Method::GET.to_string()
}

fn default_username_key() -> String {
    CredentialKeys::default().username_key
}

fn default_password_key() -> String {
    CredentialKeys::default().password_key
}

impl ResourceConfig {
    /// Creates a GET configuration for `url` with no other options.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: default_method(),
            url: url.into(),
            optional: Vec::new(),
            required: Vec::new(),
            defaults: HashMap::new(),
            headers: BTreeMap::new(),
            user_agent: None,
            basic_auth: None,
        }
    }

    /// Converts the configuration into a builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the method name is invalid.
    pub fn into_builder(self) -> Result<ResourceBuilder> {
        let method = Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::ConfigurationError(format!("Invalid method: {}", e)))?;

        let mut builder = Resource::builder(method, self.url)
            .optional(self.optional)
            .required(self.required)
            .defaults(self.defaults)
            .headers(self.headers);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(auth) = self.basic_auth {
            builder = builder.basic_auth_with(auth.username_key, auth.password_key);
        }

        Ok(builder)
    }

    /// Builds the configured `Resource`.
    ///
    /// # Errors
    ///
    /// Fails like [`ResourceConfig::into_builder`] and
    /// [`ResourceBuilder::build`].
    pub fn build(self) -> Result<Resource> {
        self.into_builder()?.build()
    }
}

impl Resource {
    /// Builds a resource from a JSON [`ResourceConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed JSON, otherwise fails
    /// like [`ResourceConfig::build`].
    pub fn from_json(json: &str) -> Result<Resource> {
        let config: ResourceConfig = serde_json::from_str(json)?;
        config.build()
    }
}
