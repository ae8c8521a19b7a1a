//! Splitting a parameter map into its three destinations.
//!
//! Every caller-supplied parameter ends up in exactly one place: bound into
//! the URL template, used as a basic-auth credential, or left over as a
//! candidate query parameter.

use crate::resource::CredentialKeys;
use std::collections::HashMap;

/// Caller-supplied parameters, keyed by name.
pub type Params = HashMap<String, String>;

/// Basic-auth credentials pulled out of a parameter map.
///
/// Either half may be missing; extraction never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The value found under the configured username key.
    pub username: Option<String>,
    /// The value found under the configured password key.
    pub password: Option<String>,
}

impl Credentials {
    /// Returns `true` if neither half was found.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

/// The result of [`partition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Values for the URL template variables that were present.
    pub url_bindings: HashMap<String, String>,
    /// Credentials, if credential keys were given.
    pub credentials: Option<Credentials>,
    /// Everything else.
    pub remaining: Params,
}

/// Splits `params` into URL bindings, credentials and the remaining entries.
///
/// Credentials are taken first, so a name configured both as a credential key
/// and as a template variable goes to the credentials. Passing `None` for
/// `credential_keys` leaves credential-looking entries in `remaining`.
///
/// # Examples
///
/// ```
/// use weary::partition::partition;
/// use weary::{CredentialKeys, Params};
///
/// let params: Params = [("id", "7"), ("username", "ada"), ("q", "rust")]
///     .into_iter()
///     .map(|(k, v)| (k.to_string(), v.to_string()))
///     .collect();
///
/// let split = partition(params, &["id".to_string()], Some(&CredentialKeys::default()));
///
/// assert_eq!(split.url_bindings["id"], "7");
/// assert_eq!(split.credentials.unwrap().username.as_deref(), Some("ada"));
/// assert_eq!(split.remaining.len(), 1);
/// assert_eq!(split.remaining["q"], "rust");
/// ```
pub fn partition(
    mut params: Params,
    url_variables: &[String],
    credential_keys: Option<&CredentialKeys>,
) -> Partition {
    let credentials = credential_keys.map(|keys| Credentials {
        username: params.remove(&keys.username_key),
        password: params.remove(&keys.password_key),
    });

    let url_bindings = url_variables
        .iter()
        .filter_map(|name| params.remove_entry(name))
        .collect();

    Partition {
        url_bindings,
        credentials,
        remaining: params,
    }
}
