//! Resource definitions and request compilation.
//!
//! A [`Resource`] is configured once through a [`ResourceBuilder`] and is
//! immutable afterwards. Each call to [`Resource::compile`] merges defaults
//! into the caller's parameters, checks the requirements, extracts
//! credentials, expands the URL template and filters what is left down to the
//! declared query parameters.

use crate::partition::{partition, Params};
use crate::request::{header_pair, CompiledRequest};
use crate::template::{UriTemplate, UrlTemplate};
use crate::{Error, Result};
use http::{header, HeaderMap, Method};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Names of the parameters that carry basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialKeys {
    /// Parameter holding the username.
    pub username_key: String,
    /// Parameter holding the password.
    pub password_key: String,
}

impl CredentialKeys {
    /// Creates credential keys with custom parameter names.
    pub fn new(username_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Self {
            username_key: username_key.into(),
            password_key: password_key.into(),
        }
    }
}

impl Default for CredentialKeys {
    fn default() -> Self {
        Self::new("username", "password")
    }
}

/// A declarative description of one HTTP endpoint.
///
/// Cloning is cheap and a `Resource` can be shared across threads; compiling
/// never mutates it.
///
/// # Examples
///
/// ```
/// use weary::{Error, Resource};
///
/// let resource = Resource::get("https://api.example.com/repos/{owner}/{repo}/issues")
///     .optional(["state", "labels"])
///     .required(["token"])
///     .default_param("state", "open")
///     .build()?;
///
/// let request = resource.compile([
///     ("owner", "rust-lang"),
///     ("repo", "rust"),
///     ("token", "abc"),
///     ("junk", "dropped"),
/// ])?;
///
/// assert_eq!(request.url, "https://api.example.com/repos/rust-lang/rust/issues");
/// assert_eq!(request.query_params.len(), 2);
/// assert_eq!(request.query_params["state"], "open");
/// assert_eq!(request.query_params["token"], "abc");
///
/// let err = resource.compile([("owner", "rust-lang")]).unwrap_err();
/// assert!(matches!(err, Error::UnmetRequirements { .. }));
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    method: Method,
    url: Arc<dyn UrlTemplate>,
    optional: Vec<String>,
    required: Vec<String>,
    defaults: Params,
    headers: HeaderMap,
    credentials: Option<CredentialKeys>,
}

impl Resource {
    /// Creates a builder for a resource with the given method and URL template.
    pub fn builder(method: Method, template: impl Into<String>) -> ResourceBuilder {
        ResourceBuilder::new(method, template)
    }

    /// Creates a builder for a GET resource.
    pub fn get(template: impl Into<String>) -> ResourceBuilder {
        Self::builder(Method::GET, template)
    }

    /// Creates a builder for a POST resource.
    pub fn post(template: impl Into<String>) -> ResourceBuilder {
        Self::builder(Method::POST, template)
    }

    /// Creates a builder for a PUT resource.
    pub fn put(template: impl Into<String>) -> ResourceBuilder {
        Self::builder(Method::PUT, template)
    }

    /// Creates a builder for a PATCH resource.
    pub fn patch(template: impl Into<String>) -> ResourceBuilder {
        Self::builder(Method::PATCH, template)
    }

    /// Creates a builder for a DELETE resource.
    pub fn delete(template: impl Into<String>) -> ResourceBuilder {
        Self::builder(Method::DELETE, template)
    }

    /// Reopens this resource for configuration.
    ///
    /// The returned builder starts from the current settings; building it
    /// yields a new resource and leaves this one untouched.
    pub fn to_builder(&self) -> ResourceBuilder {
        ResourceBuilder {
            method: self.method.clone(),
            url: TemplateSource::Custom(Arc::clone(&self.url)),
            optional: self.optional.clone(),
            required: self.required.clone(),
            defaults: self.defaults.clone(),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| HeaderSource::Parsed(name.clone(), value.clone()))
                .collect(),
            credentials: self.credentials.clone(),
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The URL template.
    pub fn url(&self) -> &dyn UrlTemplate {
        self.url.as_ref()
    }

    /// Parameter names declared optional.
    pub fn optional(&self) -> &[String] {
        &self.optional
    }

    /// Parameter names declared required.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Values used for parameters the caller does not supply.
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Headers sent with every compiled request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The credential parameter names, if basic auth is enabled.
    pub fn credential_keys(&self) -> Option<&CredentialKeys> {
        self.credentials.as_ref()
    }

    /// Returns `true` if compiled requests carry basic-auth credentials.
    pub fn authenticates(&self) -> bool {
        self.credentials.is_some()
    }

    /// Names allowed to appear as query parameters: optional ∪ required.
    pub fn expected_params(&self) -> BTreeSet<String> {
        self.optional.iter().chain(&self.required).cloned().collect()
    }

    /// Returns `true` if `name` is an expected parameter.
    pub fn expects(&self, name: &str) -> bool {
        self.optional.iter().chain(&self.required).any(|p| p == name)
    }

    /// Names that must be present to compile: required ∪ template variables.
    pub fn requirements(&self) -> BTreeSet<String> {
        self.required
            .iter()
            .cloned()
            .chain(self.url.variable_names())
            .collect()
    }

    /// Returns `true` if every requirement is a key of `params`.
    pub fn meets_requirements(&self, params: &Params) -> bool {
        self.requirements()
            .iter()
            .all(|name| params.contains_key(name))
    }

    /// Compiles `params` into a request.
    ///
    /// Keys and values may be any string-like type; they are normalized to
    /// `String` before anything else happens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmetRequirements`] if, after defaults are merged, a
    /// required parameter or template variable is missing. The error carries
    /// the full requirements set.
    pub fn compile<I, K, V>(&self, params: I) -> Result<CompiledRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: Params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for (key, value) in &self.defaults {
            params
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        if !self.meets_requirements(&params) {
            let requirements: Vec<String> = self.requirements().into_iter().collect();
            let missing: Vec<&String> = requirements
                .iter()
                .filter(|name| !params.contains_key(*name))
                .collect();
            tracing::warn!(
                method = %self.method,
                missing = ?missing,
                "Unmet resource requirements"
            );
            return Err(Error::UnmetRequirements { requirements });
        }

        let split = partition(
            params,
            &self.url.variable_names(),
            self.credentials.as_ref(),
        );
        let url = self.url.expand(&split.url_bindings);

        let query_params: Params = if self.optional.is_empty() && self.required.is_empty() {
            Params::new()
        } else {
            split
                .remaining
                .into_iter()
                .filter(|(name, _)| {
                    let keep = self.expects(name);
                    if !keep {
                        tracing::trace!(param = %name, "Dropping undeclared parameter");
                    }
                    keep
                })
                .collect()
        };

        tracing::debug!(
            method = %self.method,
            url = %url,
            query_params = query_params.len(),
            authenticated = split.credentials.is_some(),
            "Compiled request"
        );

        Ok(CompiledRequest {
            method: self.method.clone(),
            url,
            headers: self.headers.clone(),
            query_params,
            credentials: split.credentials,
        })
    }

    /// Compiles `params` and lets `configure` adjust the request before it is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use weary::Resource;
    ///
    /// let resource = Resource::get("https://api.example.com/me").build()?;
    /// let request = resource.compile_with(Vec::<(String, String)>::new(), |r| {
    ///     r.url.push_str("/settings");
    /// })?;
    ///
    /// assert_eq!(request.url, "https://api.example.com/me/settings");
    /// # Ok::<(), weary::Error>(())
    /// ```
    pub fn compile_with<I, K, V, F>(&self, params: I, configure: F) -> Result<CompiledRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        F: FnOnce(&mut CompiledRequest),
    {
        let mut request = self.compile(params)?;
        configure(&mut request);
        Ok(request)
    }
}

#[derive(Debug, Clone)]
enum TemplateSource {
    Raw(String),
    Custom(Arc<dyn UrlTemplate>),
}

#[derive(Debug, Clone)]
enum HeaderSource {
    Raw(String, String),
    Parsed(header::HeaderName, header::HeaderValue),
}

/// Builder for configuring and creating a [`Resource`].
///
/// Setters replace earlier values; `optional(["a"]).optional(["b"])` leaves
/// only `b` declared. Validation of the template and headers is deferred to
/// [`ResourceBuilder::build`].
///
/// # Examples
///
/// ```
/// use weary::Resource;
///
/// let resource = Resource::post("https://api.example.com/statuses/update.json")
///     .required(["status"])
///     .optional(["in_reply_to_status_id"])
///     .header("Accept", "application/json")
///     .user_agent("my-app/1.0")
///     .basic_auth()
///     .build()?;
///
/// assert!(resource.authenticates());
/// assert!(resource.expects("status"));
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResourceBuilder {
    method: Method,
    url: TemplateSource,
    optional: Vec<String>,
    required: Vec<String>,
    defaults: Params,
    headers: Vec<HeaderSource>,
    credentials: Option<CredentialKeys>,
}

impl ResourceBuilder {
    /// Creates a new builder with the given method and URL template.
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            url: TemplateSource::Raw(template.into()),
            optional: Vec::new(),
            required: Vec::new(),
            defaults: Params::new(),
            headers: Vec::new(),
            credentials: None,
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replaces the URL template with a template string.
    pub fn url(mut self, template: impl Into<String>) -> Self {
        self.url = TemplateSource::Raw(template.into());
        self
    }

    /// Replaces the URL template with a custom implementation.
    pub fn url_template(mut self, template: impl UrlTemplate + 'static) -> Self {
        self.url = TemplateSource::Custom(Arc::new(template));
        self
    }

    /// Declares the optional parameters, replacing any earlier declaration.
    pub fn optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional = names.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the required parameters, replacing any earlier declaration.
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the default parameter values.
    pub fn defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.defaults = defaults
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Adds or replaces one default parameter value.
    pub fn default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Replaces the static headers.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| HeaderSource::Raw(k.into(), v.into()))
            .collect();
        self
    }

    /// Adds one static header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderSource::Raw(name.into(), value.into()));
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(self, agent: impl Into<String>) -> Self {
        self.header(header::USER_AGENT.as_str(), agent)
    }

    /// Enables basic auth, reading credentials from the `username` and
    /// `password` parameters.
    pub fn basic_auth(self) -> Self {
        self.basic_auth_keys(CredentialKeys::default())
    }

    /// Enables basic auth, reading credentials from the given parameters.
    pub fn basic_auth_with(
        self,
        username_key: impl Into<String>,
        password_key: impl Into<String>,
    ) -> Self {
        self.basic_auth_keys(CredentialKeys::new(username_key, password_key))
    }

    /// Enables basic auth with prepared credential keys.
    pub fn basic_auth_keys(mut self, keys: CredentialKeys) -> Self {
        self.credentials = Some(keys);
        self
    }

    /// Builds the configured `Resource`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if the template string is malformed, or
    /// [`Error::ConfigurationError`] if a header name or value is invalid.
    pub fn build(self) -> Result<Resource> {
        let url: Arc<dyn UrlTemplate> = match self.url {
            TemplateSource::Raw(source) => Arc::new(UriTemplate::parse(source)?),
            TemplateSource::Custom(template) => template,
        };

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for source in self.headers {
            let (name, value) = match source {
                HeaderSource::Raw(name, value) => header_pair(&name, &value)?,
                HeaderSource::Parsed(name, value) => (name, value),
            };
            headers.insert(name, value);
        }

        Ok(Resource {
            method: self.method,
            url,
            optional: self.optional,
            required: self.required,
            defaults: self.defaults,
            headers,
            credentials: self.credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_requirements_are_required_union_template_variables() {
        let resource = Resource::get("/{owner}/{repo}/{owner}")
            .required(["repo", "token"])
            .build()
            .unwrap();

        assert_eq!(resource.requirements(), set(&["owner", "repo", "token"]));
    }

    #[test]
    fn test_requirements_ignore_declaration_order() {
        let a = Resource::get("/{id}")
            .required(["x", "y"])
            .build()
            .unwrap();
        let b = Resource::get("/{id}")
            .required(["y", "x", "id"])
            .build()
            .unwrap();

        assert_eq!(a.requirements(), b.requirements());
    }

    #[test]
    fn test_expected_params_union() {
        let resource = Resource::get("/search")
            .optional(["q", "page"])
            .required(["q", "key"])
            .build()
            .unwrap();

        assert_eq!(resource.expected_params(), set(&["key", "page", "q"]));
        assert!(resource.expects("page"));
        assert!(resource.expects("key"));
        assert!(!resource.expects("junk"));
    }

    #[test]
    fn test_getters_are_idempotent() {
        let resource = Resource::get("/search")
            .optional(["q"])
            .build()
            .unwrap();

        let first = resource.optional().to_vec();
        let second = resource.optional().to_vec();
        assert_eq!(first, second);
        assert_eq!(first, vec!["q".to_string()]);
    }

    #[test]
    fn test_setters_replace_rather_than_append() {
        let resource = Resource::get("/search")
            .optional(["a"])
            .optional(["b"])
            .required(["c"])
            .required(Vec::<String>::new())
            .build()
            .unwrap();

        assert_eq!(resource.optional(), ["b".to_string()]);
        assert!(resource.required().is_empty());
    }

    #[test]
    fn test_url_setter_rewraps_string() {
        let resource = Resource::get("/old")
            .url("/users/{id}")
            .build()
            .unwrap();

        assert_eq!(resource.url().variable_names(), vec!["id".to_string()]);
    }

    #[test]
    fn test_meets_requirements() {
        let resource = Resource::get("/users/{id}")
            .required(["token"])
            .build()
            .unwrap();

        let mut params = Params::new();
        params.insert("id".to_string(), "1".to_string());
        assert!(!resource.meets_requirements(&params));

        params.insert("token".to_string(), "t".to_string());
        assert!(resource.meets_requirements(&params));
    }

    #[test]
    fn test_compile_fails_with_full_requirement_set() {
        let resource = Resource::get("/users/{id}")
            .required(["token"])
            .build()
            .unwrap();

        match resource.compile([("token", "t")]) {
            Err(Error::UnmetRequirements { requirements }) => {
                assert_eq!(requirements, vec!["id".to_string(), "token".to_string()]);
            }
            other => panic!("Expected UnmetRequirements, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_fill_missing_requirements() {
        let resource = Resource::get("/users/{id}")
            .default_param("id", "me")
            .build()
            .unwrap();

        let request = resource.compile(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(request.url, "/users/me");
    }

    #[test]
    fn test_defaults_never_override_caller_values() {
        let resource = Resource::get("/search")
            .optional(["a"])
            .defaults([("a", "y")])
            .build()
            .unwrap();

        let request = resource.compile([("a", "x")]).unwrap();
        assert_eq!(request.query_params["a"], "x");
    }

    #[test]
    fn test_url_variables_are_not_query_params() {
        let resource = Resource::get("/users/{id}")
            .optional(["id", "q"])
            .build()
            .unwrap();

        let request = resource.compile([("id", "7"), ("q", "x")]).unwrap();

        assert_eq!(request.url, "/users/7");
        assert_eq!(request.query_params.len(), 1);
        assert_eq!(request.query_params["q"], "x");
    }

    #[test]
    fn test_unexpected_params_are_dropped() {
        let resource = Resource::get("/search").optional(["q"]).build().unwrap();

        let request = resource.compile([("q", "x"), ("junk", "y")]).unwrap();

        assert_eq!(request.query_params.len(), 1);
        assert!(!request.query_params.contains_key("junk"));
    }

    #[test]
    fn test_no_expected_params_means_no_query() {
        let resource = Resource::get("/status").build().unwrap();

        let request = resource.compile([("q", "x"), ("junk", "y")]).unwrap();
        assert!(request.query_params.is_empty());
    }

    #[test]
    fn test_credentials_are_extracted_and_kept_out_of_query() {
        let resource = Resource::get("/me")
            .optional(["user", "pass", "q"])
            .basic_auth_with("user", "pass")
            .build()
            .unwrap();

        let request = resource
            .compile([("user", "a"), ("pass", "b"), ("q", "x")])
            .unwrap();

        let credentials = request.credentials.unwrap();
        assert_eq!(credentials.username.as_deref(), Some("a"));
        assert_eq!(credentials.password.as_deref(), Some("b"));
        let keys: HashSet<&str> = request.query_params.keys().map(String::as_str).collect();
        assert_eq!(keys, HashSet::from(["q"]));
    }

    #[test]
    fn test_missing_credentials_degrade_gracefully() {
        let resource = Resource::get("/me").basic_auth().build().unwrap();

        let request = resource.compile([("username", "ada")]).unwrap();

        let credentials = request.credentials.unwrap();
        assert_eq!(credentials.username.as_deref(), Some("ada"));
        assert_eq!(credentials.password, None);
    }

    #[test]
    fn test_credentials_absent_without_basic_auth() {
        let resource = Resource::get("/me").optional(["username"]).build().unwrap();

        let request = resource.compile([("username", "ada")]).unwrap();

        assert!(!resource.authenticates());
        assert!(request.credentials.is_none());
        assert_eq!(request.query_params["username"], "ada");
    }

    #[test]
    fn test_headers_and_user_agent_are_copied() {
        let resource = Resource::get("/me")
            .headers([("Accept", "application/json")])
            .user_agent("weary-test")
            .build()
            .unwrap();

        let request = resource.compile(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("user-agent"), Some("weary-test"));
    }

    #[test]
    fn test_invalid_header_fails_build() {
        let result = Resource::get("/me").header("bad header", "x").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_invalid_template_fails_build() {
        let result = Resource::get("/users/{id").build();
        assert!(matches!(result, Err(Error::Template(_))));
    }

    #[test]
    fn test_compile_with_runs_configure_once() {
        let resource = Resource::get("/me").build().unwrap();
        let mut calls = 0;

        let request = resource
            .compile_with(Vec::<(String, String)>::new(), |r| {
                calls += 1;
                r.method = Method::HEAD;
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(request.method, Method::HEAD);
    }

    #[test]
    fn test_to_builder_leaves_original_untouched() {
        let original = Resource::get("/users/{id}")
            .optional(["q"])
            .user_agent("one")
            .build()
            .unwrap();

        let changed = original
            .to_builder()
            .optional(["page"])
            .basic_auth()
            .build()
            .unwrap();

        assert_eq!(original.optional(), ["q".to_string()]);
        assert!(!original.authenticates());
        assert_eq!(changed.optional(), ["page".to_string()]);
        assert!(changed.authenticates());
        assert_eq!(changed.headers().get("user-agent").unwrap(), "one");
        assert_eq!(changed.requirements(), set(&["id"]));
    }

    #[test]
    fn test_resource_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Resource>();
    }
}
