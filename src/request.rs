//! The outgoing request produced by compiling a resource.
//!
//! A [`CompiledRequest`] is a plain description: method, resolved URL,
//! headers, query parameters and optional basic-auth credentials. Nothing is
//! sent. [`CompiledRequest::into_reqwest`] hands the description to a
//! `reqwest::Client` as a ready-to-send `RequestBuilder`.

use crate::partition::{Credentials, Params};
use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// A fully resolved request description.
///
/// Created fresh by every call to [`Resource::compile`](crate::Resource::compile);
/// the caller owns it and may adjust it freely before sending.
///
/// # Examples
///
/// ```
/// use weary::Resource;
///
/// let resource = Resource::get("https://api.example.com/users/{id}")
///     .optional(["fields"])
///     .user_agent("weary-docs/1.0")
///     .build()?;
///
/// let request = resource.compile([("id", "42"), ("fields", "name")])?;
///
/// assert_eq!(request.url, "https://api.example.com/users/42");
/// assert_eq!(request.query_params["fields"], "name");
/// assert_eq!(request.header("user-agent"), Some("weary-docs/1.0"));
/// assert!(request.credentials.is_none());
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CompiledRequest {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The URL produced by expanding the resource's template.
    ///
    /// This may be relative if the template was; see [`CompiledRequest::to_url`].
    pub url: String,

    /// Headers copied from the resource.
    pub headers: HeaderMap,

    /// Query parameters, restricted to the names the resource expects.
    pub query_params: Params,

    /// Basic-auth credentials, present only when the resource authenticates.
    pub credentials: Option<Credentials>,
}

impl CompiledRequest {
    /// Creates a request with no headers, query parameters or credentials.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query_params: Params::new(),
            credentials: None,
        }
    }

    /// Applies a transformation to the request and returns the result.
    ///
    /// This is the place for last-mile customization that the resource
    /// definition does not express.
    ///
    /// # Examples
    ///
    /// ```
    /// use weary::Resource;
    ///
    /// let resource = Resource::get("https://api.example.com/feed").build()?;
    /// let request = resource
    ///     .compile(Vec::<(String, String)>::new())?
    ///     .map(|r| r.with_query_param("page", "2"));
    ///
    /// assert_eq!(request.query_params["page"], "2");
    /// # Ok::<(), weary::Error>(())
    /// ```
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        f(self)
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Sets the basic-auth credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: Some(username.into()),
            password: password.map(Into::into),
        });
        self
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Builds the final URL, query parameters included.
    ///
    /// A relative resolved URL is joined onto `base`. Query pairs are appended
    /// in key order so the result is stable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL does not parse, including a
    /// relative URL with no `base`.
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use weary::Resource;
    ///
    /// let resource = Resource::get("/users/{id}").optional(["q"]).build()?;
    /// let request = resource.compile([("id", "7"), ("q", "x y")])?;
    ///
    /// let base = Url::parse("https://api.example.com")?;
    /// assert_eq!(
    ///     request.to_url(Some(&base))?.as_str(),
    ///     "https://api.example.com/users/7?q=x+y"
    /// );
    /// assert!(request.to_url(None).is_err());
    /// # Ok::<(), weary::Error>(())
    /// ```
    pub fn to_url(&self, base: Option<&Url>) -> Result<Url> {
        let mut url = match base {
            Some(base) => base.join(&self.url)?,
            None => Url::parse(&self.url)?,
        };

        if !self.query_params.is_empty() {
            let mut pairs: Vec<_> = self.query_params.iter().collect();
            pairs.sort();
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    /// Hands the request to `client` as a `reqwest::RequestBuilder`.
    ///
    /// The method and URL are set first, then headers, then basic auth. No
    /// `Authorization` header is added when neither credential was supplied.
    /// The builder is returned unsent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] under the same conditions as
    /// [`CompiledRequest::to_url`].
    pub fn into_reqwest(
        self,
        client: &reqwest::Client,
        base: Option<&Url>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.to_url(base)?;
        let credentials = self.credentials.filter(|c| !c.is_empty());

        tracing::debug!(
            method = %self.method,
            url = %url,
            headers = self.headers.len(),
            authenticated = credentials.is_some(),
            "Preparing HTTP request"
        );

        let mut request = client.request(self.method, url).headers(self.headers);

        if let Some(credentials) = credentials {
            request = request.basic_auth(
                credentials.username.unwrap_or_default(),
                credentials.password,
            );
        }

        Ok(request)
    }
}

/// Validates a header name/value pair.
pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}
