//! Error types for resource configuration and request compilation.
//!
//! Compilation itself has exactly one failure mode, [`Error::UnmetRequirements`].
//! The remaining variants surface while a [`Resource`](crate::Resource) is being
//! configured or when a compiled request is handed to the transport.

/// The main error type for building resources and compiling requests.
///
/// # Examples
///
/// ```
/// use weary::{Error, Resource};
///
/// let resource = Resource::get("/users/{id}").build()?;
///
/// match resource.compile([("q", "rust")]) {
///     Ok(request) => println!("GET {}", request.url),
///     Err(Error::UnmetRequirements { requirements }) => {
///         eprintln!("missing one of: {:?}", requirements);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The merged parameter map lacks one or more required names.
    ///
    /// The payload is the resource's full requirements set, not only the
    /// missing names, so the caller sees the whole contract of the endpoint.
    ///
    /// # Fields
    ///
    /// * `requirements` - Every required parameter and URL template variable
    #[error("Required parameters: {requirements:?}")]
    UnmetRequirements {
        /// The complete requirements of the resource, sorted.
        requirements: Vec<String>,
    },

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the resource was configured,
    /// such as an invalid method or invalid header values.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The URL template string could not be parsed.
    #[error("Invalid URL template: {0}")]
    Template(String),

    /// An invalid URL was produced by template expansion.
    ///
    /// This wraps URL parsing errors.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A serialized resource configuration could not be read.
    #[error("Invalid resource configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this error was raised because parameters were missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use weary::Error;
    ///
    /// let err = Error::UnmetRequirements {
    ///     requirements: vec!["id".to_string()],
    /// };
    /// assert!(err.is_unmet_requirements());
    ///
    /// let err = Error::ConfigurationError("bad header".to_string());
    /// assert!(!err.is_unmet_requirements());
    /// ```
    pub fn is_unmet_requirements(&self) -> bool {
        matches!(self, Error::UnmetRequirements { .. })
    }

    /// Returns the reported requirements if this is an `UnmetRequirements` error.
    pub fn requirements(&self) -> Option<&[String]> {
        match self {
            Error::UnmetRequirements { requirements } => Some(requirements),
            _ => None,
        }
    }
}

/// A specialized `Result` type for this crate.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmet_requirements_message_lists_full_set() {
        let err = Error::UnmetRequirements {
            requirements: vec!["id".to_string(), "token".to_string()],
        };

        assert_eq!(err.to_string(), r#"Required parameters: ["id", "token"]"#);
        assert_eq!(
            err.requirements(),
            Some(&["id".to_string(), "token".to_string()][..])
        );
    }

    #[test]
    fn test_requirements_absent_for_other_errors() {
        let err = Error::Template("unclosed expression".to_string());
        assert!(err.requirements().is_none());
        assert_eq!(err.to_string(), "Invalid URL template: unclosed expression");
    }
}
