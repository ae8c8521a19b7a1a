//! # Weary - declarative HTTP resources
//!
//! Weary describes an HTTP endpoint once, as a [`Resource`], and compiles that
//! description plus a map of runtime parameters into a [`CompiledRequest`]:
//! method, resolved URL, headers, query parameters and optional basic-auth
//! credentials. It performs no I/O; a compiled request can be handed to
//! `reqwest` with [`CompiledRequest::into_reqwest`].
//!
//! ## Quick Start
//!
//! ```
//! use weary::Resource;
//!
//! # fn main() -> Result<(), weary::Error> {
//! // Describe the endpoint once
//! let timeline = Resource::get("https://api.example.com/users/{user}/timeline")
//!     .optional(["since_id", "count"])
//!     .default_param("count", "20")
//!     .user_agent("my-app/1.0")
//!     .basic_auth()
//!     .build()?;
//!
//! // Compile it per call
//! let request = timeline.compile([
//!     ("user", "ada"),
//!     ("since_id", "1024"),
//!     ("username", "ada"),
//!     ("password", "secret"),
//!     ("unrelated", "dropped"),
//! ])?;
//!
//! assert_eq!(request.url, "https://api.example.com/users/ada/timeline");
//! assert_eq!(request.query_params["since_id"], "1024");
//! assert_eq!(request.query_params["count"], "20");
//! assert!(!request.query_params.contains_key("unrelated"));
//! assert!(request.credentials.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Compilation
//!
//! Compiling a resource:
//!
//! 1. fills in defaults for parameters the caller did not supply,
//! 2. checks that every required parameter and URL template variable is present,
//! 3. pulls basic-auth credentials out of the parameters, if enabled,
//! 4. expands the URL template with the template variables,
//! 5. keeps only declared (optional or required) names as query parameters.
//!
//! The only failure is [`Error::UnmetRequirements`], raised in step 2.
//!
//! ## Sending
//!
//! ```no_run
//! use weary::Resource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resource = Resource::get("https://api.example.com/users/{id}").build()?;
//! let client = reqwest::Client::new();
//!
//! let response = resource
//!     .compile([("id", "42")])?
//!     .into_reqwest(&client, None)?
//!     .send()
//!     .await?;
//! println!("Status: {}", response.status());
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod partition;
mod request;
mod resource;
pub mod template;

pub use config::{BasicAuthConfig, ResourceConfig};
pub use error::{Error, Result};
pub use partition::{Credentials, Params};
pub use request::CompiledRequest;
pub use resource::{CredentialKeys, Resource, ResourceBuilder};
pub use template::{UriTemplate, UrlTemplate};
