//! URL templates.
//!
//! A [`Resource`](crate::Resource) only needs two things from its URL template:
//! the names of the variables it declares, and a way to expand it once those
//! variables are bound. That contract is the [`UrlTemplate`] trait.
//!
//! [`UriTemplate`] is the implementation used when a resource is configured
//! from a plain string. It understands the simple forms of RFC 6570:
//!
//! - `{var}` - simple string expansion, values are percent-encoded
//! - `{x,y}` - several variables joined with `,`
//! - `{+var}` - reserved expansion, reserved characters pass through
//!
//! Other operators (`{?q}`, `{/seg}`, ...) are rejected at parse time. Callers
//! that need them can implement [`UrlTemplate`] themselves and install it with
//! [`ResourceBuilder::url_template`](crate::ResourceBuilder::url_template).

use crate::{Error, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Characters left alone by simple expansion (RFC 3986 unreserved).
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters left alone by reserved expansion.
const RESERVED: &AsciiSet = &UNRESERVED
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'%');

/// The collaborator interface a resource uses to resolve its URL.
///
/// Implementations must be cheap to share: a built resource holds its
/// template behind an `Arc` and may be compiled from many threads.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use weary::{Resource, UrlTemplate};
///
/// #[derive(Debug)]
/// struct Fixed(&'static str);
///
/// impl UrlTemplate for Fixed {
///     fn variable_names(&self) -> Vec<String> {
///         Vec::new()
///     }
///
///     fn expand(&self, _bindings: &HashMap<String, String>) -> String {
///         self.0.to_string()
///     }
/// }
///
/// let resource = Resource::get("/ignored")
///     .url_template(Fixed("https://example.com/status"))
///     .build()?;
///
/// let request = resource.compile(Vec::<(String, String)>::new())?;
/// assert_eq!(request.url, "https://example.com/status");
/// # Ok::<(), weary::Error>(())
/// ```
pub trait UrlTemplate: fmt::Debug + Send + Sync {
    /// Names of the variables declared by the template, in order of first
    /// appearance and without duplicates.
    fn variable_names(&self) -> Vec<String>;

    /// Expands the template. Variables without a binding expand to nothing.
    fn expand(&self, bindings: &HashMap<String, String>) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression { reserved: bool, names: Vec<String> },
}

/// A parsed URL template supporting simple and reserved expansion.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use weary::{UriTemplate, UrlTemplate};
///
/// let template: UriTemplate = "https://api.example.com/users/{id}".parse()?;
/// assert_eq!(template.variable_names(), vec!["id".to_string()]);
///
/// let bindings = HashMap::from([("id".to_string(), "a b".to_string())]);
/// assert_eq!(template.expand(&bindings), "https://api.example.com/users/a%20b");
/// # Ok::<(), weary::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] for an unclosed or empty expression, an
    /// unsupported operator, or an invalid variable name.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut parts = Vec::new();
        let mut rest = source.as_str();

        while let Some(open) = rest.find(['{', '}']) {
            if rest.as_bytes()[open] == b'}' {
                return Err(Error::Template(format!("unmatched '}}' in {:?}", source)));
            }
            if open > 0 {
                parts.push(Part::Literal(rest[..open].to_string()));
            }

            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| Error::Template(format!("unclosed expression in {:?}", source)))?;
            parts.push(parse_expression(&after[..close], &source)?);
            rest = &after[close + 1..];
        }

        if !rest.is_empty() {
            parts.push(Part::Literal(rest.to_string()));
        }

        Ok(Self { source, parts })
    }

    /// Returns the template string this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn parse_expression(body: &str, source: &str) -> Result<Part> {
    let (reserved, list) = match body.strip_prefix('+') {
        Some(list) => (true, list),
        None => (false, body),
    };

    if let Some(op) = list.chars().next().filter(|c| "#./;?&=,!@|".contains(*c)) {
        return Err(Error::Template(format!(
            "unsupported operator '{}' in {:?}",
            op, source
        )));
    }

    let names = list
        .split(',')
        .map(|name| {
            if is_varname(name) {
                Ok(name.to_string())
            } else {
                Err(Error::Template(format!(
                    "invalid variable name {:?} in {:?}",
                    name, source
                )))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Part::Expression { reserved, names })
}

fn is_varname(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

impl UrlTemplate for UriTemplate {
    fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for part in &self.parts {
            if let Part::Expression { names: vars, .. } = part {
                for var in vars {
                    if !names.contains(var) {
                        names.push(var.clone());
                    }
                }
            }
        }
        names
    }

    fn expand(&self, bindings: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression { reserved, names } => {
                    let set = if *reserved { RESERVED } else { UNRESERVED };
                    let values: Vec<String> = names
                        .iter()
                        .filter_map(|name| bindings.get(name))
                        .map(|value| utf8_percent_encode(value, set).to_string())
                        .collect();
                    out.push_str(&values.join(","));
                }
            }
        }
        out
    }
}

impl FromStr for UriTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_variable_names_in_order_without_duplicates() {
        let template = UriTemplate::parse("/{org}/repos/{repo}/{org}{+path}").unwrap();
        assert_eq!(
            template.variable_names(),
            vec!["org".to_string(), "repo".to_string(), "path".to_string()]
        );
    }

    #[test]
    fn test_template_without_variables() {
        let template = UriTemplate::parse("https://example.com/status").unwrap();
        assert!(template.variable_names().is_empty());
        assert_eq!(template.expand(&HashMap::new()), "https://example.com/status");
    }

    #[test]
    fn test_simple_expansion_encodes_reserved_characters() {
        let template = UriTemplate::parse("/search/{term}").unwrap();
        assert_eq!(
            template.expand(&bindings(&[("term", "a/b?c=d")])),
            "/search/a%2Fb%3Fc%3Dd"
        );
    }

    #[test]
    fn test_reserved_expansion_keeps_reserved_characters() {
        let template = UriTemplate::parse("/files{+path}").unwrap();
        assert_eq!(
            template.expand(&bindings(&[("path", "/docs/read me.txt")])),
            "/files/docs/read%20me.txt"
        );
    }

    #[test]
    fn test_list_expansion_skips_unbound_names() {
        let template = UriTemplate::parse("/map/{x,y,z}").unwrap();
        assert_eq!(
            template.expand(&bindings(&[("x", "1024"), ("z", "768")])),
            "/map/1024,768"
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            UriTemplate::parse("/users/{id"),
            Err(Error::Template(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/users/id}"),
            Err(Error::Template(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/users/{}"),
            Err(Error::Template(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/search{?q}"),
            Err(Error::Template(_))
        ));
        assert!(matches!(
            UriTemplate::parse("/users/{user-id}"),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_display_round_trips_source() {
        let template: UriTemplate = "/users/{id}".parse().unwrap();
        assert_eq!(template.to_string(), "/users/{id}");
        assert_eq!(template.as_str(), "/users/{id}");
    }
}
