//! Compiling a resource into requests.
//!
//! This example shows how to:
//! - Declare a resource with path variables, parameters and basic auth
//! - Compile it with different parameter maps
//! - Handle unmet requirements
//! - Turn a compiled request into a `reqwest` request without sending it
//!
//! Run with: `RUST_LOG=weary=debug cargo run --example compile_resource`

use weary::{Error, Resource};

fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weary=debug".into()),
        )
        .init();

    let issues = Resource::get("https://api.github.com/repos/{owner}/{repo}/issues")
        .optional(["state", "labels", "per_page"])
        .default_param("state", "open")
        .header("Accept", "application/vnd.github+json")
        .user_agent("weary-demo/0.1")
        .basic_auth_with("login", "token")
        .build()?;

    println!("=== Resource ===");
    println!("Requirements: {:?}", issues.requirements());
    println!("Expected params: {:?}", issues.expected_params());
    println!("Authenticates: {}", issues.authenticates());
    println!();

    println!("=== Compiled Request ===");
    let request = issues.compile([
        ("owner", "rust-lang"),
        ("repo", "rust"),
        ("labels", "A-diagnostics"),
        ("login", "octocat"),
        ("token", "not-a-real-token"),
        ("ignored", "dropped"),
    ])?;

    println!("{} {}", request.method, request.url);
    println!("Query: {:?}", request.query_params);
    println!("Final URL: {}", request.to_url(None)?);
    println!();

    println!("=== Unmet Requirements ===");
    match issues.compile([("owner", "rust-lang")]) {
        Err(Error::UnmetRequirements { requirements }) => {
            println!("Refused to compile, needs: {:?}", requirements);
        }
        other => println!("Unexpected: {:?}", other),
    }
    println!();

    println!("=== Transport ===");
    let client = reqwest::Client::new();
    let prepared = request
        .into_reqwest(&client, None)?
        .build()
        .map_err(|e| Error::ConfigurationError(e.to_string()))?;
    println!("{} {}", prepared.method(), prepared.url());
    for (name, value) in prepared.headers() {
        println!("  {}: {:?}", name, value);
    }

    Ok(())
}
