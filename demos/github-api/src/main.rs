//! GitHub API demo
//!
//! Builds a sheath pipeline in front of the GitHub REST API: relative request
//! URLs are resolved against the API root, every request gets the headers
//! GitHub expects, and each exchange is logged with `tracing`.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(dead_code)]

use sheath::interceptors::{bearer_auth, header, logging, try_base_url};
use sheath::prelude::*;

// ============================================================================
// Data Types
// ============================================================================

/// A GitHub contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u32,
}

/// A GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
}

// ============================================================================
// Pipeline and calls
// ============================================================================

/// Pipeline for the GitHub API rooted at `base`.
///
/// A token, when given, is sent as a bearer token.
fn github(base: &str, token: Option<&str>) -> sheath::Result<Pipeline> {
    let mut pipeline = Pipeline::new()
        .with(try_base_url(base)?)
        .with(header("Accept", "application/vnd.github+json"))
        .with(header("User-Agent", "sheath-github-demo/0.1.0"));

    if let Some(token) = token {
        pipeline.push(bearer_auth(token));
    }
    pipeline.push(logging());

    Ok(pipeline)
}

async fn get_repo(pipeline: &Pipeline, owner: &str, repo: &str) -> sheath::Result<Repository> {
    let request = Request::try_builder(Method::Get, &format!("repos/{owner}/{repo}"))?.build();
    pipeline.round_trip(request).await?.json()
}

async fn contributors(
    pipeline: &Pipeline,
    owner: &str,
    repo: &str,
    per_page: u32,
) -> sheath::Result<Vec<Contributor>> {
    let request = Request::try_builder(Method::Get, &format!("repos/{owner}/{repo}/contributors"))?
        .query("per_page", &per_page.to_string())
        .build();
    pipeline.round_trip(request).await?.json()
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> sheath::Result<()> {
    tracing_subscriber::fmt::init();

    let token = std::env::var("GITHUB_TOKEN").ok();
    let pipeline = github("https://api.github.com", token.as_deref())?;
    println!("Pipeline ready with {} interceptors", pipeline.len());

    let repo = get_repo(&pipeline, "rust-lang", "rust").await?;
    println!(
        "{}: {} stars, {} forks",
        repo.full_name, repo.stargazers_count, repo.forks_count
    );

    for contributor in contributors(&pipeline, "rust-lang", "rust", 5).await? {
        println!("  {} ({} contributions)", contributor.login, contributor.contributions);
    }

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================
