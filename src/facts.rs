//! Repository source facts and the providers that fetch them.
//!
//! Fetching is the only network step in generation. A failed fetch never
//! aborts anything: [`fetch_or_fallback`] substitutes facts derived purely
//! from the owner/name pair.
use crate::config::FactsSettings;
use crate::error::CodemetaError;
use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;

/// Owner/name pair parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse `https://github.com/<owner>/<name>[/...]`.
    pub fn parse(url: &str) -> Result<Self, CodemetaError> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^https://github\.com/([^/\s]+)/([^/\s]+)/?").expect("slug pattern compiles")
        });
        let caps = pattern
            .captures(url.trim())
            .ok_or_else(|| CodemetaError::InvalidRepositoryUrl(url.to_string()))?;
        Ok(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct License {
    #[serde(default = "unknown_license")]
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

impl License {
    pub fn as_pair(&self) -> (&str, Option<&str>) {
        (&self.name, self.spdx_id.as_deref())
    }
}

fn unknown_license() -> String {
    "Unknown License".to_string()
}

/// Read-only repository attributes used as synthesis input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SourceFacts {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SourceFacts {
    /// Facts derived only from the slug, stamped with the current time.
    pub fn fallback(slug: &RepoSlug) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            name: Some(slug.name.clone()),
            description: Some(format!("Repository: {}", slug.name)),
            created_at: Some(now.clone()),
            updated_at: Some(now),
            license: None,
            language: Some("Unknown".to_string()),
        }
    }
}

/// Source of repository facts keyed by owner/name.
pub trait FactsProvider: Sync {
    fn fetch(&self, slug: &RepoSlug) -> Result<SourceFacts>;
}

/// Fetch facts, substituting the fallback on any provider error.
pub fn fetch_or_fallback(provider: &dyn FactsProvider, slug: &RepoSlug) -> SourceFacts {
    match provider.fetch(slug) {
        Ok(facts) => facts,
        Err(err) => {
            tracing::warn!(repo = %slug, error = %format!("{err:#}"), "facts fetch failed; using fallback");
            SourceFacts::fallback(slug)
        }
    }
}

/// GitHub REST API provider.
pub struct GithubFacts {
    agent: ureq::Agent,
    settings: FactsSettings,
}

impl GithubFacts {
    pub fn new(settings: FactsSettings) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .build()
            .into();
        Self { agent, settings }
    }

    fn endpoint(&self, slug: &RepoSlug) -> String {
        format!(
            "{}/repos/{}/{}",
            self.settings.api_base, slug.owner, slug.name
        )
    }
}

impl FactsProvider for GithubFacts {
    fn fetch(&self, slug: &RepoSlug) -> Result<SourceFacts> {
        let endpoint = self.endpoint(slug);
        tracing::debug!(%endpoint, "fetching repository facts");
        let response = self
            .agent
            .get(endpoint.as_str())
            .header("User-Agent", self.settings.user_agent.as_str())
            .header("Accept", "application/vnd.github+json")
            .call()
            .map_err(|err| anyhow!("GitHub request for {slug} failed: {err}"))?;
        let body = response
            .into_body()
            .read_to_string()
            .with_context(|| format!("read GitHub response for {slug}"))?;
        parse_facts(&body).with_context(|| format!("decode GitHub response for {slug}"))
    }
}

/// Decode a GitHub repository payload.
pub fn parse_facts(body: &str) -> Result<SourceFacts> {
    let facts: SourceFacts = serde_json::from_str(body).context("parse repository JSON")?;
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl FactsProvider for Unreachable {
        fn fetch(&self, slug: &RepoSlug) -> Result<SourceFacts> {
            Err(anyhow!("connection refused for {slug}"))
        }
    }

    #[test]
    fn parses_repository_urls() {
        let slug = RepoSlug::parse("https://github.com/sodascience/metasyn").expect("valid url");
        assert_eq!(slug.owner, "sodascience");
        assert_eq!(slug.name, "metasyn");

        let slug = RepoSlug::parse("https://github.com/a/b/tree/main").expect("valid url");
        assert_eq!(slug.to_string(), "a/b");
    }

    #[test]
    fn rejects_malformed_repository_urls() {
        for url in ["not-a-url", "https://gitlab.com/a/b", "https://github.com/only-owner", ""] {
            let err = RepoSlug::parse(url).expect_err("malformed url");
            assert!(matches!(err, CodemetaError::InvalidRepositoryUrl(_)));
        }
    }

    #[test]
    fn fetch_failure_substitutes_fallback() {
        let slug = RepoSlug::parse("https://github.com/owner/tool").expect("valid url");
        let facts = fetch_or_fallback(&Unreachable, &slug);
        assert_eq!(facts.name.as_deref(), Some("tool"));
        assert_eq!(facts.description.as_deref(), Some("Repository: tool"));
        assert_eq!(facts.language.as_deref(), Some("Unknown"));
        assert!(facts.license.is_none());
        assert!(facts.created_at.is_some());
    }

    #[test]
    fn parses_github_payload_with_nulls() {
        let facts = parse_facts(
            r#"{
  "name": "metasyn",
  "full_name": "sodascience/metasyn",
  "description": null,
  "created_at": "2022-03-01T10:00:00Z",
  "updated_at": "2024-05-06T07:08:09Z",
  "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" },
  "language": "Python"
}"#,
        )
        .expect("parse payload");
        assert_eq!(facts.name.as_deref(), Some("metasyn"));
        assert_eq!(facts.description, None);
        assert_eq!(
            facts.license.as_ref().map(License::as_pair),
            Some(("MIT License", Some("MIT")))
        );
    }
}
