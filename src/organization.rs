//! Organization-context literals and publication references.
//!
//! Organization contexts are attached verbatim to `isPartOf`; nothing here is
//! derived from repository facts.
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Built-in organization presets selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OrganizationPreset {
    Soda,
}

impl OrganizationPreset {
    pub fn context(&self) -> Value {
        match self {
            OrganizationPreset::Soda => soda_science(),
        }
    }
}

/// SODA Science group at Utrecht University.
pub fn soda_science() -> Value {
    json!({
        "@type": "Organization",
        "@id": "https://github.com/sodascience",
        "name": "SODA Science",
        "description": "SODA (Scalable Open Data Analytics) Science is a research group focused on developing scalable and open data analytics solutions for scientific research. The group works on advancing computational methods, tools, and infrastructure for data-intensive research across multiple domains.",
        "url": "https://github.com/sodascience",
        "sameAs": ["https://sodascience.github.io/"],
        "parentOrganization": {
            "@type": "Organization",
            "name": "Utrecht University",
            "url": "https://www.uu.nl/"
        },
        "foundingDate": "2020",
        "location": {
            "@type": "Place",
            "name": "Utrecht, Netherlands"
        },
        "keywords": [
            "data science",
            "open science",
            "scalable analytics",
            "research software",
            "computational methods",
            "data infrastructure"
        ]
    })
}

/// Load an organization literal from a JSON file. It must be an object.
pub fn load_organization(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read organization {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parse organization {}", path.display()))?;
    if !value.is_object() {
        return Err(anyhow!(
            "organization file {} must contain a JSON object",
            path.display()
        ));
    }
    Ok(value)
}

/// Resolve the organization context from a preset or a file; the file wins.
pub fn resolve_organization(
    preset: Option<OrganizationPreset>,
    file: Option<&Path>,
) -> Result<Option<Value>> {
    if let Some(path) = file {
        return load_organization(path).map(Some);
    }
    Ok(preset.map(|preset| preset.context()))
}

/// Inputs for a `referencePublication` entry.
#[derive(Debug, Clone)]
pub struct Publication<'a> {
    pub doi: &'a str,
    pub title: &'a str,
    pub pub_type: &'a str,
    pub publisher: Option<&'a str>,
    pub year: Option<&'a str>,
}

impl<'a> Publication<'a> {
    pub fn article(doi: &'a str, title: &'a str) -> Self {
        Self {
            doi,
            title,
            pub_type: "ScholarlyArticle",
            publisher: None,
            year: None,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("@type".to_string(), json!(self.pub_type));
        entry.insert("@id".to_string(), json!(self.doi));
        entry.insert("name".to_string(), json!(self.title));
        entry.insert("url".to_string(), json!(self.doi));
        if let Some(year) = self.year {
            entry.insert("datePublished".to_string(), json!(year));
        }
        if let Some(publisher) = self.publisher {
            entry.insert(
                "publisher".to_string(),
                json!({ "@type": "Organization", "name": publisher }),
            );
        }
        Value::Object(entry)
    }
}
