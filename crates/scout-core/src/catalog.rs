//! Static catalog of monitored projects and its filtering rules.

use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

fn default_issue_labels() -> Vec<String> {
    vec!["good-first-issue".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
/// One catalog entry describing a monitored open-source project.
pub struct CatalogProject {
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub beginner_friendly: bool,
    #[serde(default = "default_issue_labels")]
    pub good_first_issue_labels: Vec<String>,
}

impl CatalogProject {
    /// Repository slug to list issues against; falls back to the project
    /// name when no explicit repo is configured.
    pub fn repo_name(&self) -> &str {
        if self.repo.is_empty() {
            &self.name
        } else {
            &self.repo
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Self-reported contributor experience level used for catalog filtering.
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
/// The full configured project catalog.
pub struct ProjectCatalog {
    #[serde(default)]
    pub projects: Vec<CatalogProject>,
}

impl ProjectCatalog {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogIo {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::CatalogParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Filters the catalog by keyword and experience level.
    ///
    /// A project matches when any keyword appears case-insensitively in its
    /// name or category (an empty keyword list matches everything), and its
    /// `beginner_friendly` flag is compatible with the experience level:
    /// beginner requires the flag, advanced requires its absence, and
    /// intermediate accepts every project.
    pub fn filter(
        &self,
        keywords: &[String],
        experience: ExperienceLevel,
    ) -> Vec<&CatalogProject> {
        self.projects
            .iter()
            .filter(|project| {
                let matches_keyword = keywords.is_empty()
                    || keywords.iter().any(|keyword| {
                        let keyword = keyword.to_lowercase();
                        project.name.to_lowercase().contains(&keyword)
                            || project.category.to_lowercase().contains(&keyword)
                    });
                let matches_experience = match experience {
                    ExperienceLevel::Beginner => project.beginner_friendly,
                    ExperienceLevel::Intermediate => true,
                    ExperienceLevel::Advanced => !project.beginner_friendly,
                };
                matches_keyword && matches_experience
            })
            .collect()
    }
}
