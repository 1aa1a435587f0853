use crate::render::MAX_RENDER_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "STORYWEAVE_CONFIG";
pub const STORIES_ENV: &str = "STORYWEAVE_STORIES";
pub const MAX_DEPTH_ENV: &str = "STORYWEAVE_MAX_DEPTH";
pub const LOG_ENV: &str = "STORYWEAVE_LOG";

const DEFAULT_LOG_FILTER: &str = "storyweave=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid {var} value `{value}`")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    pub max_render_depth: usize,
    /// Outer containers for the nested combinations, most preferred first.
    pub primary_containers: Vec<String>,
    pub secondary_containers: Vec<String>,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            max_render_depth: MAX_RENDER_DEPTH,
            primary_containers: ["Box", "Accordion", "Alert", "Card"]
                .map(String::from)
                .to_vec(),
            secondary_containers: ["Stack", "FormField", "List", "Box"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub composer: ComposerSettings,
    /// Story bundle to load; the built-in demo bundle is used when unset.
    pub stories_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            composer: ComposerSettings::default(),
            stories_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(|var| std::env::var(var).ok())
    }

    /// Reads the optional settings file named by `STORYWEAVE_CONFIG`, then
    /// applies the individual variable overrides.
    pub fn load_from<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match lookup(CONFIG_ENV) {
            Some(path) => Self::read_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(stories) = lookup(STORIES_ENV).filter(|value| !value.trim().is_empty()) {
            settings.stories_path = Some(PathBuf::from(stories));
        }
        if let Some(depth) = lookup(MAX_DEPTH_ENV) {
            settings.composer.max_render_depth =
                depth
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidVar {
                        var: MAX_DEPTH_ENV,
                        value: depth.clone(),
                    })?;
        }
        if let Some(filter) = lookup(LOG_ENV).filter(|value| !value.trim().is_empty()) {
            settings.log_filter = filter;
        }

        Ok(settings)
    }

    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
