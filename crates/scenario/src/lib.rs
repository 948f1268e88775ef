#![deny(warnings)]

//! YAML scenario files: a named configuration, optional reconciliation
//! overrides and a list of `field=value` edits applied on load.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use storage_core::{Config, ConfigError, CostOverrides};
use thiserror::Error;
use tracing::{debug, info};

/// Edit prefix routing an assignment to the overrides instead of the config.
const OVERRIDE_PREFIX: &str = "override.";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario {name}: {message}")]
    InvalidYaml { name: String, message: String },
    #[error("io error: {0}")]
    Io(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e.to_string())
    }
}

/// On-disk layout of a scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ScenarioFile {
    name: Option<String>,
    config: Config,
    overrides: CostOverrides,
    edits: Vec<String>,
}

/// A loaded scenario, edits already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub path: Option<PathBuf>,
    pub config: Config,
    pub overrides: CostOverrides,
}

impl Scenario {
    /// Default configuration under the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            config: Config::default(),
            overrides: CostOverrides::default(),
        }
    }

    /// Applies one `field=value` edit. `override.<key>=value` edits the
    /// reconciliation overrides, anything else goes to [`Config::set`].
    pub fn apply_edit(&mut self, edit: &str) -> Result<(), ScenarioError> {
        let (field, raw) = edit
            .split_once('=')
            .ok_or_else(|| ConfigError::UnknownField(edit.trim().to_string()))?;
        match field.trim().strip_prefix(OVERRIDE_PREFIX) {
            Some(key) => self.overrides.set(key, raw)?,
            None => self.config.set(field, raw)?,
        }
        debug!(scenario = %self.name, edit, "scenario edit applied");
        Ok(())
    }

    /// `None` when no override is set, so the cost model runs fully automatic.
    pub fn overrides(&self) -> Option<&CostOverrides> {
        (!self.overrides.is_empty()).then_some(&self.overrides)
    }
}

/// Parses scenario text. `fallback_name` is used when the file has no `name`.
pub fn parse_scenario(text: &str, fallback_name: &str) -> Result<Scenario, ScenarioError> {
    let file: ScenarioFile =
        serde_yaml::from_str(text).map_err(|e| ScenarioError::InvalidYaml {
            name: fallback_name.to_string(),
            message: e.to_string(),
        })?;
    let mut scenario = Scenario {
        name: file.name.unwrap_or_else(|| fallback_name.to_string()),
        path: None,
        config: file.config,
        overrides: file.overrides,
    };
    for edit in &file.edits {
        scenario.apply_edit(edit)?;
    }
    Ok(scenario)
}

/// Loads one scenario file; the file stem names it when the file does not.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ScenarioError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut scenario = parse_scenario(&text, &stem)?;
    scenario.path = Some(path.to_path_buf());
    info!(scenario = %scenario.name, path = %path.display(), "scenario loaded");
    Ok(scenario)
}

/// Loads every `*.yaml`/`*.yml` file in `dir`, ordered by file name.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Scenario>, ScenarioError> {
    let mut paths = Vec::new();
    for ent in fs::read_dir(dir.as_ref())? {
        let ent = ent?;
        if !ent.file_type()?.is_file() {
            continue;
        }
        let path = ent.path();
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        if is_yaml {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(load_scenario).collect()
}
