use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InputConfig {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelsConfig {
    #[serde(default = "default_channel_labels")]
    pub channels: Vec<String>,
    #[serde(default = "default_product_labels")]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub diagnostics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_precision")]
    pub precision: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_path: Option<String>,
    pub diagnostics: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/adspend-optimizer/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.input_path {
            self.input.path = path;
        }
        if let Some(diagnostics) = overrides.diagnostics {
            self.solver.diagnostics = diagnostics;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    /// `None` means "use the built-in reference scenario".
    pub fn resolved_input_path(&self) -> Option<PathBuf> {
        let trimmed = self.input.path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(expand_tilde(trimmed))
        }
    }

    pub fn default_template() -> String {
        let template = r#"[input]
# JSON or TOML file with an optimization request; empty uses the reference scenario
path = ""

[labels]
channels = ["Channel 1", "Channel 2", "Channel 3"]
products = ["Clothing", "Beauty", "Home Decor"]

[solver]
tolerance = 1e-6
diagnostics = false

[output]
precision = 2
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            labels: LabelsConfig::default(),
            solver: SolverConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            channels: default_channel_labels(),
            products: default_product_labels(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            diagnostics: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

fn default_channel_labels() -> Vec<String> {
    vec![
        "Channel 1".to_string(),
        "Channel 2".to_string(),
        "Channel 3".to_string(),
    ]
}

fn default_product_labels() -> Vec<String> {
    vec![
        "Clothing".to_string(),
        "Beauty".to_string(),
        "Home Decor".to_string(),
    ]
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_precision() -> usize {
    2
}
