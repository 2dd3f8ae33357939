use crate::error::Result;
use crate::ir::Position;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_START_ID: &str = "start";
pub const DEFAULT_BASE_PATH: &str = "/dashboard";

/// How a node reached through several parents settles on its tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ConvergencePolicy {
    /// Keep the deepest tier seen, without revisiting the node's successors.
    #[default]
    SinglePass,
    /// Re-relax successors whenever a node is pushed deeper.
    Propagate,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub tier_spacing: f32,
    pub sibling_spacing: f32,
    pub start_id: String,
    pub anchor: Position,
    pub convergence: ConvergencePolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tier_spacing: 160.0,
            sibling_spacing: 280.0,
            start_id: DEFAULT_START_ID.to_string(),
            anchor: Position::new(250.0, 50.0),
            convergence: ConvergencePolicy::SinglePass,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Canonical prefix of every dashboard path; `chat` encodes to this.
    pub base_path: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub router: RouterConfig,
}

/// Optional layout fields as they appear in config files and WASM options.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOverrides {
    pub tier_spacing: Option<f32>,
    pub sibling_spacing: Option<f32>,
    pub start_id: Option<String>,
    pub anchor: Option<Position>,
    pub convergence: Option<ConvergencePolicy>,
}

impl LayoutOverrides {
    pub fn apply_to(self, config: &mut LayoutConfig) {
        if let Some(v) = self.tier_spacing {
            config.tier_spacing = v;
        }
        if let Some(v) = self.sibling_spacing {
            config.sibling_spacing = v;
        }
        if let Some(v) = self.start_id {
            config.start_id = v;
        }
        if let Some(v) = self.anchor {
            config.anchor = v;
        }
        if let Some(v) = self.convergence {
            config.convergence = v;
        }
    }

    pub fn into_config(self) -> LayoutConfig {
        let mut config = LayoutConfig::default();
        self.apply_to(&mut config);
        config
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouterConfigFile {
    base_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutOverrides>,
    router: Option<RouterConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut config = Config::default();

    if let Some(layout) = parsed.layout {
        layout.apply_to(&mut config.layout);
    }

    if let Some(router) = parsed.router {
        if let Some(v) = router.base_path {
            config.router.base_path = normalize_base_path(&v);
        }
    }

    Ok(config)
}

/// `"dashboard/"` and `"/dashboard"` name the same prefix; `"/"` means none.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
