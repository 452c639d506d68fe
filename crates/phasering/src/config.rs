use crate::connector::{ConnectorSettings, Trim};
use crate::diagram::DiagramOptions;
use crate::layout::{
    BoxSize, DEFAULT_BOX_HEIGHT, DEFAULT_BOX_WIDTH, DEFAULT_RATIO, DEFAULT_START_ANGLE, Item,
    Label, LayoutEngine,
};
use crate::schedule::DEFAULT_DEBOUNCE;
use crate::theme::Theme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "PHASERING";
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

const DEFAULT_LABELS: [&str; 4] = ["Discover", "Design", "Deliver", "Review"];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub ratio: f64,
    /// Degrees.
    pub start_angle: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_RATIO,
            start_angle: DEFAULT_START_ANGLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemConfig {
    pub label: Label,
    #[serde(default = "default_box_width")]
    pub width: f64,
    #[serde(default = "default_box_height")]
    pub height: f64,
}

fn default_box_width() -> f64 {
    DEFAULT_BOX_WIDTH
}

fn default_box_height() -> f64 {
    DEFAULT_BOX_HEIGHT
}

impl ItemConfig {
    pub fn new(label: &str) -> Self {
        Self {
            label: Label::new(label),
            width: DEFAULT_BOX_WIDTH,
            height: DEFAULT_BOX_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub debounce_ms: u64,
    pub layout: LayoutConfig,
    pub connectors: ConnectorSettings,
    pub theme: Theme,
    pub items: Vec<ItemConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            layout: LayoutConfig::default(),
            connectors: ConnectorSettings::default(),
            theme: Theme::default(),
            items: DEFAULT_LABELS.iter().map(|l| ItemConfig::new(l)).collect(),
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn items(&self) -> Vec<Item> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, cfg)| Item::new(i, cfg.label.clone(), BoxSize::new(cfg.width, cfg.height)))
            .collect()
    }

    pub fn options(&self) -> DiagramOptions {
        DiagramOptions {
            engine: LayoutEngine::new(self.layout.ratio, self.layout.start_angle),
            connectors: self.connectors,
            theme: self.theme.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.layout.ratio.is_finite() && self.layout.ratio > 0.0) {
            return invalid(format!("layout.ratio must be positive, got {}", self.layout.ratio));
        }
        if self.debounce_ms == 0 {
            return invalid("debounce_ms must be at least 1".to_string());
        }
        let connectors = &self.connectors;
        match connectors.trim {
            Trim::Degrees(v) | Trim::Pixels(v) if v < 0.0 => {
                return invalid(format!(
                    "connectors.trim must not be negative, got {}",
                    connectors.trim
                ));
            }
            _ => {}
        }
        for (name, ratio) in [
            ("arc_radius_ratio", connectors.arc_radius_ratio),
            ("control_radius_ratio", connectors.control_radius_ratio),
        ] {
            if !(ratio.is_finite() && ratio > 0.0) {
                return invalid(format!("connectors.{name} must be positive, got {ratio}"));
            }
        }
        let (f1, f2) = self.connectors.control_fractions;
        if !(0.0..=1.0).contains(&f1) || !(0.0..=1.0).contains(&f2) {
            return invalid(format!(
                "connectors.control_fractions must lie in [0, 1], got [{f1}, {f2}]"
            ));
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|i| !(i.width > 0.0 && i.height > 0.0))
        {
            return invalid(format!("item '{}' needs a positive width and height", item.label));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "phasering", "phasering")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_with(path, environment())
}

/// `PHASERING_LAYOUT__RATIO=0.4` sets `layout.ratio`.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with(path: &Path, env: config::Environment) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(env)
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Loads the user config, falling back to the built-in defaults when it is unusable.
pub fn load_or_default(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => load_config_from(path),
        None => load_config(),
    };

    loaded.unwrap_or_else(|e| {
        log::error!("Failed to load config, using defaults: {}", e);
        Config::default()
    })
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorMode;
    use std::collections::HashMap;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        assert_eq!(parse(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse(
            r#"
[connectors]
mode = "Bezier"
trim = "12deg"

[[items]]
label = "Only"
"#,
        )
        .unwrap();

        assert_eq!(config.connectors.mode, ConnectorMode::Bezier);
        assert_eq!(config.connectors.trim, Trim::Degrees(12.0));
        assert_eq!(config.connectors.control_radius_ratio, 1.12);
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.items, vec![ItemConfig::new("Only")]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(parse("[layout]\nratio = 0.0").is_err());
        assert!(parse("[connectors]\ncontrol_fractions = [0.4, 1.5]").is_err());
        assert!(parse("[connectors]\ntrim = \"sideways\"").is_err());
        assert!(parse("[theme]\nitem_fill = \"#zzzzzz\"").is_err());
        assert!(parse("[[items]]\nlabel = \"Flat\"\nheight = 0.0").is_err());
    }

    #[test]
    fn test_geometry_breaking_values_are_rejected() {
        assert!(parse("debounce_ms = 0").is_err());
        assert!(parse("[connectors]\ntrim = \"-200deg\"").is_err());
        assert!(parse("[connectors]\ntrim = \"-4px\"").is_err());
        assert!(parse("[connectors]\narc_radius_ratio = 0.0").is_err());
        assert!(parse("[connectors]\ncontrol_radius_ratio = -1.1").is_err());
        assert!(parse("[connectors]\ntrim = \"0deg\"").is_ok());
    }

    #[test]
    fn test_environment_overrides_file_values() {
        let path = std::env::temp_dir().join("phasering-missing-config.toml");
        let vars = HashMap::from([
            ("PHASERING_LAYOUT__RATIO".to_string(), "0.4".to_string()),
            ("PHASERING_CONNECTORS__MODE".to_string(), "bezier".to_string()),
            ("PHASERING_DEBOUNCE_MS".to_string(), "200".to_string()),
        ]);

        let config = load_with(&path, environment().source(Some(vars))).unwrap();

        assert_eq!(config.layout.ratio, 0.4);
        assert_eq!(config.connectors.mode, ConnectorMode::Bezier);
        assert_eq!(config.debounce(), Duration::from_millis(200));
        assert_eq!(config.layout.start_angle, DEFAULT_START_ANGLE);
    }

    #[test]
    fn test_items_and_options() {
        let config = Config::default();
        let items = config.items();
        assert_eq!(items.len(), 4);
        assert_eq!(items[2].index, 2);
        assert_eq!(items[2].label.as_str(), "Deliver");
        assert!(items.iter().all(|i| i.position.is_none()));

        let options = config.options();
        assert_eq!(options.engine, LayoutEngine::default());
        assert_eq!(config.debounce(), Duration::from_millis(150));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("phasering-missing-config.toml");
        assert_eq!(load_or_default(Some(&path)).items.len(), 4);
    }
}
