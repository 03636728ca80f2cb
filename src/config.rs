use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Defaults to `~/.local/share/shellgate/decisions.log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".into()
}

/// Policy data the caller supplies to every sanitize call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecutorConfig {
    /// Images approved for sandboxed `kubectl run`. Empty means none.
    #[serde(default)]
    pub allowed_images: Vec<AllowedImage>,
}

/// An approved image and the in-container commands it may run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AllowedImage {
    pub image: String,
    /// Regexes matched against the whole escaped command.
    #[serde(default)]
    pub allowed_command_patterns: Vec<String>,
}

impl AllowedImage {
    /// Whether any pattern matches all of `command`. Invalid patterns never
    /// match.
    pub fn permits(&self, command: &str) -> bool {
        self.allowed_command_patterns.iter().any(|pattern| {
            match anchored(pattern) {
                Ok(re) => re.is_match(command),
                Err(e) => {
                    log::warn!("{}: ignoring invalid pattern {pattern:?}: {e}", self.image);
                    false
                }
            }
        })
    }
}

impl ExecutorConfig {
    /// The entry for exactly `image`, if approved.
    pub fn image(&self, image: &str) -> Option<&AllowedImage> {
        self.allowed_images.iter().find(|entry| entry.image == image)
    }

    pub fn image_names(&self) -> Vec<String> {
        self.allowed_images.iter().map(|entry| entry.image.clone()).collect()
    }

    /// `(image, pattern, error)` for every pattern that does not compile.
    pub fn invalid_patterns(&self) -> Vec<(String, String, String)> {
        self.allowed_images
            .iter()
            .flat_map(|entry| {
                entry.allowed_command_patterns.iter().filter_map(move |pattern| {
                    anchored(pattern)
                        .err()
                        .map(|e| (entry.image.clone(), pattern.clone(), e.to_string()))
                })
            })
            .collect()
    }
}

/// Compile `pattern` to match only whole strings. The bare pattern must
/// compile first, so it cannot close the anchoring group itself.
fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(pattern)?;
    Regex::new(&format!(r"\A(?:{pattern})\z"))
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    logging: LoggingOverlay,
    #[serde(default)]
    executor: ExecutorOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    enabled: Option<bool>,
    level: Option<String>,
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct ExecutorOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    allowed_images: Vec<AllowedImage>,
    #[serde(default)]
    remove_images: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/shellgate/config.toml (if exists)
    ///
    /// User config merges with defaults: lists extend, scalars override.
    /// Set `replace = true` under `[executor]` to replace the default images.
    /// Use `remove_images` to drop specific images by name.
    pub fn load() -> Self {
        match Self::user_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default_config(),
        }
    }

    /// Defaults overlaid with the file at `path`, if it exists and parses.
    pub fn load_from(path: &Path) -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay(path) {
            config.apply_overlay(overlay);
        }
        config
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(".config/shellgate/config.toml"))
    }

    fn load_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("shellgate: config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Logging: scalar overrides
        let l = overlay.logging;
        if let Some(v) = l.enabled {
            self.logging.enabled = v;
        }
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if let Some(v) = l.path {
            self.logging.path = Some(v);
        }

        // Executor images: same image name merges patterns
        let e = overlay.executor;
        let images = &mut self.executor.allowed_images;
        if e.replace {
            images.clear();
        } else {
            images.retain(|entry| !e.remove_images.contains(&entry.image));
        }
        for add in e.allowed_images {
            match images.iter_mut().find(|entry| entry.image == add.image) {
                Some(existing) => merge_list(
                    &mut existing.allowed_command_patterns,
                    add.allowed_command_patterns,
                    &[],
                    false,
                ),
                None => images.push(add),
            }
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
