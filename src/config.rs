//! Build configuration.
//!
//! Loads `til.toml` from the project root. Every key is optional; a missing
//! file or missing key falls back to the default for the current build
//! profile, so a fresh project needs no configuration at all:
//!
//! | key                    | prod       | dev      |
//! |------------------------|------------|----------|
//! | `compress`             | `"brotli"` | `"none"` |
//! | `rename_identifiers`   | `true`     | `false`  |
//! | `eliminate_dead_rules` | `true`     | `false`  |
//! | `minify`               | `true`     | `false`  |
//! | `css`                  | `"inline"` | `"inline"` |
//! | `verbose`              | `false`    | `false`  |
//!
//! `css = "external"` switches from per-page inlined `<style>` blocks to a
//! single shared `bundle.css` linked from every page. Unknown keys and
//! invalid values are rejected up front to catch typos early.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rip::{CssMode, RipOptions};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Resolved configuration for one build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteConfig {
    pub compress: CompressKind,
    pub rename_identifiers: bool,
    pub eliminate_dead_rules: bool,
    pub minify: bool,
    pub css: CssKind,
    pub verbose: bool,
}

/// Compression applied to every emitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressKind {
    None,
    Gzip,
    Brotli,
}

impl fmt::Display for CompressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompressKind::None => "none",
            CompressKind::Gzip => "gzip",
            CompressKind::Brotli => "brotli",
        })
    }
}

/// How CSS reaches the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssKind {
    Inline,
    External,
}

/// On-disk shape of `til.toml`: all keys optional, unknown keys rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    compress: Option<CompressKind>,
    rename_identifiers: Option<bool>,
    eliminate_dead_rules: Option<bool>,
    minify: Option<bool>,
    css: Option<CssKind>,
    verbose: Option<bool>,
}

impl SiteConfig {
    /// Profile defaults: prod squeezes everything, dev keeps output
    /// readable and builds fast.
    pub fn defaults(prod: bool) -> Self {
        if prod {
            Self {
                compress: CompressKind::Brotli,
                rename_identifiers: true,
                eliminate_dead_rules: true,
                minify: true,
                css: CssKind::Inline,
                verbose: false,
            }
        } else {
            Self {
                compress: CompressKind::None,
                rename_identifiers: false,
                eliminate_dead_rules: false,
                minify: false,
                css: CssKind::Inline,
                verbose: false,
            }
        }
    }

    /// Load configuration from `path`, resolving missing keys against the
    /// profile defaults. A missing file is not an error.
    pub fn load(path: &Path, prod: bool) -> Result<Self, ConfigError> {
        let defaults = Self::defaults(prod);
        if !path.exists() {
            println!("no configuration file found, using defaults");
            return Ok(defaults);
        }
        let raw = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&raw)?;
        Ok(Self {
            compress: file.compress.unwrap_or(defaults.compress),
            rename_identifiers: file.rename_identifiers.unwrap_or(defaults.rename_identifiers),
            eliminate_dead_rules: file
                .eliminate_dead_rules
                .unwrap_or(defaults.eliminate_dead_rules),
            minify: file.minify.unwrap_or(defaults.minify),
            css: file.css.unwrap_or(defaults.css),
            verbose: file.verbose.unwrap_or(defaults.verbose),
        })
    }

    /// Engine options implied by this configuration.
    pub fn rip_options(&self) -> RipOptions {
        RipOptions {
            rename_identifiers: self.rename_identifiers,
            eliminate_dead_rules: self.eliminate_dead_rules,
            mode: match self.css {
                CssKind::Inline => CssMode::Inline,
                CssKind::External => CssMode::External,
            },
        }
    }
}

/// A documented stock `til.toml`, printed by `til gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# til build configuration.
# Every key is optional. Missing keys use the profile default shown:
# the first value applies to `til build --prod`, the second to dev builds.

# Compression for every emitted file: "none", "gzip" (.gz), or "brotli" (.br).
# prod: "brotli", dev: "none"
#compress = "brotli"

# Rename class/id identifiers to the shortest possible names.
# prod: true, dev: false
#rename_identifiers = true

# Remove CSS rules whose selectors never match any page.
# prod: true, dev: false
#eliminate_dead_rules = true

# Collapse whitespace and strip comments in the generated HTML.
# prod: true, dev: false
#minify = true

# "inline" puts each page's CSS in a <style> block; "external" emits one
# shared bundle.css linked from every page.
#css = "inline"

# Print the resolved configuration before building.
#verbose = false
"#
}
