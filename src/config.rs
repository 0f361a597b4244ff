//! Generator configuration loaded from `toolforge.toml`.
//!
//! The file is optional and usually sits next to the API document:
//!
//! ```toml
//! package = "todo_tools"
//! tools_module = "tools"
//! strict_merge = false
//! server_url = "https://staging.example.com"
//!
//! [handler]
//! request_type = "CallToolRequest"
//! result_type = "CallToolResult"
//! ```
//!
//! Command-line flags win over the file, the file wins over built-in defaults.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::GenerateOptions;

/// File name looked up next to the API document.
pub const CONFIG_FILE_NAME: &str = "toolforge.toml";

/// Handler signature names the merge engine matches on
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    pub request_type: Option<String>,
    pub result_type: Option<String>,
}

/// Contents of `toolforge.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Crate name of the generated project
    pub package: Option<String>,
    /// Module under `src/` holding the tool files
    pub tools_module: Option<String>,
    /// Fail instead of regenerating when a tool file does not parse
    pub strict_merge: Option<bool>,
    /// Replaces the document's first server URL
    pub server_url: Option<String>,
    #[serde(default)]
    pub handler: HandlerConfig,
}

impl GeneratorConfig {
    /// Fill the fields of `options` that are still at their defaults.
    ///
    /// `options` is expected to already carry the command-line values, so
    /// only unset (`None`/default) fields are taken from the file.
    pub fn apply_to(&self, options: &mut GenerateOptions) {
        let defaults = GenerateOptions::default();
        if options.package.is_none() {
            options.package = self.package.clone();
        }
        if options.server_url.is_none() {
            options.server_url = self.server_url.clone();
        }
        if let Some(module) = &self.tools_module {
            if options.tools_module == defaults.tools_module {
                options.tools_module = module.clone();
            }
        }
        if let Some(strict) = self.strict_merge {
            options.strict_merge |= strict;
        }
        if let Some(request_type) = &self.handler.request_type {
            if options.request_type == defaults.request_type {
                options.request_type = request_type.clone();
            }
        }
        if let Some(result_type) = &self.handler.result_type {
            if options.result_type == defaults.result_type {
                options.result_type = result_type.clone();
            }
        }
    }
}

/// Load the generator configuration from a TOML file
///
/// # Returns
///
/// `Ok(Some(config))` if the file exists and parses,
/// `Ok(None)` if it does not exist (not an error),
/// `Err` if it exists but fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<GeneratorConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path).with_context(|| {
        format!("Failed to read generator config: {}", config_path.display())
    })?;

    let config: GeneratorConfig = toml::from_str(&contents).with_context(|| {
        format!("Failed to parse generator config: {}", config_path.display())
    })?;

    Ok(Some(config))
}

/// Look for `toolforge.toml` in the same directory as the API document.
pub fn auto_detect_config_path(spec_path: &Path) -> Option<PathBuf> {
    let spec_dir = spec_path.parent()?;
    let config_path = spec_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Resolve the config path
///
/// Priority:
/// 1. Explicitly provided path (via CLI)
/// 2. Auto-detected alongside the document
/// 3. None (no config)
pub fn resolve_config_path(explicit_path: Option<&Path>, spec_path: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    auto_detect_config_path(spec_path)
}
