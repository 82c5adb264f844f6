// Copyright 2025 Contao Bridge Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Framework configuration
//!
//! Loaded from TOML, with a couple of environment overrides for container
//! deployments:
//!
//! - `CONTAO_ROOT_DIR`: installation root
//! - `CONTAO_ERROR_LEVEL`: error-reporting level restored after initialization

use crate::error::ConfigError;
use crate::error_level::ErrorLevel;
use crate::hooks::{HookCallback, HookListeners, LegacyHooks};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Routes that may run while the installation is incomplete.
pub const DEFAULT_INSTALLER_ROUTES: [&str; 2] = ["contao_install", "contao_install_redirect"];

/// Body field carrying the submitted request token.
pub const DEFAULT_TOKEN_FIELD: &str = "REQUEST_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Installation root (`TL_ROOT`)
    pub root_dir: PathBuf,
    /// Error-reporting level reapplied after every initialization
    pub error_level: i32,
    /// Locale used when the request carries none
    pub default_locale: String,
    /// Routes exempt from the installation check
    pub installer_routes: Vec<String>,
    /// Body field holding the request token
    pub token_field: String,
    /// Local configuration served by the `Config` legacy class
    pub settings: LocalSettings,
    /// Route name to path, for the static router
    pub routes: BTreeMap<String, String>,
    /// Legacy hook registrations
    pub hooks: LegacyHooks,
    /// Prioritized hook listeners
    pub listeners: Vec<ListenerDefinition>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            error_level: ErrorLevel::DEFAULT.0,
            default_locale: "en".to_string(),
            installer_routes: DEFAULT_INSTALLER_ROUTES
                .iter()
                .map(|route| route.to_string())
                .collect(),
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            settings: LocalSettings::default(),
            routes: BTreeMap::new(),
            hooks: LegacyHooks::new(),
            listeners: Vec::new(),
        }
    }
}

/// Contents of the legacy local configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalSettings {
    /// Whether the install tool has finished.
    pub complete: bool,
    pub time_zone: String,
    /// Any other key, readable through `Config::get`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            complete: false,
            time_zone: "UTC".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

/// One prioritized listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDefinition {
    pub hook: String,
    #[serde(default)]
    pub priority: i32,
    pub service: String,
    pub method: String,
}

impl FrameworkConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: FrameworkConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded framework configuration");
        Ok(config)
    }

    /// Apply `CONTAO_*` environment overrides.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(root) = lookup("CONTAO_ROOT_DIR") {
            self.root_dir = PathBuf::from(root);
        }

        if let Some(level) = lookup("CONTAO_ERROR_LEVEL") {
            self.error_level = level.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("CONTAO_ERROR_LEVEL is not an integer: {}", level))
            })?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_field.is_empty() {
            return Err(ConfigError::Invalid("token_field must not be empty".to_string()));
        }
        if self.default_locale.is_empty() {
            return Err(ConfigError::Invalid(
                "default_locale must not be empty".to_string(),
            ));
        }
        for listener in &self.listeners {
            if listener.service.is_empty() || listener.method.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "listener for hook \"{}\" needs a service and a method",
                    listener.hook
                )));
            }
        }
        Ok(())
    }

    pub fn error_level(&self) -> ErrorLevel {
        ErrorLevel(self.error_level)
    }

    /// Fold the listener list into per-hook priority groups, keeping file order.
    pub fn hook_listeners(&self) -> HookListeners {
        let mut listeners = HookListeners::new();
        for listener in &self.listeners {
            listeners.add(
                listener.hook.clone(),
                listener.priority,
                HookCallback::new(listener.service.clone(), listener.method.clone()),
            );
        }
        listeners
    }
}
