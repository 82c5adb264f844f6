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

//! The `Config` legacy class.

use super::{expect_bool, expect_optional_string};
use crate::adapter::{Adapter, ClassDefinition, LegacyObject};
use crate::config::LocalSettings;
use serde_json::Value;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};

pub const CONFIG_CLASS: &str = "Contao\\Config";

/// Singleton serving the local configuration.
#[derive(Debug)]
pub struct LocalConfig {
    settings: LocalSettings,
    preloaded: AtomicBool,
}

impl LocalConfig {
    pub fn new(settings: LocalSettings) -> Self {
        Self {
            settings,
            preloaded: AtomicBool::new(false),
        }
    }

    /// Class definition for registration with the framework.
    pub fn definition(settings: LocalSettings) -> ClassDefinition {
        ClassDefinition::singleton(CONFIG_CLASS, move |_args: &[Value]| {
            Ok(LocalConfig::new(settings.clone()))
        })
    }

    pub fn is_preloaded(&self) -> bool {
        self.preloaded.load(Ordering::SeqCst)
    }

    fn get(&self, key: &str) -> Value {
        match key {
            "timeZone" => Value::String(self.settings.time_zone.clone()),
            _ => self.settings.extra.get(key).cloned().unwrap_or(Value::Null),
        }
    }
}

impl LegacyObject for LocalConfig {
    fn call(&self, method: &str, args: &[Value]) -> anyhow::Result<Value> {
        match method {
            "isComplete" => Ok(Value::Bool(self.settings.complete)),
            "preload" => {
                self.preloaded.store(true, Ordering::SeqCst);
                Ok(Value::Null)
            }
            "get" => {
                let key = args
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow::anyhow!("Config::get() expects a key"))?;
                Ok(self.get(key))
            }
            other => anyhow::bail!("Call to undefined method {}::{}()", CONFIG_CLASS, other),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Typed view of the `Config` adapter.
#[derive(Debug, Clone)]
pub struct ConfigAdapter(pub Adapter);

impl ConfigAdapter {
    pub fn is_complete(&self) -> anyhow::Result<bool> {
        let value = self.0.invoke("isComplete", &[])?;
        expect_bool(self.0.class(), "isComplete", value)
    }

    pub fn preload(&self) -> anyhow::Result<()> {
        self.0.invoke("preload", &[])?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> anyhow::Result<Value> {
        self.0.invoke("get", &[Value::String(key.to_string())])
    }

    pub fn time_zone(&self) -> anyhow::Result<Option<String>> {
        let value = self.get("timeZone")?;
        expect_optional_string(self.0.class(), "get", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::AdapterCache;
    use serde_json::json;

    fn adapter(settings: LocalSettings) -> ConfigAdapter {
        let cache = AdapterCache::new();
        cache.register(LocalConfig::definition(settings)).unwrap();
        ConfigAdapter(cache.get_adapter(CONFIG_CLASS).unwrap())
    }

    #[test]
    fn test_local_config_through_adapter() {
        let mut settings = LocalSettings {
            complete: true,
            time_zone: "Europe/Berlin".to_string(),
            ..LocalSettings::default()
        };
        settings.extra.insert("adminEmail".into(), json!("admin@example.com"));
        let config = adapter(settings);

        assert!(config.is_complete().unwrap());
        assert_eq!(config.time_zone().unwrap().as_deref(), Some("Europe/Berlin"));
        assert_eq!(config.get("adminEmail").unwrap(), json!("admin@example.com"));
        assert_eq!(config.get("missing").unwrap(), Value::Null);

        config.preload().unwrap();
        let instance = config.0.instance().unwrap().unwrap();
        assert!(instance.downcast_ref::<LocalConfig>().unwrap().is_preloaded());
    }

    #[test]
    fn test_unexpected_result_type_is_an_error() {
        let config = ConfigAdapter(Adapter::Static {
            class: CONFIG_CLASS.to_string(),
            dispatch: std::sync::Arc::new(|_: &str, _: &[Value]| -> anyhow::Result<Value> {
                Ok(json!("yes"))
            }),
        });
        let err = config.is_complete().unwrap_err();
        assert!(err.to_string().contains("instead of a boolean"));
    }
}
