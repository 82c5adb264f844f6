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

//! URL generation for the legacy script path.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Generates URLs for named routes.
pub trait Router: Send + Sync {
    /// Generate the URL of `route`; fails for unknown routes.
    fn generate(&self, route: &str, params: &Map<String, Value>) -> anyhow::Result<String>;
}

/// Router backed by a fixed route table.
///
/// Route parameters are appended as a percent-encoded query string in key
/// order.
#[derive(Debug, Clone, Default)]
pub struct StaticRouter {
    routes: BTreeMap<String, String>,
}

impl StaticRouter {
    /// A router without routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named route.
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }
}

impl From<BTreeMap<String, String>> for StaticRouter {
    fn from(routes: BTreeMap<String, String>) -> Self {
        Self { routes }
    }
}

impl Router for StaticRouter {
    fn generate(&self, route: &str, params: &Map<String, Value>) -> anyhow::Result<String> {
        let path = self.routes.get(route).ok_or_else(|| {
            anyhow::anyhow!("Unable to generate a URL for the named route \"{}\"", route)
        })?;

        if params.is_empty() {
            return Ok(path.clone());
        }

        let mut keys: Vec<&String> = params.keys().collect();
        keys.sort();

        let mut query = form_urlencoded::Serializer::new(String::new());
        for key in keys {
            match &params[key.as_str()] {
                Value::String(value) => query.append_pair(key, value),
                other => query.append_pair(key, &other.to_string()),
            };
        }

        Ok(format!("{}?{}", path, query.finish()))
    }
}

/// Strip the base path, the leading slash and the query string from `url`.
pub fn script_path(url: &str, base_path: &str) -> String {
    let path = url.strip_prefix(base_path).unwrap_or(url);
    let path = path.strip_prefix('/').unwrap_or(path);
    match path.find('?') {
        Some(query) => path[..query].to_string(),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_path() {
        assert_eq!(script_path("/index.html", ""), "index.html");
        assert_eq!(script_path("/contao/login?ref=abc", ""), "contao/login");
        assert_eq!(script_path("/site/contao/login", "/site"), "contao/login");
        assert_eq!(script_path("", ""), "");
    }

    #[test]
    fn test_static_router() {
        let router = StaticRouter::new().with_route("contao_backend", "/contao");
        assert_eq!(router.generate("contao_backend", &Map::new()).unwrap(), "/contao");

        let mut params = Map::new();
        params.insert("page".to_string(), json!(2));
        params.insert("do".to_string(), json!("article"));
        assert_eq!(
            router.generate("contao_backend", &params).unwrap(),
            "/contao?do=article&page=2"
        );

        let mut params = Map::new();
        params.insert("q".to_string(), json!("a&b=c?d"));
        let url = router.generate("contao_backend", &params).unwrap();
        assert_eq!(url, "/contao?q=a%26b%3Dc%3Fd");
        assert_eq!(script_path(&url, ""), "contao");

        let err = router.generate("missing", &Map::new()).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
