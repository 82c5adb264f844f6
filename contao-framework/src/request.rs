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

//! Request model consumed by the framework
//!
//! Only the parts of an HTTP request the bootstrap needs: routing attributes,
//! method, headers, body parameters, locale and base path.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Name of the matched route.
pub const ROUTE_ATTRIBUTE: &str = "_route";
/// Parameters of the matched route.
pub const ROUTE_PARAMS_ATTRIBUTE: &str = "_route_params";
/// Request scope set by the routing configuration (`frontend` or `backend`).
pub const SCOPE_ATTRIBUTE: &str = "_scope";
/// Back end referer id.
pub const REFERER_ID_ATTRIBUTE: &str = "_contao_referer_id";
/// Whether the route requires a valid request token.
pub const TOKEN_CHECK_ATTRIBUTE: &str = "_token_check";

const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// An incoming request as seen by the bootstrap.
#[derive(Debug, Clone)]
pub struct Request {
    attributes: BTreeMap<String, Value>,
    method: String,
    headers: HashMap<String, String>,
    body: HashMap<String, String>,
    locale: Option<String>,
    base_path: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            attributes: BTreeMap::new(),
            method: "GET".to_string(),
            headers: HashMap::new(),
            body: HashMap::new(),
            locale: None,
            base_path: String::new(),
        }
    }
}

impl Request {
    /// An empty `GET` request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a request attribute such as `_route` or `_scope`.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the HTTP method; stored upper-cased.
    pub fn with_method(mut self, method: impl AsRef<str>) -> Self {
        self.method = method.as_ref().to_ascii_uppercase();
        self
    }

    /// Header names are matched case-insensitively.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set a field of the submitted form body.
    pub fn with_body_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    /// Set the request locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the path the application is served from.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Raw attribute value.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// The matched route, if routing ran.
    pub fn route(&self) -> Option<&str> {
        self.attributes.get(ROUTE_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Route parameters (`_route_params`); empty unless an object.
    pub fn route_params(&self) -> Map<String, Value> {
        match self.attributes.get(ROUTE_PARAMS_ATTRIBUTE) {
            Some(Value::Object(params)) => params.clone(),
            _ => Map::new(),
        }
    }

    /// The `_scope` attribute as a string.
    pub fn scope_attribute(&self) -> Option<&str> {
        self.attributes.get(SCOPE_ATTRIBUTE).and_then(Value::as_str)
    }

    /// The `_contao_referer_id` attribute as a string.
    pub fn referer_id(&self) -> Option<&str> {
        self.attributes
            .get(REFERER_ID_ATTRIBUTE)
            .and_then(Value::as_str)
    }

    /// Only a literal `true` enables the token check.
    pub fn token_check(&self) -> bool {
        matches!(
            self.attributes.get(TOKEN_CHECK_ATTRIBUTE),
            Some(Value::Bool(true))
        )
    }

    /// Upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether the method is read-only (GET, HEAD, OPTIONS or TRACE).
    pub fn is_method_safe(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "HEAD" | "OPTIONS" | "TRACE")
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether `X-Requested-With` marks an AJAX request.
    pub fn is_xml_http_request(&self) -> bool {
        self.header(REQUESTED_WITH_HEADER) == Some("XMLHttpRequest")
    }

    /// A submitted form field.
    pub fn body_param(&self, name: &str) -> Option<&str> {
        self.body.get(name).map(String::as_str)
    }

    /// Locale of the request, if any.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Base path; empty when served from the root.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request = Request::new();
        assert_eq!(request.method(), "GET");
        assert!(request.is_method_safe());
        assert!(request.route().is_none());
        assert!(!request.token_check());
        assert!(!request.is_xml_http_request());
        assert_eq!(request.base_path(), "");
        assert!(request.route_params().is_empty());
    }

    #[test]
    fn test_attributes() {
        let request = Request::new()
            .with_attribute(ROUTE_ATTRIBUTE, "dummy")
            .with_attribute(SCOPE_ATTRIBUTE, "backend")
            .with_attribute(REFERER_ID_ATTRIBUTE, "foobar")
            .with_attribute(ROUTE_PARAMS_ATTRIBUTE, json!({"alias": "home"}));

        assert_eq!(request.route(), Some("dummy"));
        assert_eq!(request.scope_attribute(), Some("backend"));
        assert_eq!(request.referer_id(), Some("foobar"));
        assert_eq!(request.route_params()["alias"], json!("home"));
    }

    #[test]
    fn test_token_check_requires_true() {
        let on = Request::new().with_attribute(TOKEN_CHECK_ATTRIBUTE, true);
        let off = Request::new().with_attribute(TOKEN_CHECK_ATTRIBUTE, false);
        let string = Request::new().with_attribute(TOKEN_CHECK_ATTRIBUTE, "1");

        assert!(on.token_check());
        assert!(!off.token_check());
        assert!(!string.token_check());
    }

    #[test]
    fn test_method_and_ajax_detection() {
        let request = Request::new()
            .with_method("post")
            .with_header("X-Requested-With", "XMLHttpRequest");

        assert_eq!(request.method(), "POST");
        assert!(!request.is_method_safe());
        assert!(request.is_xml_http_request());
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
    }
}
