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

//! Request context produced by the framework
//!
//! Replaces the legacy global markers. A context without request markers
//! corresponds to an initialization without a request: only `TL_ROOT` exists.

use crate::scope::Mode;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Installation root (`TL_ROOT`).
    pub root: PathBuf,
    /// Configured time zone, read during request-bound initialization.
    pub time_zone: Option<String>,
    /// Token of the current session (`REQUEST_TOKEN`), read during
    /// request-bound initialization.
    pub request_token: Option<String>,
    /// Markers that only exist once a request is attached.
    pub request: Option<RequestMarkers>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMarkers {
    /// `TL_MODE`; `None` when the request has no scope.
    pub mode: Option<Mode>,
    /// `TL_SCRIPT`; `None` when the request has no route.
    pub script: Option<String>,
    /// `TL_REFERER_ID`.
    pub referer_id: String,
    /// `TL_PATH`.
    pub path: String,
    pub login: LoginState,
    /// Active translation locale (`TL_LANGUAGE`).
    pub language: String,
}

/// Login flags as seen at bootstrap time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoginState {
    pub backend_user_logged_in: bool,
    pub frontend_user_logged_in: bool,
}

impl RequestContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            time_zone: None,
            request_token: None,
            request: None,
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        self.request.as_ref().and_then(|markers| markers.mode)
    }

    pub fn is_request_bound(&self) -> bool {
        self.request.is_some()
    }

    /// Render the context under the legacy marker names.
    ///
    /// Markers that would not be defined are absent from the map; markers
    /// defined as null map to [`Value::Null`].
    pub fn markers(&self) -> BTreeMap<&'static str, Value> {
        let mut markers = BTreeMap::new();
        markers.insert("TL_ROOT", json!(self.root.to_string_lossy()));

        if let Some(time_zone) = &self.time_zone {
            markers.insert("TL_TIMEZONE", json!(time_zone));
        }

        if let Some(request) = &self.request {
            markers.insert("TL_MODE", json!(request.mode.map(Mode::as_str)));
            markers.insert("TL_SCRIPT", json!(request.script));
            markers.insert("TL_REFERER_ID", json!(request.referer_id));
            markers.insert("TL_PATH", json!(request.path));
            markers.insert(
                "BE_USER_LOGGED_IN",
                json!(request.login.backend_user_logged_in),
            );
            markers.insert(
                "FE_USER_LOGGED_IN",
                json!(request.login.frontend_user_logged_in),
            );
            markers.insert("TL_LANGUAGE", json!(request.language));
            markers.insert("REQUEST_TOKEN", json!(self.request_token));
        }

        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_without_request() {
        let context = RequestContext::new("/var/www");
        let markers = context.markers();

        assert_eq!(markers["TL_ROOT"], json!("/var/www"));
        assert!(!markers.contains_key("TL_MODE"));
        assert!(!markers.contains_key("TL_SCRIPT"));
        assert!(!markers.contains_key("BE_USER_LOGGED_IN"));
        assert!(!markers.contains_key("REQUEST_TOKEN"));
        assert!(!context.is_request_bound());
    }

    #[test]
    fn test_null_markers_are_present() {
        let context = RequestContext {
            root: PathBuf::from("/var/www"),
            time_zone: Some("Europe/Berlin".to_string()),
            request_token: Some("foobar".to_string()),
            request: Some(RequestMarkers {
                mode: None,
                script: None,
                referer_id: String::new(),
                path: String::new(),
                login: LoginState::default(),
                language: "de".to_string(),
            }),
        };
        let markers = context.markers();

        assert_eq!(markers["TL_MODE"], Value::Null);
        assert_eq!(markers["TL_SCRIPT"], Value::Null);
        assert_eq!(markers["BE_USER_LOGGED_IN"], json!(false));
        assert_eq!(markers["TL_LANGUAGE"], json!("de"));
        assert_eq!(markers["TL_TIMEZONE"], json!("Europe/Berlin"));
        assert_eq!(markers["REQUEST_TOKEN"], json!("foobar"));
        assert_eq!(context.mode(), None);
    }
}
