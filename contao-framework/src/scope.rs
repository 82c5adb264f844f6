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

//! Request scope detection.

use crate::request::Request;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SCOPE_FRONTEND: &str = "frontend";
pub const SCOPE_BACKEND: &str = "backend";

/// Portion of the application a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Frontend,
    Backend,
}

impl Scope {
    /// Legacy mode for this scope.
    pub fn mode(self) -> Mode {
        match self {
            Scope::Frontend => Mode::Frontend,
            Scope::Backend => Mode::Backend,
        }
    }
}

/// Legacy execution mode (`TL_MODE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "FE")]
    Frontend,
    #[serde(rename = "BE")]
    Backend,
}

impl Mode {
    /// The legacy marker value, `FE` or `BE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Frontend => "FE",
            Mode::Backend => "BE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies requests as front end or back end.
pub trait ScopeMatcher: Send + Sync {
    /// Whether the request belongs to the front end.
    fn is_frontend_request(&self, request: &Request) -> bool;

    /// Whether the request belongs to the back end.
    fn is_backend_request(&self, request: &Request) -> bool;

    /// Back end wins if a matcher claims both.
    fn scope(&self, request: &Request) -> Option<Scope> {
        if self.is_backend_request(request) {
            Some(Scope::Backend)
        } else if self.is_frontend_request(request) {
            Some(Scope::Frontend)
        } else {
            None
        }
    }
}

/// Matches on the `_scope` request attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeScopeMatcher;

impl ScopeMatcher for AttributeScopeMatcher {
    fn is_frontend_request(&self, request: &Request) -> bool {
        request.scope_attribute() == Some(SCOPE_FRONTEND)
    }

    fn is_backend_request(&self, request: &Request) -> bool {
        request.scope_attribute() == Some(SCOPE_BACKEND)
    }
}
