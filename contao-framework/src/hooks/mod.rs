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

//! Hook registration
//!
//! Legacy code invokes hooks by name and walks a flat list of
//! `(service, method)` callbacks. Bundles register listeners with an explicit
//! priority instead. Both are folded into one ordered list per hook:
//!
//! - Higher priorities run first
//! - Legacy callbacks count as priority 0 and run before listeners that were
//!   registered with priority 0
//! - A hook without listeners keeps its legacy list untouched
//!
//! # Example
//!
//! ```rust,ignore
//! use contao_framework::hooks::{HookCallback, HookListeners, HookTable};
//!
//! let table = HookTable::new();
//! table.register_legacy("getPageLayout", HookCallback::new("app.legacy", "onGetPageLayout"));
//!
//! let mut listeners = HookListeners::new();
//! listeners.add("getPageLayout", 10, HookCallback::new("app.listener", "onGetPageLayout"));
//!
//! table.merge_listeners(&listeners);
//! ```

mod merge;
mod table;

pub use merge::{merge_hooks, HookListeners, LegacyHooks};
pub use table::HookTable;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(service id, method name)` pair invoked by legacy code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct HookCallback {
    pub service_id: String,
    pub method: String,
}

impl HookCallback {
    pub fn new(service_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            method: method.into(),
        }
    }
}

impl From<(String, String)> for HookCallback {
    fn from((service_id, method): (String, String)) -> Self {
        Self { service_id, method }
    }
}

impl From<HookCallback> for (String, String) {
    fn from(callback: HookCallback) -> Self {
        (callback.service_id, callback.method)
    }
}

impl fmt::Display for HookCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.service_id, self.method)
    }
}
