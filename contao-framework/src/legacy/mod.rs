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

//! Built-in legacy classes the bootstrap depends on
//!
//! The framework only talks to them through adapters, via the typed wrappers
//! [`ConfigAdapter`] and [`RequestTokenAdapter`]. Hosts and tests may register
//! their own classes under the same identifiers instead.

mod config;
mod request_token;

pub use config::{ConfigAdapter, LocalConfig, CONFIG_CLASS};
pub use request_token::{RequestTokenAdapter, RequestTokenStore, REQUEST_TOKEN_CLASS};

use serde_json::Value;

/// Decode a boolean result of a legacy call.
pub(crate) fn expect_bool(class: &str, method: &str, value: Value) -> anyhow::Result<bool> {
    value.as_bool().ok_or_else(|| {
        anyhow::anyhow!("{}::{}() returned {} instead of a boolean", class, method, value)
    })
}

/// Decode an optional string result of a legacy call.
pub(crate) fn expect_optional_string(
    class: &str,
    method: &str,
    value: Value,
) -> anyhow::Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        other => anyhow::bail!("{}::{}() returned {} instead of a string", class, method, other),
    }
}
