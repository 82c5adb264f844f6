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

//! The `RequestToken` legacy class.

use super::{expect_bool, expect_optional_string};
use crate::adapter::{Adapter, ClassDefinition, StaticClass};
use serde_json::Value;

pub const REQUEST_TOKEN_CLASS: &str = "Contao\\RequestToken";

/// Static class holding the token of the current process.
#[derive(Debug, Clone)]
pub struct RequestTokenStore {
    token: String,
}

impl Default for RequestTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTokenStore {
    /// Generate a random token.
    pub fn new() -> Self {
        Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn definition(self) -> ClassDefinition {
        ClassDefinition::new_static(REQUEST_TOKEN_CLASS, self)
    }
}

impl StaticClass for RequestTokenStore {
    fn call_static(&self, method: &str, args: &[Value]) -> anyhow::Result<Value> {
        match method {
            "get" => Ok(Value::String(self.token.clone())),
            "validate" => {
                let candidate = args.first().and_then(Value::as_str);
                Ok(Value::Bool(candidate == Some(self.token.as_str())))
            }
            other => anyhow::bail!("Call to undefined method {}::{}()", REQUEST_TOKEN_CLASS, other),
        }
    }
}

/// Typed view of the `RequestToken` adapter.
#[derive(Debug, Clone)]
pub struct RequestTokenAdapter(pub Adapter);

impl RequestTokenAdapter {
    pub fn get(&self) -> anyhow::Result<Option<String>> {
        let value = self.0.invoke("get", &[])?;
        expect_optional_string(self.0.class(), "get", value)
    }

    /// A missing candidate is passed as null and must fail validation.
    pub fn validate(&self, candidate: Option<&str>) -> anyhow::Result<bool> {
        let candidate = candidate.map_or(Value::Null, |token| Value::String(token.to_string()));
        let value = self.0.invoke("validate", &[candidate])?;
        expect_bool(self.0.class(), "validate", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instances::AdapterCache;

    fn adapter(store: RequestTokenStore) -> RequestTokenAdapter {
        let cache = AdapterCache::new();
        cache.register(store.definition()).unwrap();
        RequestTokenAdapter(cache.get_adapter(REQUEST_TOKEN_CLASS).unwrap())
    }

    #[test]
    fn test_validate() {
        let tokens = adapter(RequestTokenStore::with_token("foobar"));

        assert_eq!(tokens.get().unwrap().as_deref(), Some("foobar"));
        assert!(tokens.validate(Some("foobar")).unwrap());
        assert!(!tokens.validate(Some("invalid")).unwrap());
        assert!(!tokens.validate(None).unwrap());
    }

    #[test]
    fn test_generated_tokens_differ() {
        let first = RequestTokenStore::new();
        let second = RequestTokenStore::new();
        assert_eq!(first.token().len(), 32);
        assert_ne!(first.token(), second.token());
    }
}
