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

//! Shared hook table service.

use super::merge::{merge_hooks, HookListeners, LegacyHooks};
use super::HookCallback;
use parking_lot::RwLock;

/// The hook table legacy code reads from.
///
/// One table may be shared by the host and several framework instances.
/// Legacy registrations and merged listeners are kept apart, and the table
/// legacy code sees is rebuilt from both, so merging the same listeners
/// again leaves it unchanged.
#[derive(Debug, Default)]
pub struct HookTable {
    inner: RwLock<Registrations>,
}

#[derive(Debug, Default)]
struct Registrations {
    legacy: LegacyHooks,
    listeners: HookListeners,
    merged: LegacyHooks,
}

impl Registrations {
    fn rebuild(&mut self) {
        let merged = merge_hooks(&self.legacy, &self.listeners);
        self.merged = merged;
    }
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-filled with legacy registrations.
    pub fn from_legacy(hooks: LegacyHooks) -> Self {
        Self {
            inner: RwLock::new(Registrations {
                merged: hooks.clone(),
                legacy: hooks,
                listeners: HookListeners::new(),
            }),
        }
    }

    /// Append a callback the way legacy configuration files do.
    pub fn register_legacy(&self, hook: impl Into<String>, callback: HookCallback) {
        let mut inner = self.inner.write();
        inner.legacy.entry(hook.into()).or_default().push(callback);
        inner.rebuild();
    }

    /// Callbacks for `hook` in invocation order.
    pub fn get(&self, hook: &str) -> Vec<HookCallback> {
        self.inner.read().merged.get(hook).cloned().unwrap_or_default()
    }

    pub fn contains(&self, hook: &str) -> bool {
        self.inner.read().merged.contains_key(hook)
    }

    /// Copy of the whole table.
    pub fn snapshot(&self) -> LegacyHooks {
        self.inner.read().merged.clone()
    }

    /// Merge prioritized listeners into the table in one write-locked step.
    ///
    /// Listeners already merged under the same hook and priority are skipped.
    pub fn merge_listeners(&self, listeners: &HookListeners) {
        let mut inner = self.inner.write();
        let added = inner.listeners.extend_missing(listeners);
        if added == 0 {
            tracing::debug!("Hook listeners already merged");
            return;
        }

        inner.rebuild();
        tracing::debug!(
            hooks = inner.merged.len(),
            listeners = added,
            "Merged hook listeners into the hook table"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_legacy_appends() {
        let table = HookTable::new();
        table.register_legacy("initializeSystem", HookCallback::new("a", "onInit"));
        table.register_legacy("initializeSystem", HookCallback::new("b", "onInit"));

        assert!(table.contains("initializeSystem"));
        assert_eq!(
            table.get("initializeSystem"),
            vec![HookCallback::new("a", "onInit"), HookCallback::new("b", "onInit")]
        );
        assert!(table.get("missing").is_empty());
    }

    #[test]
    fn test_merge_listeners_overwrites_entries() {
        let table = HookTable::new();
        table.register_legacy("getPageLayout", HookCallback::new("c", "onGetPageLayout"));

        let mut listeners = HookListeners::new();
        listeners.add("getPageLayout", 10, HookCallback::new("a", "onGetPageLayout"));
        table.merge_listeners(&listeners);

        assert_eq!(
            table.get("getPageLayout"),
            vec![
                HookCallback::new("a", "onGetPageLayout"),
                HookCallback::new("c", "onGetPageLayout"),
            ]
        );
    }

    #[test]
    fn test_merging_twice_does_not_duplicate_listeners() {
        let table = HookTable::new();
        table.register_legacy("getPageLayout", HookCallback::new("c", "onGetPageLayout"));

        let mut listeners = HookListeners::new();
        listeners.add("getPageLayout", 10, HookCallback::new("a", "onGetPageLayout"));
        table.merge_listeners(&listeners);
        table.merge_listeners(&listeners);

        assert_eq!(
            table.get("getPageLayout"),
            vec![
                HookCallback::new("a", "onGetPageLayout"),
                HookCallback::new("c", "onGetPageLayout"),
            ]
        );
    }

    #[test]
    fn test_legacy_registered_after_merge_keeps_priorities() {
        let table = HookTable::new();
        let mut listeners = HookListeners::new();
        listeners.add("generatePage", 10, HookCallback::new("a", "onGeneratePage"));
        listeners.add("generatePage", -10, HookCallback::new("b", "onGeneratePage"));
        table.merge_listeners(&listeners);

        table.register_legacy("generatePage", HookCallback::new("c", "onGeneratePage"));

        assert_eq!(
            table.get("generatePage"),
            vec![
                HookCallback::new("a", "onGeneratePage"),
                HookCallback::new("c", "onGeneratePage"),
                HookCallback::new("b", "onGeneratePage"),
            ]
        );
    }

    #[test]
    fn test_callback_serializes_as_pair() {
        let callback = HookCallback::new("test.listener", "onGeneratePage");
        let json = serde_json::to_string(&callback).unwrap();
        assert_eq!(json, r#"["test.listener","onGeneratePage"]"#);
        assert_eq!(callback.to_string(), "test.listener::onGeneratePage");
    }
}
