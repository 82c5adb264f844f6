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

//! Merging legacy hooks with prioritized listeners.

use super::HookCallback;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Legacy hook table: hook name to callbacks in invocation order.
pub type LegacyHooks = BTreeMap<String, Vec<HookCallback>>;

/// Prioritized listeners: hook name to priority to callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookListeners {
    hooks: BTreeMap<String, BTreeMap<i32, Vec<HookCallback>>>,
}

impl HookListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener; listeners sharing a priority keep insertion order.
    pub fn add(&mut self, hook: impl Into<String>, priority: i32, callback: HookCallback) {
        self.hooks
            .entry(hook.into())
            .or_default()
            .entry(priority)
            .or_default()
            .push(callback);
    }

    /// Add every listener of `other` not registered yet under the same hook
    /// and priority. Returns the number of listeners added.
    pub fn extend_missing(&mut self, other: &HookListeners) -> usize {
        let mut added = 0;
        for (hook, priorities) in &other.hooks {
            for (priority, callbacks) in priorities {
                for callback in callbacks {
                    let group = self
                        .hooks
                        .entry(hook.clone())
                        .or_default()
                        .entry(*priority)
                        .or_default();
                    if !group.contains(callback) {
                        group.push(callback.clone());
                        added += 1;
                    }
                }
            }
        }
        added
    }

    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn get(&self, hook: &str) -> Option<&BTreeMap<i32, Vec<HookCallback>>> {
        self.hooks.get(hook)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Total number of listeners across all hooks.
    pub fn len(&self) -> usize {
        self.hooks
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

impl From<BTreeMap<String, BTreeMap<i32, Vec<HookCallback>>>> for HookListeners {
    fn from(hooks: BTreeMap<String, BTreeMap<i32, Vec<HookCallback>>>) -> Self {
        Self { hooks }
    }
}

/// Where a callback came from. Legacy sorts before listeners of equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    Legacy,
    Listener,
}

#[derive(Debug)]
struct RankedCallback {
    priority: i32,
    origin: Origin,
    callback: HookCallback,
}

/// Normalize both sources of one hook into ranked callbacks.
fn rank(
    legacy: &[HookCallback],
    listeners: Option<&BTreeMap<i32, Vec<HookCallback>>>,
) -> Vec<RankedCallback> {
    let legacy = legacy.iter().map(|callback| RankedCallback {
        priority: 0,
        origin: Origin::Legacy,
        callback: callback.clone(),
    });

    let listeners = listeners.into_iter().flatten().flat_map(|(priority, callbacks)| {
        callbacks.iter().map(move |callback| RankedCallback {
            priority: *priority,
            origin: Origin::Listener,
            callback: callback.clone(),
        })
    });

    legacy.chain(listeners).collect()
}

/// Merge the legacy table with prioritized listeners.
///
/// Returns an entry for every hook named by either source. The sort is
/// stable, so callbacks of the same priority and origin keep their order.
pub fn merge_hooks(legacy: &LegacyHooks, listeners: &HookListeners) -> LegacyHooks {
    let mut merged = LegacyHooks::new();

    for (hook, callbacks) in legacy {
        if listeners.get(hook).is_none() {
            merged.insert(hook.clone(), callbacks.clone());
        }
    }

    for hook in listeners.hook_names() {
        let existing = legacy.get(hook).map(Vec::as_slice).unwrap_or_default();
        let mut ranked = rank(existing, listeners.get(hook));
        ranked.sort_by_key(|entry| (Reverse(entry.priority), entry.origin));

        merged.insert(
            hook.to_string(),
            ranked.into_iter().map(|entry| entry.callback).collect(),
        );
    }

    merged
}
