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

//! Adapter and instance cache
//!
//! Maps class identifiers to their registered definition, the memoized
//! [`Adapter`] and, for singleton classes, the shared instance slot. The
//! cache lives as long as the framework that owns it.

use crate::adapter::{Adapter, ClassDefinition, ClassKind, Constructor, LegacyObject, SingletonSlot};
use crate::error::{FrameworkResult, UsageError};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Process-scoped cache of adapters and instances, keyed by class id.
#[derive(Default)]
pub struct AdapterCache {
    /// Registered class definitions.
    classes: DashMap<String, ClassDefinition>,
    /// Memoized adapters.
    adapters: DashMap<String, Adapter>,
    /// Instance slots of singleton classes.
    singletons: DashMap<String, Arc<SingletonSlot>>,
}

impl AdapterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a legacy class.
    pub fn register(&self, definition: ClassDefinition) -> Result<(), UsageError> {
        if self.classes.contains_key(&definition.id) {
            return Err(UsageError::ClassAlreadyRegistered(definition.id));
        }
        tracing::trace!(class = %definition.id, "Registered legacy class");
        self.classes.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn is_registered(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// Seed the cache with a ready-made adapter.
    ///
    /// A seeded adapter wins over any registered definition for the same class.
    pub fn set_adapter(&self, adapter: Adapter) {
        self.adapters.insert(adapter.class().to_string(), adapter);
    }

    /// Return the adapter for `class`, creating it on first access.
    pub fn get_adapter(&self, class: &str) -> Result<Adapter, UsageError> {
        if let Some(adapter) = self.adapters.get(class) {
            return Ok(adapter.clone());
        }

        let kind = self.kind_of(class)?;
        let adapter = match kind {
            ClassKind::Static(dispatch) => Adapter::Static {
                class: class.to_string(),
                dispatch,
            },
            ClassKind::Singleton(constructor) => Adapter::Singleton {
                class: class.to_string(),
                slot: self.singleton_slot(class, constructor),
            },
            ClassKind::Instantiable {
                statics: Some(dispatch),
                ..
            } => Adapter::Static {
                class: class.to_string(),
                dispatch,
            },
            ClassKind::Instantiable { statics: None, .. } => {
                return Err(UsageError::NotAdaptable(class.to_string()))
            }
        };

        let adapter = self
            .adapters
            .entry(class.to_string())
            .or_insert(adapter)
            .clone();
        tracing::debug!(class = %class, singleton = adapter.is_singleton(), "Created adapter");
        Ok(adapter)
    }

    /// Create an instance of `class`.
    ///
    /// Singleton classes are constructed once with the arguments of the first
    /// call; later calls return that instance and ignore their arguments.
    /// Other classes are constructed afresh on every call and never cached.
    pub fn create_instance(
        &self,
        class: &str,
        args: &[Value],
    ) -> FrameworkResult<Arc<dyn LegacyObject>> {
        match self.kind_of(class)? {
            ClassKind::Singleton(constructor) => {
                let slot = self.singleton_slot(class, constructor);
                Ok(slot.get_or_construct(args)?)
            }
            ClassKind::Instantiable { constructor, .. } => Ok(constructor(args)?),
            ClassKind::Static(_) => Err(UsageError::NotInstantiable(class.to_string()).into()),
        }
    }

    /// Number of adapters created or seeded so far.
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    fn kind_of(&self, class: &str) -> Result<ClassKind, UsageError> {
        self.classes
            .get(class)
            .map(|definition| definition.kind.clone())
            .ok_or_else(|| UsageError::ClassNotRegistered(class.to_string()))
    }

    fn singleton_slot(&self, class: &str, constructor: Constructor) -> Arc<SingletonSlot> {
        self.singletons
            .entry(class.to_string())
            .or_insert_with(|| Arc::new(SingletonSlot::new(class, constructor)))
            .clone()
    }
}
