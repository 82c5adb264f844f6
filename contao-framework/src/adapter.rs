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

//! Legacy class adapters
//!
//! Legacy classes are registered once with a [`ClassKind`] that says how they
//! are reached: through static methods, through a lazily created singleton,
//! or as plain instantiable classes. The kind decides the [`Adapter`] variant
//! up front, so dispatch never probes the class at call time.

use parking_lot::Mutex;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Static side of a legacy class.
pub trait StaticClass: Send + Sync {
    fn call_static(&self, method: &str, args: &[Value]) -> anyhow::Result<Value>;
}

impl<F> StaticClass for F
where
    F: Fn(&str, &[Value]) -> anyhow::Result<Value> + Send + Sync,
{
    fn call_static(&self, method: &str, args: &[Value]) -> anyhow::Result<Value> {
        self(method, args)
    }
}

/// An instance of a legacy class.
pub trait LegacyObject: Any + Send + Sync {
    fn call(&self, method: &str, args: &[Value]) -> anyhow::Result<Value>;

    fn as_any(&self) -> &dyn Any;
}

impl dyn LegacyObject {
    /// Downcast to the concrete legacy type.
    pub fn downcast_ref<T: LegacyObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Builds a legacy object from constructor arguments.
pub type Constructor = Arc<dyn Fn(&[Value]) -> anyhow::Result<Arc<dyn LegacyObject>> + Send + Sync>;

/// How a legacy class is reached.
#[derive(Clone)]
pub enum ClassKind {
    /// Only static methods; cannot be instantiated.
    Static(Arc<dyn StaticClass>),
    /// One shared instance, created on first use.
    Singleton(Constructor),
    /// A fresh object per instantiation, optionally with static methods.
    Instantiable {
        constructor: Constructor,
        statics: Option<Arc<dyn StaticClass>>,
    },
}

/// A legacy class registered with the framework.
#[derive(Clone)]
pub struct ClassDefinition {
    pub id: String,
    pub kind: ClassKind,
}

impl ClassDefinition {
    pub fn new_static(id: impl Into<String>, class: impl StaticClass + 'static) -> Self {
        Self {
            id: id.into(),
            kind: ClassKind::Static(Arc::new(class)),
        }
    }

    pub fn singleton<T, F>(id: impl Into<String>, construct: F) -> Self
    where
        T: LegacyObject,
        F: Fn(&[Value]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            kind: ClassKind::Singleton(constructor(construct)),
        }
    }

    pub fn instantiable<T, F>(id: impl Into<String>, construct: F) -> Self
    where
        T: LegacyObject,
        F: Fn(&[Value]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            kind: ClassKind::Instantiable {
                constructor: constructor(construct),
                statics: None,
            },
        }
    }

    /// Attach static methods to an instantiable class.
    ///
    /// Has no effect on static or singleton classes.
    pub fn with_statics(mut self, class: impl StaticClass + 'static) -> Self {
        if let ClassKind::Instantiable { statics, .. } = &mut self.kind {
            *statics = Some(Arc::new(class));
        }
        self
    }
}

impl fmt::Debug for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ClassKind::Static(_) => "static",
            ClassKind::Singleton(_) => "singleton",
            ClassKind::Instantiable { .. } => "instantiable",
        };
        f.debug_struct("ClassDefinition")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}

fn constructor<T, F>(construct: F) -> Constructor
where
    T: LegacyObject,
    F: Fn(&[Value]) -> anyhow::Result<T> + Send + Sync + 'static,
{
    Arc::new(move |args: &[Value]| -> anyhow::Result<Arc<dyn LegacyObject>> {
        let object: Arc<dyn LegacyObject> = Arc::new(construct(args)?);
        Ok(object)
    })
}

/// Holds the single shared instance of a singleton class.
///
/// Shared between the class adapter and [`crate::AdapterCache::create_instance`],
/// so both observe the same object.
pub struct SingletonSlot {
    class: String,
    constructor: Constructor,
    instance: Mutex<Option<Arc<dyn LegacyObject>>>,
}

impl SingletonSlot {
    pub(crate) fn new(class: impl Into<String>, constructor: Constructor) -> Self {
        Self {
            class: class.into(),
            constructor,
            instance: Mutex::new(None),
        }
    }

    /// Return the instance, constructing it with `args` on first use.
    ///
    /// Arguments passed after the instance exists are ignored.
    pub fn get_or_construct(&self, args: &[Value]) -> anyhow::Result<Arc<dyn LegacyObject>> {
        let mut instance = self.instance.lock();
        if let Some(existing) = instance.as_ref() {
            return Ok(existing.clone());
        }

        tracing::debug!(class = %self.class, "Creating singleton instance");
        let created = (self.constructor)(args)?;
        *instance = Some(created.clone());
        Ok(created)
    }

    pub fn is_constructed(&self) -> bool {
        self.instance.lock().is_some()
    }
}

/// Uniform call interface over a legacy class.
#[derive(Clone)]
pub enum Adapter {
    Static {
        class: String,
        dispatch: Arc<dyn StaticClass>,
    },
    Singleton {
        class: String,
        slot: Arc<SingletonSlot>,
    },
}

impl Adapter {
    /// Identifier of the wrapped class.
    pub fn class(&self) -> &str {
        match self {
            Adapter::Static { class, .. } | Adapter::Singleton { class, .. } => class,
        }
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self, Adapter::Singleton { .. })
    }

    /// Call `method` on the class. Errors from the legacy call are returned as is.
    pub fn invoke(&self, method: &str, args: &[Value]) -> anyhow::Result<Value> {
        match self {
            Adapter::Static { dispatch, .. } => dispatch.call_static(method, args),
            Adapter::Singleton { slot, .. } => slot.get_or_construct(&[])?.call(method, args),
        }
    }

    /// The singleton instance behind this adapter, if it has one.
    pub fn instance(&self) -> anyhow::Result<Option<Arc<dyn LegacyObject>>> {
        match self {
            Adapter::Static { .. } => Ok(None),
            Adapter::Singleton { slot, .. } => slot.get_or_construct(&[]).map(Some),
        }
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adapter::Static { class, .. } => f.debug_tuple("Static").field(class).finish(),
            Adapter::Singleton { class, slot } => f
                .debug_struct("Singleton")
                .field("class", class)
                .field("constructed", &slot.is_constructed())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Counter {
        start: i64,
    }

    impl LegacyObject for Counter {
        fn call(&self, method: &str, _args: &[Value]) -> anyhow::Result<Value> {
            match method {
                "start" => Ok(json!(self.start)),
                other => anyhow::bail!("Call to undefined method Counter::{}()", other),
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_static_adapter_dispatches_to_class() {
        let adapter = Adapter::Static {
            class: "Contao\\StringUtil".to_string(),
            dispatch: Arc::new(|method: &str, args: &[Value]| -> anyhow::Result<Value> {
                match method {
                    "len" => Ok(json!(args[0].as_str().map(str::len))),
                    _ => anyhow::bail!("unknown"),
                }
            }),
        };

        assert_eq!(adapter.invoke("len", &[json!("abc")]).unwrap(), json!(3));
        assert!(adapter.instance().unwrap().is_none());
        assert!(!adapter.is_singleton());
    }

    #[test]
    fn test_singleton_adapter_creates_instance_lazily() {
        let definition =
            ClassDefinition::singleton("Counter", |_args: &[Value]| Ok(Counter { start: 7 }));
        let ClassKind::Singleton(ctor) = definition.kind else {
            panic!("expected singleton kind");
        };
        let slot = Arc::new(SingletonSlot::new("Counter", ctor));
        let adapter = Adapter::Singleton {
            class: "Counter".to_string(),
            slot: slot.clone(),
        };

        assert!(!slot.is_constructed());
        assert_eq!(adapter.invoke("start", &[]).unwrap(), json!(7));
        assert!(slot.is_constructed());

        let first = adapter.instance().unwrap().unwrap();
        let second = adapter.instance().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.downcast_ref::<Counter>().unwrap().start, 7);
    }

    #[test]
    fn test_legacy_errors_propagate() {
        let slot = Arc::new(SingletonSlot::new(
            "Counter",
            constructor(|_args: &[Value]| Ok(Counter { start: 0 })),
        ));
        let adapter = Adapter::Singleton {
            class: "Counter".to_string(),
            slot,
        };

        let err = adapter.invoke("missing", &[]).unwrap_err();
        assert_eq!(err.to_string(), "Call to undefined method Counter::missing()");
    }

    #[test]
    fn test_with_statics_only_applies_to_instantiable() {
        fn noop(_method: &str, _args: &[Value]) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }

        let def = ClassDefinition::new_static("A", noop).with_statics(noop);
        assert!(matches!(def.kind, ClassKind::Static(_)));

        let def = ClassDefinition::instantiable("B", |_args: &[Value]| Ok(Counter { start: 1 }))
            .with_statics(noop);
        assert!(matches!(
            def.kind,
            ClassKind::Instantiable { statics: Some(_), .. }
        ));
    }
}
