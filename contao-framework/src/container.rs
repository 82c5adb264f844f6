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

//! Service locator handed to the framework by the host.

use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;

/// A shared service.
pub type Service = Arc<dyn Any + Send + Sync>;

pub trait ServiceLocator: Send + Sync {
    /// Whether a service is registered under `id`.
    fn has(&self, id: &str) -> bool;

    /// The service registered under `id`.
    fn get(&self, id: &str) -> Option<Service>;

    /// Register or replace the service under `id`.
    fn set(&self, id: &str, service: Service);
}

/// Typed lookup of a service.
pub fn resolve<T: Any + Send + Sync>(locator: &dyn ServiceLocator, id: &str) -> Option<Arc<T>> {
    locator.get(id)?.downcast::<T>().ok()
}

/// In-memory service container.
#[derive(Default)]
pub struct Container {
    services: DashMap<String, Service>,
}

impl Container {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl ServiceLocator for Container {
    fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Service> {
        self.services.get(id).map(|service| service.clone())
    }

    fn set(&self, id: &str, service: Service) {
        self.services.insert(id.to_string(), service);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_resolve() {
        let container = Container::new();
        assert!(container.is_empty());

        container.set("test.listener", Arc::new(String::from("listener")));
        assert!(container.has("test.listener"));
        assert_eq!(
            resolve::<String>(&container, "test.listener").as_deref(),
            Some(&"listener".to_string())
        );
        assert!(resolve::<u32>(&container, "test.listener").is_none());
        assert!(resolve::<String>(&container, "missing").is_none());
    }
}
