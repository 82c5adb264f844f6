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

//! Contao Framework Bridge
//!
//! Bootstraps the legacy Contao runtime inside a request-scoped framework.
//! The legacy code base expects process-wide markers (`TL_MODE`, `TL_ROOT`,
//! ...), a global hook table and static/singleton classes. This crate
//! replaces the markers with an explicit [`RequestContext`], wraps the hook
//! table in a shared [`HookTable`] service and exposes legacy classes
//! through [`Adapter`]s.
//!
//! # Architecture
//!
//! - **Legacy adapters**: uniform `invoke(method, args)` over static and
//!   singleton classes, selected when the class is registered
//! - **Adapter cache**: at most one adapter and one singleton instance per
//!   class for the lifetime of a framework
//! - **Hook merger**: folds the legacy hook table and prioritized listeners
//!   into one ordered list per hook
//! - **Initialization state machine**: derives the request scope, enforces
//!   the installation and request-token invariants, runs exactly once
//!
//! # Example
//!
//! ```rust,ignore
//! use contao_framework::{AttributeScopeMatcher, ContaoFramework, Container, Request, StaticRouter};
//!
//! let mut framework = ContaoFramework::new(
//!     Arc::new(StaticRouter::new().with_route("contao_backend", "/contao")),
//!     Arc::new(AttributeScopeMatcher),
//!     "/var/www/contao",
//!     ErrorLevel::DEFAULT,
//! );
//!
//! framework.set_container(Arc::new(Container::new()));
//! framework.set_request(
//!     Request::new()
//!         .with_attribute("_route", "contao_backend")
//!         .with_attribute("_scope", "backend"),
//! )?;
//! framework.initialize()?;
//!
//! let context = framework.context().unwrap();
//! assert_eq!(context.markers()["TL_MODE"], "BE");
//! ```

pub mod adapter;
pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod error_level;
pub mod framework;
pub mod hooks;
pub mod instances;
pub mod legacy;
pub mod request;
pub mod routing;
pub mod scope;

// Re-exports
pub use adapter::{Adapter, ClassDefinition, ClassKind, Constructor, LegacyObject, StaticClass};
pub use config::{FrameworkConfig, ListenerDefinition, LocalSettings};
pub use container::{resolve, Container, Service, ServiceLocator};
pub use context::{LoginState, RequestContext, RequestMarkers};
pub use error::{ConfigError, FrameworkError, FrameworkResult, UsageError};
pub use error_level::{ErrorLevel, ErrorReporting, ProcessErrorReporting};
pub use framework::{ContaoFramework, InitEvent, InitState};
pub use hooks::{merge_hooks, HookCallback, HookListeners, HookTable, LegacyHooks};
pub use instances::AdapterCache;
pub use legacy::{
    ConfigAdapter, LocalConfig, RequestTokenAdapter, RequestTokenStore, CONFIG_CLASS,
    REQUEST_TOKEN_CLASS,
};
pub use request::Request;
pub use routing::{script_path, Router, StaticRouter};
pub use scope::{AttributeScopeMatcher, Mode, Scope, ScopeMatcher};

/// Service id under which the initialized [`RequestContext`] is published.
pub const REQUEST_CONTEXT_SERVICE: &str = "contao.framework.request_context";

/// Service id of the shared hook table.
pub const HOOK_TABLE_SERVICE: &str = "contao.framework.hook_table";
