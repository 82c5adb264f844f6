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

//! Framework bootstrap
//!
//! [`ContaoFramework`] prepares the legacy runtime for one unit of work
//! (usually one request). It runs at most once:
//!
//! ```text
//! Uninitialized --initialize()--> Initializing --ok--> Initialized
//!                                      |
//!                                      +--error--> Failed
//! ```
//!
//! Without a request only the root marker is set and the configuration is
//! preloaded. Attaching a request later completes the request-bound part
//! (markers, installation check, request token check, hook listeners).

use crate::adapter::{Adapter, ClassDefinition, LegacyObject};
use crate::config::FrameworkConfig;
use crate::container::{Service, ServiceLocator};
use crate::context::{LoginState, RequestContext, RequestMarkers};
use crate::error::{FrameworkError, FrameworkResult, UsageError};
use crate::error_level::{ErrorLevel, ErrorReporting, ProcessErrorReporting, RestoreLevel};
use crate::hooks::{HookListeners, HookTable};
use crate::instances::AdapterCache;
use crate::legacy::{
    ConfigAdapter, LocalConfig, RequestTokenAdapter, RequestTokenStore, CONFIG_CLASS,
    REQUEST_TOKEN_CLASS,
};
use crate::request::Request;
use crate::routing::{script_path, Router, StaticRouter};
use crate::scope::{Scope, ScopeMatcher};
use crate::{HOOK_TABLE_SERVICE, REQUEST_CONTEXT_SERVICE};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Initialization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    /// Constructed, `initialize()` not called yet
    Uninitialized,
    /// Initialization in progress
    Initializing,
    /// Initialized; further `initialize()` calls are no-ops
    Initialized,
    /// Initialization failed; nothing is rolled back and further
    /// `initialize()` calls are no-ops
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitEvent {
    Begin,
    Complete,
    Fail,
}

impl InitState {
    pub fn transition(self, event: InitEvent) -> Result<InitState, UsageError> {
        use InitEvent::*;
        use InitState::*;

        let next = match (self, event) {
            (Uninitialized, Begin) => Initializing,
            (Initializing, Complete) => Initialized,
            (Initializing, Fail) | (Initialized, Fail) => Failed,
            _ => {
                return Err(UsageError::InvalidTransition {
                    from: format!("{:?}", self),
                    event: format!("{:?}", event),
                })
            }
        };

        Ok(next)
    }
}

/// Bootstraps the legacy runtime for one request.
pub struct ContaoFramework {
    router: Arc<dyn Router>,
    scope_matcher: Arc<dyn ScopeMatcher>,
    root_dir: PathBuf,
    /// Level reapplied after every initialization attempt
    error_level: ErrorLevel,
    error_reporting: Arc<dyn ErrorReporting>,
    container: Option<Arc<dyn ServiceLocator>>,
    request: Option<Arc<Request>>,
    adapters: AdapterCache,
    hook_table: Arc<HookTable>,
    hook_listeners: HookListeners,
    installer_routes: Vec<String>,
    token_field: String,
    default_locale: String,
    state: InitState,
    context: Option<RequestContext>,
}

impl ContaoFramework {
    pub fn new(
        router: Arc<dyn Router>,
        scope_matcher: Arc<dyn ScopeMatcher>,
        root_dir: impl Into<PathBuf>,
        error_level: ErrorLevel,
    ) -> Self {
        let defaults = FrameworkConfig::default();

        Self {
            router,
            scope_matcher,
            root_dir: root_dir.into(),
            error_level,
            error_reporting: Arc::new(ProcessErrorReporting),
            container: None,
            request: None,
            adapters: AdapterCache::new(),
            hook_table: Arc::new(HookTable::new()),
            hook_listeners: HookListeners::new(),
            installer_routes: defaults.installer_routes,
            token_field: defaults.token_field,
            default_locale: defaults.default_locale,
            state: InitState::Uninitialized,
            context: None,
        }
    }

    /// Build a framework from configuration, with the built-in `Config` and
    /// `RequestToken` classes registered and a static router over the
    /// configured routes.
    pub fn from_config(
        config: &FrameworkConfig,
        scope_matcher: Arc<dyn ScopeMatcher>,
    ) -> FrameworkResult<Self> {
        let router = Arc::new(StaticRouter::from(config.routes.clone()));
        let mut framework = Self::new(
            router,
            scope_matcher,
            config.root_dir.clone(),
            config.error_level(),
        )
        .with_hook_table(Arc::new(HookTable::from_legacy(config.hooks.clone())))
        .with_installer_routes(config.installer_routes.clone())
        .with_token_field(config.token_field.clone())
        .with_default_locale(config.default_locale.clone());

        framework.register_class(LocalConfig::definition(config.settings.clone()))?;
        framework.register_class(RequestTokenStore::new().definition())?;
        framework.set_hook_listeners(config.hook_listeners());
        Ok(framework)
    }

    pub fn with_error_reporting(mut self, reporting: Arc<dyn ErrorReporting>) -> Self {
        self.error_reporting = reporting;
        self
    }

    /// Share a hook table with the host.
    pub fn with_hook_table(mut self, table: Arc<HookTable>) -> Self {
        self.hook_table = table;
        self
    }

    pub fn with_installer_routes(mut self, routes: Vec<String>) -> Self {
        self.installer_routes = routes;
        self
    }

    pub fn with_token_field(mut self, field: impl Into<String>) -> Self {
        self.token_field = field.into();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Attach the service container. Required before [`Self::initialize`].
    ///
    /// The hook table is published into the container right away.
    pub fn set_container(&mut self, container: Arc<dyn ServiceLocator>) {
        let table: Service = self.hook_table.clone();
        container.set(HOOK_TABLE_SERVICE, table);
        self.container = Some(container);
    }

    /// Attach the current request. A framework serves at most one request.
    ///
    /// If the framework was already initialized without a request, the
    /// request-bound initialization runs now.
    pub fn set_request(&mut self, request: impl Into<Arc<Request>>) -> FrameworkResult<()> {
        if self.request.is_some() {
            return Err(UsageError::RequestAlreadySet.into());
        }

        let request = request.into();
        self.request = Some(request.clone());

        if self.state != InitState::Initialized {
            return Ok(());
        }

        let reporting = self.error_reporting.clone();
        let _restore = RestoreLevel::new(reporting.as_ref(), self.error_level);
        let container = self.container.clone().ok_or(UsageError::ContainerNotSet)?;

        info!(route = ?request.route(), "Completing initialization for late request");
        let result = self.initialize_request(container.as_ref(), &request);
        self.finish(result)
    }

    pub fn set_hook_listeners(&mut self, listeners: HookListeners) {
        self.hook_listeners = listeners;
    }

    pub fn register_class(&self, definition: ClassDefinition) -> FrameworkResult<()> {
        Ok(self.adapters.register(definition)?)
    }

    /// Replace the adapter of a class, e.g. with a test double.
    pub fn set_adapter(&self, adapter: Adapter) {
        self.adapters.set_adapter(adapter);
    }

    pub fn get_adapter(&self, class: &str) -> FrameworkResult<Adapter> {
        Ok(self.adapters.get_adapter(class)?)
    }

    pub fn create_instance(
        &self,
        class: &str,
        args: &[Value],
    ) -> FrameworkResult<Arc<dyn LegacyObject>> {
        self.adapters.create_instance(class, args)
    }

    pub fn config_adapter(&self) -> FrameworkResult<ConfigAdapter> {
        Ok(ConfigAdapter(self.get_adapter(CONFIG_CLASS)?))
    }

    pub fn request_token_adapter(&self) -> FrameworkResult<RequestTokenAdapter> {
        Ok(RequestTokenAdapter(self.get_adapter(REQUEST_TOKEN_CLASS)?))
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Initialized
    }

    /// Markers set so far; `None` before the first initialization attempt.
    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_deref()
    }

    pub fn hook_table(&self) -> &Arc<HookTable> {
        &self.hook_table
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Initialize the framework.
    ///
    /// Runs at most once: returns immediately once initialized, and also after
    /// a failed attempt, so an error handler may call it again safely. The
    /// configured error-reporting level is reapplied when this returns,
    /// whether or not it succeeded.
    pub fn initialize(&mut self) -> FrameworkResult<()> {
        let reporting = self.error_reporting.clone();
        let _restore = RestoreLevel::new(reporting.as_ref(), self.error_level);

        if self.state == InitState::Initialized {
            debug!("Framework already initialized");
            return Ok(());
        }

        if self.state == InitState::Failed {
            debug!("Framework initialization failed before, not retrying");
            return Ok(());
        }

        let container = self.container.clone().ok_or(UsageError::ContainerNotSet)?;
        self.state = self.state.transition(InitEvent::Begin)?;

        info!(
            root = %self.root_dir.display(),
            has_request = self.request.is_some(),
            "Initializing framework"
        );

        let result = self.run_initialization(container.as_ref());
        self.finish(result)
    }

    fn run_initialization(&mut self, container: &dyn ServiceLocator) -> FrameworkResult<()> {
        self.context = Some(RequestContext::new(self.root_dir.clone()));
        self.config_adapter()?.preload()?;

        match self.request.clone() {
            Some(request) => self.initialize_request(container, &request),
            None => {
                debug!("No request attached, skipping request-bound initialization");
                self.publish_context(container);
                Ok(())
            }
        }
    }

    fn initialize_request(
        &mut self,
        container: &dyn ServiceLocator,
        request: &Request,
    ) -> FrameworkResult<()> {
        let route = request.route();
        let scope = self.scope_matcher.scope(request);
        let markers = self.request_markers(request, route, scope)?;

        debug!(
            route = ?route,
            mode = ?markers.mode,
            script = ?markers.script,
            language = %markers.language,
            "Setting request markers"
        );
        self.context_mut().request = Some(markers);

        let config = self.config_adapter()?;
        self.validate_installation(route, &config)?;
        self.context_mut().time_zone = config.time_zone()?;

        self.handle_request_token(request)?;
        self.register_hook_listeners();
        self.publish_context(container);

        Ok(())
    }

    fn request_markers(
        &self,
        request: &Request,
        route: Option<&str>,
        scope: Option<Scope>,
    ) -> FrameworkResult<RequestMarkers> {
        let script = match route {
            Some(route) => {
                let url = self.router.generate(route, &request.route_params())?;
                Some(script_path(&url, request.base_path()))
            }
            None => None,
        };

        Ok(RequestMarkers {
            mode: scope.map(Scope::mode),
            script,
            referer_id: request.referer_id().unwrap_or_default().to_string(),
            path: request.base_path().to_string(),
            login: LoginState::default(),
            language: request
                .locale()
                .unwrap_or(self.default_locale.as_str())
                .to_string(),
        })
    }

    fn validate_installation(
        &self,
        route: Option<&str>,
        config: &ConfigAdapter,
    ) -> FrameworkResult<()> {
        if let Some(route) = route {
            if self.installer_routes.iter().any(|installer| installer == route) {
                return Ok(());
            }
        }

        if !config.is_complete()? {
            warn!(route = ?route, "Installation is incomplete");
            return Err(FrameworkError::IncompleteInstallation);
        }

        Ok(())
    }

    /// Publish the current token, then validate the submitted one. Only
    /// token-checked, state-changing, non-AJAX requests are validated.
    fn handle_request_token(&mut self, request: &Request) -> FrameworkResult<()> {
        let tokens = self.request_token_adapter()?;
        self.context_mut().request_token = tokens.get()?;

        if !request.token_check() || request.is_method_safe() || request.is_xml_http_request() {
            return Ok(());
        }

        if !tokens.validate(request.body_param(&self.token_field))? {
            warn!(
                method = %request.method(),
                route = ?request.route(),
                "Invalid request token"
            );
            return Err(FrameworkError::InvalidRequestToken);
        }

        Ok(())
    }

    fn register_hook_listeners(&self) {
        if self.hook_listeners.is_empty() {
            return;
        }
        self.hook_table.merge_listeners(&self.hook_listeners);
    }

    fn publish_context(&self, container: &dyn ServiceLocator) {
        if let Some(context) = &self.context {
            let service: Service = Arc::new(context.clone());
            container.set(REQUEST_CONTEXT_SERVICE, service);
        }
    }

    fn context_mut(&mut self) -> &mut RequestContext {
        let root = &self.root_dir;
        self.context
            .get_or_insert_with(|| RequestContext::new(root.clone()))
    }

    fn finish(&mut self, result: FrameworkResult<()>) -> FrameworkResult<()> {
        match result {
            Ok(()) => {
                if self.state == InitState::Initializing {
                    self.state = self.state.transition(InitEvent::Complete)?;
                    info!("Framework initialized");
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Framework initialization failed");
                self.state = self.state.transition(InitEvent::Fail)?;
                Err(err)
            }
        }
    }
}

impl fmt::Debug for ContaoFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContaoFramework")
            .field("root_dir", &self.root_dir)
            .field("state", &self.state)
            .field("has_container", &self.container.is_some())
            .field("has_request", &self.request.is_some())
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let state = InitState::Uninitialized;
        let state = state.transition(InitEvent::Begin).unwrap();
        assert_eq!(state, InitState::Initializing);
        assert_eq!(
            state.transition(InitEvent::Complete).unwrap(),
            InitState::Initialized
        );
        assert_eq!(state.transition(InitEvent::Fail).unwrap(), InitState::Failed);
        assert_eq!(
            InitState::Initialized.transition(InitEvent::Fail).unwrap(),
            InitState::Failed
        );
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(InitState::Initialized.transition(InitEvent::Begin).is_err());
        assert!(InitState::Failed.transition(InitEvent::Begin).is_err());
        assert!(InitState::Uninitialized
            .transition(InitEvent::Complete)
            .is_err());
    }

    #[test]
    fn test_from_config_registers_builtin_classes() {
        let mut config = FrameworkConfig::default();
        config.settings.complete = true;
        config.routes.insert("dummy".into(), "/index.html".into());

        let framework =
            ContaoFramework::from_config(&config, Arc::new(crate::AttributeScopeMatcher)).unwrap();
        assert!(framework.config_adapter().unwrap().is_complete().unwrap());
        let token = framework.request_token_adapter().unwrap().get().unwrap();
        assert_eq!(token.map(|t| t.len()), Some(32));
        assert_eq!(framework.state(), InitState::Uninitialized);
    }
}
