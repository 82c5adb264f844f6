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

//! Framework error types

use thiserror::Error;

/// Result type for framework operations
pub type FrameworkResult<T> = Result<T, FrameworkError>;

/// Errors raised while bootstrapping the framework
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// The framework was used incorrectly by the host application.
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("The installation has not been completed. Open the Contao install tool to continue.")]
    IncompleteInstallation,

    #[error("Invalid request token. Please reload the page and try again.")]
    InvalidRequestToken,

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raised by a router, scope matcher or legacy class and passed on untouched.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl FrameworkError {
    /// Whether this is a programming error rather than a runtime condition.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, FrameworkError::Usage(_))
    }
}

/// Programming errors; these are never caught by the framework.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("The service container has not been set")]
    ContainerNotSet,

    #[error("The request has already been set")]
    RequestAlreadySet,

    #[error("Class not registered: {0}")]
    ClassNotRegistered(String),

    #[error("Class already registered: {0}")]
    ClassAlreadyRegistered(String),

    #[error("Class cannot be instantiated: {0}")]
    NotInstantiable(String),

    #[error("Class exposes neither static methods nor a singleton: {0}")]
    NotAdaptable(String),

    #[error("Invalid state transition: {from} -> {event}")]
    InvalidTransition { from: String, event: String },
}

/// Errors while loading the framework configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
