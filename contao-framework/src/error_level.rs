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

//! Error-reporting verbosity shared with legacy code.

use std::sync::atomic::{AtomicI32, Ordering};

/// Bit mask of reported diagnostic classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorLevel(pub i32);

impl ErrorLevel {
    pub const E_ERROR: ErrorLevel = ErrorLevel(1);
    pub const E_WARNING: ErrorLevel = ErrorLevel(2);
    pub const E_NOTICE: ErrorLevel = ErrorLevel(8);
    pub const E_USER_NOTICE: ErrorLevel = ErrorLevel(1024);
    pub const E_DEPRECATED: ErrorLevel = ErrorLevel(8192);
    pub const E_USER_DEPRECATED: ErrorLevel = ErrorLevel(16384);
    pub const E_ALL: ErrorLevel = ErrorLevel(32767);

    /// Everything except deprecations.
    pub const DEFAULT: ErrorLevel =
        ErrorLevel(Self::E_ALL.0 ^ Self::E_DEPRECATED.0 ^ Self::E_USER_DEPRECATED.0);

    pub fn without(self, other: ErrorLevel) -> ErrorLevel {
        ErrorLevel(self.0 & !other.0)
    }

    pub fn contains(self, other: ErrorLevel) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Process-wide error-reporting switch.
pub trait ErrorReporting: Send + Sync {
    fn level(&self) -> ErrorLevel;

    fn set_level(&self, level: ErrorLevel);
}

static PROCESS_LEVEL: AtomicI32 = AtomicI32::new(ErrorLevel::E_ALL.0);

/// The error-reporting level of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessErrorReporting;

impl ErrorReporting for ProcessErrorReporting {
    fn level(&self) -> ErrorLevel {
        ErrorLevel(PROCESS_LEVEL.load(Ordering::SeqCst))
    }

    fn set_level(&self, level: ErrorLevel) {
        PROCESS_LEVEL.store(level.0, Ordering::SeqCst);
    }
}

/// Reapplies a level when dropped, on success and on error paths alike.
pub(crate) struct RestoreLevel<'a> {
    reporting: &'a dyn ErrorReporting,
    level: ErrorLevel,
}

impl<'a> RestoreLevel<'a> {
    pub(crate) fn new(reporting: &'a dyn ErrorReporting, level: ErrorLevel) -> Self {
        Self { reporting, level }
    }
}

impl Drop for RestoreLevel<'_> {
    fn drop(&mut self) {
        self.reporting.set_level(self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingReporting {
        level: Mutex<Option<ErrorLevel>>,
    }

    impl ErrorReporting for RecordingReporting {
        fn level(&self) -> ErrorLevel {
            (*self.level.lock()).unwrap_or(ErrorLevel::E_ALL)
        }

        fn set_level(&self, level: ErrorLevel) {
            *self.level.lock() = Some(level);
        }
    }

    #[test]
    fn test_default_excludes_deprecations() {
        assert!(!ErrorLevel::DEFAULT.contains(ErrorLevel::E_DEPRECATED));
        assert!(!ErrorLevel::DEFAULT.contains(ErrorLevel::E_USER_DEPRECATED));
        assert!(ErrorLevel::DEFAULT.contains(ErrorLevel::E_USER_NOTICE));
        assert_eq!(
            ErrorLevel::E_ALL.without(ErrorLevel::E_USER_NOTICE),
            ErrorLevel(32767 ^ 1024)
        );
    }

    #[test]
    fn test_restore_on_drop() {
        let reporting = RecordingReporting::default();
        {
            let _guard = RestoreLevel::new(&reporting, ErrorLevel::DEFAULT);
            reporting.set_level(ErrorLevel::E_ERROR);
        }
        assert_eq!(reporting.level(), ErrorLevel::DEFAULT);
    }

    #[test]
    fn test_restore_on_error_path() {
        let reporting = RecordingReporting::default();
        let failing = || -> Result<(), &'static str> {
            let _guard = RestoreLevel::new(&reporting, ErrorLevel::E_WARNING);
            reporting.set_level(ErrorLevel::E_ALL);
            Err("failed")
        };

        assert!(failing().is_err());
        assert_eq!(reporting.level(), ErrorLevel::E_WARNING);
    }
}
