//! Provider configuration.

use std::time::Duration;

use authgate_core::LogoutPolicy;

/// Default bound on a single credential store call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for [`crate::AuthProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bound on the store read performed by a check. Expiry fails closed.
    pub check_timeout: Duration,
    /// Bound on the store call performed by a login or logout.
    pub operation_timeout: Duration,
    /// What a failed logout does to the local session.
    pub logout_policy: LogoutPolicy,
}

impl ProviderConfig {
    /// Override the check timeout.
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }

    /// Override the login/logout timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Override the logout failure policy.
    pub fn with_logout_policy(mut self, policy: LogoutPolicy) -> Self {
        self.logout_policy = policy;
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            check_timeout: DEFAULT_TIMEOUT,
            operation_timeout: DEFAULT_TIMEOUT,
            logout_policy: LogoutPolicy::Strict,
        }
    }
}
