//! Identity sink port.
//!
//! Follows the blanket-impl pattern used for object-safe async traits:
//! [`IdentitySink`] uses native async fns, [`IdentitySinkDyn`] is its boxed
//! twin, implemented for every sink, so a bridge can hold several of them.

use std::future::Future;
use std::pin::Pin;

use chattlin_types::error::AnalyticsError;
use chattlin_types::identity::DashboardUser;

/// Receiver of dashboard identity changes.
pub trait IdentitySink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Associate subsequent events with `user`.
    fn identify(
        &self,
        user: &DashboardUser,
    ) -> impl Future<Output = Result<(), AnalyticsError>> + Send;

    /// Forget the current user.
    fn reset(&self) -> impl Future<Output = Result<(), AnalyticsError>> + Send;
}

/// Object-safe version of [`IdentitySink`] with boxed futures.
pub trait IdentitySinkDyn: Send + Sync {
    fn name(&self) -> &str;

    fn identify_boxed<'a>(
        &'a self,
        user: &'a DashboardUser,
    ) -> Pin<Box<dyn Future<Output = Result<(), AnalyticsError>> + Send + 'a>>;

    fn reset_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), AnalyticsError>> + Send + '_>>;
}

impl<T: IdentitySink> IdentitySinkDyn for T {
    fn name(&self) -> &str {
        IdentitySink::name(self)
    }

    fn identify_boxed<'a>(
        &'a self,
        user: &'a DashboardUser,
    ) -> Pin<Box<dyn Future<Output = Result<(), AnalyticsError>> + Send + 'a>> {
        Box::pin(self.identify(user))
    }

    fn reset_boxed(&self) -> Pin<Box<dyn Future<Output = Result<(), AnalyticsError>> + Send + '_>> {
        Box::pin(self.reset())
    }
}
