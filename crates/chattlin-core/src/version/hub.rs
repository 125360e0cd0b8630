//! Release hub port.

use chattlin_types::error::HubError;

/// Source of the latest published Chattlin version.
///
/// `Ok(None)` means the hub answered without a version.
/// The HTTP implementation lives in chattlin-infra.
pub trait VersionHub: Send + Sync {
    fn latest_version(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<String>, HubError>> + Send;
}
