//! Ports for the host-facing collaborators: system snapshot and screen capture.

use std::path::PathBuf;

use sage_types::error::ExecutionError;

/// Produces the live system snapshot injected as the second priming message.
///
/// Never fails: fields that cannot be gathered are reported as unknown.
pub trait SystemInspector: Send + Sync {
    fn snapshot(&self) -> String;
}

/// Produces a screenshot file on demand.
pub trait ScreenCapture: Send + Sync {
    fn capture(&self) -> impl std::future::Future<Output = Result<PathBuf, ExecutionError>> + Send;
}
