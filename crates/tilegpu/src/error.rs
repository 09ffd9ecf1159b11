use thiserror::Error;

/// Errors surfaced by the state tracker to its callers.
///
/// Unsupported configurations (unaligned blits, unknown format pairs) are not
/// errors; those fall through to a more general strategy. Only genuine
/// resource exhaustion is reported here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GpuError {
    /// Texture storage could not be finalized (allocation failed or the
    /// upload path never produced backing storage).
    #[error("out of memory finalizing texture storage")]
    OutOfMemory,
}
