//! Lifecycle state of the display.

/// Display lifecycle.
///
/// `Running` until a quit input or a fatal renderer error, then
/// `Terminating` for the rest of the process. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Accepting records and input.
    #[default]
    Running,
    /// Shutting down; further events are ignored.
    Terminating,
}
