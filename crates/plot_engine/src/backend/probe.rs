//! Detection of the interactive framework owning the process event loop

/// Reports which interactive framework, if any, is currently running.
pub trait FrameworkProbe {
    /// Name of the running framework, or `None` when no event loop is active
    fn running_framework(&self) -> Option<String>;
}

/// Probe for hosts that never start an interactive framework
pub struct NoRunningFramework;

impl FrameworkProbe for NoRunningFramework {
    fn running_framework(&self) -> Option<String> {
        None
    }
}
