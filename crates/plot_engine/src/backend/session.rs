//! Interactive-session integration hooks

/// Observer told about backend switches after they commit.
///
/// Hosts embedding the front-end in an interactive session (a notebook shell,
/// a REPL with event-loop integration) implement this to arrange event-loop
/// cooperation with the newly active framework. Running without an observer
/// is a fully supported configuration.
pub trait SessionObserver {
    /// Called once per committed selection with the new backend's required
    /// framework, or `None` for framework-agnostic backends.
    fn notify_active_framework(&mut self, framework: Option<&str>);
}
