//! # Backend Handle
//!
//! The resolved capability bundle for one rendering toolkit. A handle is what
//! the registry hands back once a toolkit's native dependency has loaded: a
//! factory for canvases, a factory for window managers, a version tag, and an
//! optional declaration of the interactive framework the toolkit needs to
//! pump its events.
//!
//! Handles are reference-counted and compared by allocation identity. A
//! handle supplied directly by the caller (rather than resolved through the
//! registry) is persisted under a key synthesized from that identity.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Rendering surface produced by the active toolkit.
///
/// The blocking event-loop entry point lives here; everything else a canvas
/// can do belongs to the toolkit implementation, not this crate.
pub trait Canvas {
    /// Run the toolkit's blocking event loop.
    ///
    /// # Arguments
    /// * `timeout` - Maximum time to pump events before returning; a zero
    ///   duration means run until the toolkit decides to stop
    fn start_event_loop(&mut self, timeout: Duration);
}

/// Window lifecycle management for the active toolkit.
pub trait WindowManager {
    /// Make the managed window visible
    fn show(&mut self);

    /// Tear the managed window down
    fn destroy(&mut self);
}

type CanvasFactory = dyn Fn() -> Box<dyn Canvas> + Send + Sync;
type ManagerFactory = dyn Fn() -> Box<dyn WindowManager> + Send + Sync;

/// Resolved capability bundle for one rendering toolkit.
///
/// The three required members (canvas factory, window-manager factory,
/// version tag) are populated explicitly when the bundle is built; there is
/// no structural inheritance from the toolkit side.
pub struct BackendHandle {
    name: String,
    version: String,
    required_framework: Option<String>,
    canvas_factory: Box<CanvasFactory>,
    manager_factory: Box<ManagerFactory>,
}

impl BackendHandle {
    /// Create a new handle from the three required members
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        canvas_factory: impl Fn() -> Box<dyn Canvas> + Send + Sync + 'static,
        manager_factory: impl Fn() -> Box<dyn WindowManager> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            required_framework: None,
            canvas_factory: Box::new(canvas_factory),
            manager_factory: Box::new(manager_factory),
        }
    }

    /// Declare the interactive framework this toolkit needs to pump events.
    ///
    /// Leaving this unset marks the toolkit framework-agnostic, e.g. a
    /// non-interactive raster backend.
    #[must_use]
    pub fn with_required_framework(mut self, framework: impl Into<String>) -> Self {
        self.required_framework = Some(framework.into());
        self
    }

    /// The toolkit's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The toolkit's version tag
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The interactive framework this toolkit requires, if any
    pub fn required_framework(&self) -> Option<&str> {
        self.required_framework.as_deref()
    }

    /// Create a fresh canvas from the toolkit's canvas factory
    pub fn create_canvas(&self) -> Box<dyn Canvas> {
        (self.canvas_factory)()
    }

    /// Create a fresh window manager from the toolkit's manager factory
    pub fn create_window_manager(&self) -> Box<dyn WindowManager> {
        (self.manager_factory)()
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("required_framework", &self.required_framework)
            .finish_non_exhaustive()
    }
}

/// Persisted-name key for a handle that has no registry name.
///
/// Derived from the allocation address, so two distinct handles never share a
/// key and the same handle always maps to the same key.
pub(crate) fn synthesized_key(handle: &Arc<BackendHandle>) -> String {
    format!("handle://{:x}", Arc::as_ptr(handle) as usize)
}
