//! # Toolkit Registry
//!
//! Name-to-toolkit resolution. Resolving a name doubles as capability
//! discovery: a toolkit whose native dependency cannot be loaded reports
//! [`SelectError::Unavailable`], which is the signal auto-detection uses to
//! move on to the next candidate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::handle::BackendHandle;
use crate::backend::resolver::SelectError;

/// Maps a backend name to a loadable toolkit capability bundle.
///
/// Real implementations typically wrap whatever mechanism the host uses to
/// load optional native dependencies; the contract is only that a missing
/// dependency surfaces as [`SelectError::Unavailable`].
pub trait ToolkitRegistry {
    /// Resolve a lowercase backend name to its capability bundle.
    ///
    /// # Errors
    /// [`SelectError::Unavailable`] when the name is unknown or its native
    /// dependency is missing; any other load failure passes through verbatim.
    fn resolve(&self, name: &str) -> Result<Arc<BackendHandle>, SelectError>;
}

type ToolkitLoader = dyn Fn() -> Result<Arc<BackendHandle>, SelectError> + Send + Sync;

/// Registry backed by an in-process table of toolkit loaders.
///
/// Each loader is the toolkit's capability-discovery call: it either produces
/// a ready handle or reports why the toolkit cannot be used.
#[derive(Default)]
pub struct StaticRegistry {
    loaders: HashMap<String, Box<ToolkitLoader>>,
}

impl StaticRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a toolkit loader under a name.
    ///
    /// Names are stored lowercase; registering the same name twice replaces
    /// the earlier loader.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        loader: impl Fn() -> Result<Arc<BackendHandle>, SelectError> + Send + Sync + 'static,
    ) {
        self.loaders
            .insert(name.into().to_ascii_lowercase(), Box::new(loader));
    }
}

impl ToolkitRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<BackendHandle>, SelectError> {
        match self.loaders.get(name) {
            Some(loader) => loader(),
            None => Err(SelectError::Unavailable {
                backend: name.to_owned(),
                reason: "no toolkit registered under this name".to_owned(),
            }),
        }
    }
}
