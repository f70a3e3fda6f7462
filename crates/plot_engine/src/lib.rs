//! # Plot Engine
//!
//! Runtime GUI toolkit resolution for a plotting front-end.
//!
//! ## Features
//!
//! - **Backend Resolution**: Pick a concrete, loadable rendering toolkit from
//!   an explicit request, a configured default, or environment auto-detection
//! - **Event-Loop Safety**: Refuse toolkit switches that conflict with an
//!   already-running interactive framework
//! - **Pluggable Collaborators**: Registry, framework probe, config store,
//!   and session integration are all narrow trait seams
//! - **Data-Driven Policy**: The auto-detection priority table and fallback
//!   order are plain configuration values
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plot_engine::prelude::*;
//!
//! fn main() -> Result<(), SelectError> {
//!     let registry = StaticRegistry::new();
//!     // Register toolkit adapters on the registry here.
//!     let prefs = MemoryPreferences::new(BackendPreference::Auto);
//!     let mut resolver = BackendResolver::new(
//!         Box::new(registry),
//!         Box::new(NoRunningFramework),
//!         Box::new(prefs),
//!     );
//!
//!     let backend = resolver.current()?;
//!     println!("drawing with {} {}", backend.name(), backend.version());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod backend;
pub mod config;
pub mod logging;
pub mod settings;

pub use backend::resolver::{BackendRequest, BackendResolver, SelectError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        backend::{
            handle::{BackendHandle, Canvas, WindowManager},
            policy::AutoSelectPolicy,
            probe::{FrameworkProbe, NoRunningFramework},
            registry::{StaticRegistry, ToolkitRegistry},
            resolver::{BackendRequest, BackendResolver, SelectError},
            session::SessionObserver,
        },
        settings::{BackendPreference, ConfigStore, FilePreferences, MemoryPreferences},
    };
}
