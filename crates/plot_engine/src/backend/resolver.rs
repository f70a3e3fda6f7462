//! # Toolkit Resolver
//!
//! The backend-selection state machine. A resolver owns the single "currently
//! active backend" slot for the process, fills it on demand from an explicit
//! request, the configured default, or environment auto-detection, and
//! refuses switches that conflict with an already-running interactive
//! framework.
//!
//! ## Architecture
//!
//! The resolver is an explicitly owned context object: the top-level
//! controller that initializes the rendering subsystem constructs one and
//! keeps it for the life of the process. All collaborators come in through
//! narrow trait seams, so the resolver itself never loads a toolkit or pumps
//! an event loop.
//!
//! ## Atomicity
//!
//! A selection either fully succeeds (state replaced, config store updated,
//! session notified) or fully fails with the previous state, store contents,
//! and observer untouched. There is no partial-state recovery because no
//! partial state is ever written.

use std::sync::Arc;
use thiserror::Error;

use crate::backend::handle::{synthesized_key, BackendHandle};
use crate::backend::policy::AutoSelectPolicy;
use crate::backend::probe::FrameworkProbe;
use crate::backend::registry::ToolkitRegistry;
use crate::backend::session::SessionObserver;
use crate::settings::{BackendPreference, ConfigStore};

/// Errors produced while selecting a rendering backend
#[derive(Debug, Error)]
pub enum SelectError {
    /// The toolkit's native dependency is missing; auto-detection treats this
    /// as "try the next candidate"
    #[error("backend '{backend}' is unavailable: {reason}")]
    Unavailable {
        /// Requested backend name
        backend: String,
        /// Why the toolkit could not be loaded
        reason: String,
    },

    /// A running event-loop framework conflicts with the toolkit's
    /// requirement; never retried, never downgraded
    #[error(
        "cannot load backend '{backend}' which requires the '{required}' \
         interactive framework, as '{running}' is currently running"
    )]
    Incompatible {
        /// Requested backend name
        backend: String,
        /// Framework the backend needs to pump events
        required: String,
        /// Framework currently owning the process event loop
        running: String,
    },

    /// Unclassified toolkit load failure, passed through verbatim
    #[error("backend '{backend}' failed to load: {source}")]
    Backend {
        /// Requested backend name
        backend: String,
        /// Underlying load error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// An explicit backend request: a registered name, or a ready-made handle
#[derive(Debug, Clone)]
pub enum BackendRequest {
    /// Resolve this name through the registry (case-insensitive)
    Named(String),
    /// Use this handle directly, bypassing the registry
    Handle(Arc<BackendHandle>),
}

impl From<&str> for BackendRequest {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for BackendRequest {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<BackendHandle>> for BackendRequest {
    fn from(handle: Arc<BackendHandle>) -> Self {
        Self::Handle(handle)
    }
}

/// Owns backend selection for one process.
///
/// See the module docs for the selection contract; the short version is that
/// [`current`](Self::current) lazily selects using the configured default and
/// [`select`](Self::select) performs one explicit selection.
pub struct BackendResolver {
    registry: Box<dyn ToolkitRegistry>,
    probe: Box<dyn FrameworkProbe>,
    store: Box<dyn ConfigStore>,
    session: Option<Box<dyn SessionObserver>>,
    policy: AutoSelectPolicy,
    active: Option<Arc<BackendHandle>>,
}

impl BackendResolver {
    /// Create a resolver with the default auto-detection policy and no
    /// session integration
    pub fn new(
        registry: Box<dyn ToolkitRegistry>,
        probe: Box<dyn FrameworkProbe>,
        store: Box<dyn ConfigStore>,
    ) -> Self {
        Self {
            registry,
            probe,
            store,
            session: None,
            policy: AutoSelectPolicy::default(),
            active: None,
        }
    }

    /// Replace the auto-detection policy
    #[must_use]
    pub fn with_policy(mut self, policy: AutoSelectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach an interactive-session observer, notified after each committed
    /// selection
    #[must_use]
    pub fn with_session_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.session = Some(observer);
        self
    }

    /// The active backend without triggering selection
    pub fn active_backend(&self) -> Option<&Arc<BackendHandle>> {
        self.active.as_ref()
    }

    /// Get the currently active backend, selecting one if needed.
    ///
    /// Idempotent after the first call: repeated calls without an intervening
    /// [`select`](Self::select) return the identical handle.
    ///
    /// # Errors
    /// Whatever the underlying selection reports; see
    /// [`select`](Self::select).
    pub fn current(&mut self) -> Result<Arc<BackendHandle>, SelectError> {
        if let Some(handle) = &self.active {
            return Ok(handle.clone());
        }
        self.select(None)
    }

    /// Select the backend to use.
    ///
    /// Names are matched case-insensitively. Switching between toolkits is
    /// possible only while no event loop for another interactive framework is
    /// running; switching to and from framework-agnostic backends is always
    /// possible.
    ///
    /// With no request, the configured default decides; a configured auto
    /// sentinel triggers auto-detection against the running-framework probe
    /// and the resolver's policy table.
    ///
    /// # Errors
    /// [`SelectError::Unavailable`] when the requested toolkit's dependency
    /// is missing, [`SelectError::Incompatible`] when a running framework
    /// conflicts with the toolkit's requirement, or a passthrough
    /// [`SelectError::Backend`] load failure. On error the previously active
    /// backend, the config store, and the session observer are untouched.
    pub fn select(
        &mut self,
        requested: Option<BackendRequest>,
    ) -> Result<Arc<BackendHandle>, SelectError> {
        let request = match requested {
            Some(request) => request,
            None => match self.store.default_backend_name() {
                BackendPreference::Auto => return self.auto_select(),
                BackendPreference::Named(name) => BackendRequest::Named(name),
            },
        };
        self.select_request(request)
    }

    /// Resolve one concrete request and commit it
    fn select_request(
        &mut self,
        request: BackendRequest,
    ) -> Result<Arc<BackendHandle>, SelectError> {
        let (handle, persisted_key) = match request {
            BackendRequest::Named(name) => {
                let name = name.to_ascii_lowercase();
                let handle = self.registry.resolve(&name)?;
                (handle, name)
            }
            BackendRequest::Handle(handle) => {
                let key = synthesized_key(&handle);
                (handle, key)
            }
        };

        if let (Some(required), Some(running)) = (
            handle.required_framework(),
            self.probe.running_framework(),
        ) {
            if required != running {
                return Err(SelectError::Incompatible {
                    backend: persisted_key,
                    required: required.to_owned(),
                    running,
                });
            }
        }

        log::debug!(
            "loaded backend {} version {}",
            handle.name(),
            handle.version()
        );

        // Commit: nothing above this point has mutated any state
        self.store.set_backend_name(&persisted_key, &persisted_key);
        self.active = Some(handle.clone());
        if let Some(session) = self.session.as_mut() {
            session.notify_active_framework(handle.required_framework());
        }
        Ok(handle)
    }

    /// Infer a backend from the environment.
    ///
    /// The best guess for the running framework is tried first, then the
    /// policy's fixed fallbacks; unavailable candidates are skipped, anything
    /// else fails the whole pass. Selecting the last resort is expected to
    /// always succeed, so its errors escape uncaught.
    fn auto_select(&mut self) -> Result<Arc<BackendHandle>, SelectError> {
        let running = self.probe.running_framework();
        for candidate in self.policy.candidates(running.as_deref()) {
            match self.select_request(BackendRequest::Named(candidate)) {
                Err(SelectError::Unavailable { backend, reason }) => {
                    log::debug!("skipping unavailable backend {backend}: {reason}");
                }
                result => return result,
            }
        }

        let last_resort = self.policy.last_resort.clone();
        self.select_request(BackendRequest::Named(last_resort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::handle::{Canvas, WindowManager};
    use crate::backend::probe::NoRunningFramework;
    use crate::settings::MemoryPreferences;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn start_event_loop(&mut self, _timeout: Duration) {}
    }

    struct NullManager;

    impl WindowManager for NullManager {
        fn show(&mut self) {}
        fn destroy(&mut self) {}
    }

    fn handle(name: &str) -> Arc<BackendHandle> {
        Arc::new(BackendHandle::new(
            name,
            "1.0-test",
            || Box::new(NullCanvas),
            || Box::new(NullManager),
        ))
    }

    fn gui_handle(name: &str, framework: &str) -> Arc<BackendHandle> {
        let bare = BackendHandle::new(
            name,
            "1.0-test",
            || Box::new(NullCanvas),
            || Box::new(NullManager),
        );
        Arc::new(bare.with_required_framework(framework))
    }

    /// Registry double recording every resolution attempt in order
    struct TestRegistry {
        handles: HashMap<String, Arc<BackendHandle>>,
        probed: Rc<RefCell<Vec<String>>>,
    }

    impl TestRegistry {
        fn new(handles: &[Arc<BackendHandle>]) -> (Self, Rc<RefCell<Vec<String>>>) {
            let probed = Rc::new(RefCell::new(Vec::new()));
            let registry = Self {
                handles: handles
                    .iter()
                    .map(|h| (h.name().to_owned(), h.clone()))
                    .collect(),
                probed: probed.clone(),
            };
            (registry, probed)
        }
    }

    impl ToolkitRegistry for TestRegistry {
        fn resolve(&self, name: &str) -> Result<Arc<BackendHandle>, SelectError> {
            self.probed.borrow_mut().push(name.to_owned());
            self.handles
                .get(name)
                .cloned()
                .ok_or_else(|| SelectError::Unavailable {
                    backend: name.to_owned(),
                    reason: "native dependency missing".to_owned(),
                })
        }
    }

    struct FixedProbe(&'static str);

    impl FrameworkProbe for FixedProbe {
        fn running_framework(&self) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    /// Store double sharing its state with the test body
    struct SharedStore(Rc<RefCell<MemoryPreferences>>);

    impl ConfigStore for SharedStore {
        fn default_backend_name(&self) -> BackendPreference {
            self.0.borrow().default_backend_name()
        }

        fn set_backend_name(&mut self, live: &str, default: &str) {
            self.0.borrow_mut().set_backend_name(live, default);
        }
    }

    /// Observer double collecting every notification
    struct SharedObserver(Rc<RefCell<Vec<Option<String>>>>);

    impl SessionObserver for SharedObserver {
        fn notify_active_framework(&mut self, framework: Option<&str>) {
            self.0.borrow_mut().push(framework.map(str::to_owned));
        }
    }

    struct Fixture {
        resolver: BackendResolver,
        probed: Rc<RefCell<Vec<String>>>,
        store: Rc<RefCell<MemoryPreferences>>,
    }

    fn fixture(
        handles: &[Arc<BackendHandle>],
        running: Option<&'static str>,
        default: BackendPreference,
    ) -> Fixture {
        let (registry, probed) = TestRegistry::new(handles);
        let probe: Box<dyn FrameworkProbe> = match running {
            Some(framework) => Box::new(FixedProbe(framework)),
            None => Box::new(NoRunningFramework),
        };
        let store = Rc::new(RefCell::new(MemoryPreferences::new(default)));
        let resolver = BackendResolver::new(
            Box::new(registry),
            probe,
            Box::new(SharedStore(store.clone())),
        );
        Fixture {
            resolver,
            probed,
            store,
        }
    }

    fn named(name: &str) -> BackendPreference {
        BackendPreference::Named(name.to_owned())
    }

    #[test]
    fn test_current_memoizes_selection() {
        let mut fx = fixture(&[handle("agg")], None, named("agg"));

        let first = fx.resolver.current().unwrap();
        let second = fx.resolver.current().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*fx.probed.borrow(), vec!["agg"]);
    }

    #[test]
    fn test_select_explicit_handle_object() {
        let mut fx = fixture(&[], None, BackendPreference::Auto);
        let supplied = gui_handle("custom", "qt");

        let selected = fx.resolver.select(Some(supplied.clone().into())).unwrap();
        let current = fx.resolver.current().unwrap();

        assert!(Arc::ptr_eq(&selected, &supplied));
        assert!(Arc::ptr_eq(&current, &supplied));
        // The registry is never consulted for a direct handle
        assert!(fx.probed.borrow().is_empty());
        // The persisted key is synthesized, not a registry name
        let store = fx.store.borrow();
        match store.live() {
            BackendPreference::Named(key) => assert!(key.starts_with("handle://")),
            other => panic!("expected a synthesized key, got {other:?}"),
        }
    }

    #[test]
    fn test_incompatible_switch_is_refused() {
        let mut fx = fixture(&[gui_handle("gtk3agg", "gtk3")], Some("qt"), named("agg"));

        let err = fx.resolver.select(Some("gtk3agg".into())).unwrap_err();
        match err {
            SelectError::Incompatible {
                backend,
                required,
                running,
            } => {
                assert_eq!(backend, "gtk3agg");
                assert_eq!(required, "gtk3");
                assert_eq!(running, "qt");
            }
            other => panic!("expected Incompatible, got {other:?}"),
        }

        // Nothing committed: no active backend, store still at its default
        assert!(fx.resolver.active_backend().is_none());
        assert_eq!(*fx.store.borrow().live(), named("agg"));
    }

    #[test]
    fn test_matching_framework_is_accepted() {
        let mut fx = fixture(&[gui_handle("qtagg", "qt")], Some("qt"), named("qtagg"));
        let selected = fx.resolver.current().unwrap();
        assert_eq!(selected.name(), "qtagg");
    }

    #[test]
    fn test_any_requirement_passes_without_running_framework() {
        let mut fx = fixture(&[gui_handle("qtagg", "qt")], None, named("qtagg"));
        assert!(fx.resolver.select(None).is_ok());
    }

    #[test]
    fn test_failed_select_retains_previous_backend() {
        let mut fx = fixture(&[handle("agg")], None, named("agg"));
        let active = fx.resolver.current().unwrap();

        let err = fx.resolver.select(Some("qtagg".into())).unwrap_err();
        assert!(matches!(err, SelectError::Unavailable { .. }));

        let still_active = fx.resolver.current().unwrap();
        assert!(Arc::ptr_eq(&active, &still_active));
        assert_eq!(*fx.store.borrow().live(), named("agg"));
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let mut fx = fixture(&[handle("tkagg")], None, BackendPreference::Auto);

        let selected = fx.resolver.select(Some("TkAgg".into())).unwrap();
        assert_eq!(selected.name(), "tkagg");
        assert_eq!(*fx.store.borrow().live(), named("tkagg"));
    }

    #[test]
    fn test_auto_prefers_running_framework_mapping() {
        let mut fx = fixture(
            &[handle("tkagg"), handle("macosx")],
            Some("tk"),
            BackendPreference::Auto,
        );

        let selected = fx.resolver.select(None).unwrap();

        assert_eq!(selected.name(), "tkagg");
        // The best guess resolves first; no other candidate is probed
        assert_eq!(*fx.probed.borrow(), vec!["tkagg"]);
    }

    #[test]
    fn test_auto_walks_fallbacks_in_order() {
        let mut fx = fixture(&[handle("tkagg")], None, BackendPreference::Auto);

        let selected = fx.resolver.select(None).unwrap();

        assert_eq!(selected.name(), "tkagg");
        assert_eq!(
            *fx.probed.borrow(),
            vec!["macosx", "qt5agg", "gtk3agg", "tkagg"]
        );
    }

    #[test]
    fn test_auto_exhaustion_selects_last_resort() {
        let mut fx = fixture(&[handle("agg")], None, BackendPreference::Auto);

        let selected = fx.resolver.select(None).unwrap();

        assert_eq!(selected.name(), "agg");
        assert_eq!(
            *fx.probed.borrow(),
            vec!["macosx", "qt5agg", "gtk3agg", "tkagg", "wxagg", "agg"]
        );
    }

    #[test]
    fn test_auto_propagates_incompatible_immediately() {
        // The first fallback resolves but needs a framework other than the
        // running one; auto-detection must stop there, not keep probing.
        let mut fx = fixture(
            &[gui_handle("macosx", "macosx"), handle("tkagg")],
            Some("sdl"),
            BackendPreference::Auto,
        );

        let err = fx.resolver.select(None).unwrap_err();
        assert!(matches!(err, SelectError::Incompatible { .. }));
        assert_eq!(*fx.probed.borrow(), vec!["macosx"]);
        assert!(fx.resolver.active_backend().is_none());
    }

    #[test]
    fn test_configured_name_is_used_without_auto() {
        let mut fx = fixture(&[handle("agg"), handle("tkagg")], None, named("tkagg"));

        let selected = fx.resolver.select(None).unwrap();

        assert_eq!(selected.name(), "tkagg");
        assert_eq!(*fx.probed.borrow(), vec!["tkagg"]);
    }

    #[test]
    fn test_observer_notified_after_commit() {
        let notifications = Rc::new(RefCell::new(Vec::new()));
        let (registry, _probed) = TestRegistry::new(&[handle("agg")]);
        let store = Rc::new(RefCell::new(MemoryPreferences::default()));
        let mut resolver = BackendResolver::new(
            Box::new(registry),
            Box::new(NoRunningFramework),
            Box::new(SharedStore(store)),
        )
        .with_session_observer(Box::new(SharedObserver(notifications.clone())));

        resolver.select(Some("agg".into())).unwrap();
        resolver
            .select(Some(gui_handle("custom", "qt").into()))
            .unwrap();

        assert_eq!(
            *notifications.borrow(),
            vec![None, Some("qt".to_owned())]
        );
    }

    #[test]
    fn test_auto_does_not_catch_unclassified_failures() {
        let mut registry = crate::backend::registry::StaticRegistry::new();
        registry.register("macosx", || {
            Err(SelectError::Backend {
                backend: "macosx".to_owned(),
                source: "corrupt toolkit installation".into(),
            })
        });
        let store = Rc::new(RefCell::new(MemoryPreferences::default()));
        let mut resolver = BackendResolver::new(
            Box::new(registry),
            Box::new(NoRunningFramework),
            Box::new(SharedStore(store)),
        );

        let err = resolver.select(None).unwrap_err();
        assert!(matches!(err, SelectError::Backend { .. }));
        assert!(resolver.active_backend().is_none());
    }

    #[test]
    fn test_observer_untouched_on_failure() {
        let notifications = Rc::new(RefCell::new(Vec::new()));
        let (registry, _probed) = TestRegistry::new(&[]);
        let store = Rc::new(RefCell::new(MemoryPreferences::default()));
        let mut resolver = BackendResolver::new(
            Box::new(registry),
            Box::new(NoRunningFramework),
            Box::new(SharedStore(store)),
        )
        .with_session_observer(Box::new(SharedObserver(notifications.clone())));

        assert!(resolver.select(Some("qtagg".into())).is_err());
        assert!(notifications.borrow().is_empty());
    }
}
