//! # Auto-Detection Policy
//!
//! The data that steers backend auto-detection: which backend best matches a
//! running interactive framework, which general-purpose backends to try when
//! there is no match, and the guaranteed non-interactive last resort.
//!
//! The ordering and exclusions here are pragmatic choices, not derived ones,
//! so the whole table is a plain serializable value hosts can override from
//! their own configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Priority table and fallback order for backend auto-detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSelectPolicy {
    /// Best-matching backend per running interactive framework
    pub framework_map: BTreeMap<String, String>,
    /// General-purpose candidates tried, in order, after the best guess
    pub fallback_order: Vec<String>,
    /// Non-interactive backend selected when every candidate is unavailable
    pub last_resort: String,
}

impl AutoSelectPolicy {
    /// Best-matching backend for a running framework, if the table maps it
    pub fn best_guess(&self, framework: &str) -> Option<&str> {
        self.framework_map.get(framework).map(String::as_str)
    }

    /// Candidate list for one auto-detection pass: the best guess for the
    /// running framework (when there is one) followed by the fixed fallbacks.
    pub fn candidates(&self, running_framework: Option<&str>) -> Vec<String> {
        let mut candidates = Vec::with_capacity(self.fallback_order.len() + 1);
        if let Some(best) = running_framework.and_then(|fw| self.best_guess(fw)) {
            candidates.push(best.to_owned());
        }
        candidates.extend(self.fallback_order.iter().cloned());
        candidates
    }
}

impl Default for AutoSelectPolicy {
    fn default() -> Self {
        let framework_map = [
            ("qt", "qtagg"),
            ("gtk3", "gtk3agg"),
            ("gtk4", "gtk4agg"),
            ("wx", "wxagg"),
            ("tk", "tkagg"),
            ("macosx", "macosx"),
            ("headless", "agg"),
        ]
        .into_iter()
        .map(|(framework, backend)| (framework.to_owned(), backend.to_owned()))
        .collect();

        // The cairo-family backends stay out of the fallbacks: each carries an
        // extra native dependency over the agg-based ones and renders worse.
        let fallback_order = ["macosx", "qt5agg", "gtk3agg", "tkagg", "wxagg"]
            .into_iter()
            .map(str::to_owned)
            .collect();

        Self {
            framework_map,
            fallback_order,
            last_resort: "agg".to_owned(),
        }
    }
}
