use crate::control::{Profiles, parse_control};
use crate::error::LoggerError;
use crate::level::LogLevel;
use crate::tree::{Tree, admits};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::subscriber::Interest;
use tracing::{Metadata, debug};
use tracing_subscriber::layer::{Context, Filter};

/// Crate-name prefix stripped from tracing targets before the trie lookup.
const TARGET_PREFIX: &str = "mgraph_";

#[derive(Debug, Default)]
struct Selection {
    control: String,
    tree: Arc<Tree>,
}

/// Shared handle to the active log selection.
///
/// Created once at startup and handed to [`crate::LoggerBuilder::selection`] and anything
/// that wants to query or change the selection at runtime. Clones share the same state;
/// [`LogContext::reconfigure`] swaps in a fully parsed trie so concurrent lookups see
/// either the old or the new selection.
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    inner: Arc<RwLock<Selection>>,
}

impl LogContext {
    /// An empty selection: nothing is enabled until configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from a control string.
    ///
    /// # Errors
    /// See [`parse_control`].
    pub fn from_control(
        control: &str,
        profiles: &Profiles,
        root_level: LogLevel,
    ) -> Result<Self, LoggerError> {
        let ctx = Self::new();
        ctx.reconfigure(control, profiles, root_level)?;
        Ok(ctx)
    }

    /// Replaces the selection. On error the previous selection stays active.
    ///
    /// # Errors
    /// See [`parse_control`].
    pub fn reconfigure(
        &self,
        control: &str,
        profiles: &Profiles,
        root_level: LogLevel,
    ) -> Result<(), LoggerError> {
        let tree = parse_control(control, profiles, root_level)?;
        {
            let mut selection = self.inner.write();
            selection.control = control.to_owned();
            selection.tree = Arc::new(tree);
        }
        debug!(control, "Log selection reconfigured");
        Ok(())
    }

    /// Restores the empty selection.
    pub fn reset(&self) {
        *self.inner.write() = Selection::default();
    }

    /// The control string that produced the current selection.
    #[must_use]
    pub fn control(&self) -> String {
        self.inner.read().control.clone()
    }

    /// A snapshot of the current trie.
    #[must_use]
    pub fn tree(&self) -> Arc<Tree> {
        Arc::clone(&self.inner.read().tree)
    }

    /// Whether an event from tracing `target` at `level` passes the selection.
    #[must_use]
    pub fn is_enabled(&self, target: &str, level: LogLevel) -> bool {
        let tree = self.tree();
        admits(tree.node_for(target_segments(target)), level)
    }

    /// A per-layer filter backed by this context.
    #[must_use]
    pub fn filter(&self) -> SelectionFilter {
        SelectionFilter { context: self.clone() }
    }
}

/// Maps `mgraph_core::serializer::json_generator` onto `core/serializer/json_generator`.
#[must_use]
pub fn target_path(target: &str) -> String {
    target_segments(target).collect::<Vec<_>>().join("/")
}

fn target_segments(target: &str) -> impl Iterator<Item = &str> {
    let target = target.strip_prefix(TARGET_PREFIX).unwrap_or(target);
    target.split("::").filter(|s| !s.is_empty())
}

/// [`Filter`] consulting a [`LogContext`] for every event and span.
#[derive(Debug, Clone)]
pub struct SelectionFilter {
    context: LogContext,
}

impl<S> Filter<S> for SelectionFilter {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        self.context.is_enabled(meta.target(), LogLevel::from(*meta.level()))
    }

    // The selection can change at runtime, so no callsite verdict is cached.
    fn callsite_enabled(&self, _meta: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_map_to_paths() {
        assert_eq!(
            target_path("mgraph_core::serializer::json_generator"),
            "core/serializer/json_generator"
        );
        assert_eq!(target_path("mgraph_introspect"), "introspect");
        assert_eq!(target_path("hyper::client"), "hyper/client");
    }

    #[test]
    fn empty_context_enables_nothing() {
        let ctx = LogContext::new();
        assert!(!ctx.is_enabled("mgraph_core::factory", LogLevel::Error));
    }

    #[test]
    fn reconfigure_swaps_selection() -> Result<(), LoggerError> {
        let ctx = LogContext::from_control("mgraph:core", &Profiles::default(), LogLevel::Info)?;
        let shared = ctx.clone();
        assert!(shared.is_enabled("mgraph_core::factory", LogLevel::Info));
        assert!(!shared.is_enabled("mgraph_introspect::schema", LogLevel::Info));

        ctx.reconfigure("-mgraph:core mgraph:introspect", &Profiles::default(), LogLevel::Warn)?;
        assert!(!shared.is_enabled("mgraph_core::factory", LogLevel::Error));
        assert!(shared.is_enabled("mgraph_introspect::schema", LogLevel::Warn));
        assert!(!shared.is_enabled("mgraph_introspect::schema", LogLevel::Info));
        assert_eq!(shared.control(), "-mgraph:core mgraph:introspect");
        Ok(())
    }

    #[test]
    fn failed_reconfigure_keeps_previous_selection() -> Result<(), LoggerError> {
        let ctx = LogContext::from_control("*", &Profiles::default(), LogLevel::Info)?;
        assert!(ctx.reconfigure("@nope", &Profiles::default(), LogLevel::Info).is_err());
        assert!(ctx.is_enabled("anything", LogLevel::Info));
        assert_eq!(ctx.control(), "*");

        ctx.reset();
        assert!(!ctx.is_enabled("anything", LogLevel::Info));
        assert!(ctx.control().is_empty());
        Ok(())
    }
}
