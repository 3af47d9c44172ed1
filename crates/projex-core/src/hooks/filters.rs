use std::sync::Arc;

use super::names;
use super::{ActionHook, FilterHook, HookError, HookRegistry};
use crate::model::ProjectRecord;

/// Shared, read-only handle to a bootstrapped [`HookRegistry`].
///
/// Cloning is cheap; every component that customizes behaviour through
/// hooks holds one of these instead of reaching for global state.
#[derive(Clone, Debug, Default)]
pub struct FilterPipeline {
    registry: Arc<HookRegistry>,
}

impl FilterPipeline {
    /// Freeze `registry` and wrap it for sharing.
    #[must_use]
    pub fn new(registry: HookRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Apply the named filter to `value`, passing `context` to every
    /// callback. Direct pass-through to [`HookRegistry::run`].
    ///
    /// # Errors
    ///
    /// Propagates the first callback error unchanged, or a type mismatch.
    pub fn apply_filters<V, C>(
        &self,
        hook: FilterHook<V, C>,
        value: V,
        context: &C,
    ) -> Result<V, HookError>
    where
        V: 'static,
        C: ?Sized + 'static,
    {
        self.registry.run(hook, value, context)
    }

    /// Notify every callback registered on the action `hook`.
    ///
    /// # Errors
    ///
    /// Propagates the first callback error unchanged, or a type mismatch.
    pub fn do_actions<C>(&self, hook: ActionHook<C>, context: &C) -> Result<(), HookError>
    where
        C: ?Sized + 'static,
    {
        self.registry.do_actions(hook, context)
    }

    /// Normalize a raw project number through `project_project_number`.
    /// A missing number enters the chain as an empty string.
    ///
    /// # Errors
    ///
    /// Propagates hook errors.
    pub fn project_number(&self, raw: Option<&str>) -> Result<String, HookError> {
        self.apply_filters(
            names::PROJECT_PROJECT_NUMBER,
            raw.unwrap_or_default().to_string(),
            &(),
        )
    }

    /// Normalize a raw install number through `project_install_number`.
    ///
    /// # Errors
    ///
    /// Propagates hook errors.
    pub fn install_number(&self, raw: Option<&str>) -> Result<String, HookError> {
        self.apply_filters(
            names::PROJECT_INSTALL_NUMBER,
            raw.unwrap_or_default().to_string(),
            &(),
        )
    }

    /// Run `project_is_child` for `project`, seeded with `has_parent`.
    ///
    /// # Errors
    ///
    /// Propagates hook errors.
    pub fn is_child(&self, has_parent: bool, project: &ProjectRecord) -> Result<bool, HookError> {
        self.apply_filters(names::PROJECT_IS_CHILD, has_parent, project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::DEFAULT_PRIORITY;

    #[test]
    fn empty_pipeline_passes_values_through() {
        let filters = FilterPipeline::default();
        assert_eq!(filters.project_number(Some(" P-1 ")).unwrap(), " P-1 ");
        assert_eq!(filters.install_number(None).unwrap(), "");
        assert!(filters.is_child(true, &ProjectRecord::new("1", "P-1")).unwrap());
    }

    #[test]
    fn clones_share_one_registry() {
        let mut registry = HookRegistry::new();
        registry
            .add_filter(names::PROJECT_PROJECT_NUMBER, DEFAULT_PRIORITY, |v: String, _: &()| {
                Ok(v.to_uppercase())
            })
            .unwrap();
        let filters = FilterPipeline::new(registry);
        let clone = filters.clone();

        assert_eq!(clone.project_number(Some("p-7")).unwrap(), "P-7");
        assert!(std::ptr::eq(filters.registry(), clone.registry()));
    }
}
