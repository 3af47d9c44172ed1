//! Priority-ordered filter and action registry.
//!
//! Every hook name owns a set of priority buckets. Buckets run in ascending
//! priority order; callbacks inside a bucket run in registration order.
//!
//! - Filters transform: the value returned by one callback is the value
//!   handed to the next, and every callback sees the same context reference.
//! - Actions observe: each callback receives the same context reference and
//!   returns nothing but success or failure.
//!
//! Filters and actions live in separate namespaces, so one name may be used
//! for both.
//!
//! # Typing
//!
//! Hooks are addressed through [`FilterHook`] keys that carry the hook name
//! together with its value type `V` and context type `C`, and through
//! [`ActionHook`] keys that carry only `C`. The registry stores
//! callbacks type-erased per name, so reusing a name with a different
//! `V`/`C` pair is reported as [`HookError::TypeMismatch`] instead of being
//! silently ignored.
//!
//! # Failure
//!
//! The registry is a dispatcher only. A callback error stops the chain and
//! is returned to the caller of [`HookRegistry::run`]; nothing is caught,
//! skipped, or logged on the caller's behalf.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

/// Priority used when a caller has no ordering preference.
pub const DEFAULT_PRIORITY: i32 = 10;

/// A boxed filter callback: receives the current value and the shared
/// context, returns the next value.
pub type FilterFn<V, C> = dyn Fn(V, &C) -> anyhow::Result<V> + Send + Sync;

/// A boxed action callback: observes the shared context.
pub type ActionFn<C> = dyn Fn(&C) -> anyhow::Result<()> + Send + Sync;

/// Errors raised while registering or running filters.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A registered callback returned an error. The chain stops here.
    #[error("hook '{hook}' callback failed: {source}")]
    Callback {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The hook name is already bound to a different value/context type.
    #[error("hook '{hook}' is registered with a different value or context type")]
    TypeMismatch { hook: &'static str },
}

/// Typed key for a named filter hook.
///
/// `V` is the value threaded through the chain, `C` the context every
/// callback receives by reference. `C` may be unsized (e.g. `str`).
pub struct FilterHook<V, C: ?Sized = ()> {
    name: &'static str,
    _types: PhantomData<fn(V, &C) -> V>,
}

impl<V, C: ?Sized> FilterHook<V, C> {
    /// Declare a hook key with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    /// The hook's registry name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<V, C: ?Sized> Clone for FilterHook<V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, C: ?Sized> Copy for FilterHook<V, C> {}

impl<V, C: ?Sized> fmt::Debug for FilterHook<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterHook").field(&self.name).finish()
    }
}

/// Typed key for a named action hook. `C` is the context every callback
/// observes by reference.
pub struct ActionHook<C: ?Sized = ()> {
    name: &'static str,
    _types: PhantomData<fn(&C)>,
}

impl<C: ?Sized> ActionHook<C> {
    /// Declare an action key with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    /// The hook's registry name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<C: ?Sized> Clone for ActionHook<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for ActionHook<C> {}

impl<C: ?Sized> fmt::Debug for ActionHook<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionHook").field(&self.name).finish()
    }
}

/// Callbacks of one hook, bucketed by priority. `F` is the unsized
/// callback type.
struct Buckets<F: ?Sized> {
    by_priority: BTreeMap<i32, Vec<Box<F>>>,
}

impl<F: ?Sized> Buckets<F> {
    fn new() -> Self {
        Self {
            by_priority: BTreeMap::new(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &F> {
        self.by_priority.values().flatten().map(AsRef::as_ref)
    }
}

/// Type-erased `Buckets<_>` plus a callback count readable without
/// knowing the callback type.
struct HookEntry {
    buckets: Box<dyn Any + Send + Sync>,
    len: usize,
}

impl HookEntry {
    /// Append `callback` at `priority`, checking the stored callback type.
    fn push<F>(
        entries: &mut HashMap<&'static str, Self>,
        name: &'static str,
        priority: i32,
        callback: Box<F>,
    ) -> Result<(), HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let entry = entries.entry(name).or_insert_with(|| Self {
            buckets: Box::new(Buckets::<F>::new()),
            len: 0,
        });

        let buckets = entry
            .buckets
            .downcast_mut::<Buckets<F>>()
            .ok_or(HookError::TypeMismatch { hook: name })?;

        buckets.by_priority.entry(priority).or_default().push(callback);
        entry.len += 1;
        Ok(())
    }

    /// The typed buckets under `name`, or `None` when nothing is registered.
    fn get<'a, F>(
        entries: &'a HashMap<&'static str, Self>,
        name: &'static str,
    ) -> Result<Option<&'a Buckets<F>>, HookError>
    where
        F: ?Sized + 'static,
    {
        entries
            .get(name)
            .map(|entry| {
                entry
                    .buckets
                    .downcast_ref::<Buckets<F>>()
                    .ok_or(HookError::TypeMismatch { hook: name })
            })
            .transpose()
    }
}

/// Registry of named filter hooks.
///
/// Built once at application bootstrap (registration takes `&mut self`)
/// and then shared read-only, usually behind a
/// [`FilterPipeline`](super::FilterPipeline).
#[derive(Default)]
pub struct HookRegistry {
    filters: HashMap<&'static str, HookEntry>,
    actions: HashMap<&'static str, HookEntry>,
}

impl HookRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` on `hook` at `priority`.
    ///
    /// The callback is appended after any callbacks already registered at
    /// the same priority. Registering the same callback twice makes it run
    /// twice.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::TypeMismatch`] if the hook name is already bound
    /// to a different value/context type.
    pub fn add_filter<V, C, F>(
        &mut self,
        hook: FilterHook<V, C>,
        priority: i32,
        callback: F,
    ) -> Result<(), HookError>
    where
        V: 'static,
        C: ?Sized + 'static,
        F: Fn(V, &C) -> anyhow::Result<V> + Send + Sync + 'static,
    {
        let callback: Box<FilterFn<V, C>> = Box::new(callback);
        HookEntry::push(&mut self.filters, hook.name(), priority, callback)
    }

    /// Run every callback registered on `hook`, threading `value` through
    /// the chain.
    ///
    /// A hook with no callbacks returns `value` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Callback`] with the first callback error, or
    /// [`HookError::TypeMismatch`] if the hook was registered with other
    /// types.
    pub fn run<V, C>(&self, hook: FilterHook<V, C>, value: V, context: &C) -> Result<V, HookError>
    where
        V: 'static,
        C: ?Sized + 'static,
    {
        let Some(buckets) = HookEntry::get::<FilterFn<V, C>>(&self.filters, hook.name())? else {
            return Ok(value);
        };

        buckets.iter().try_fold(value, |current, callback| {
            callback(current, context).map_err(|source| HookError::Callback {
                hook: hook.name(),
                source,
            })
        })
    }

    /// Returns `true` if at least one callback is registered under `name`.
    #[must_use]
    pub fn has_filter(&self, name: &str) -> bool {
        self.filter_count(name) > 0
    }

    /// Number of callbacks registered under `name`, across all priorities.
    #[must_use]
    pub fn filter_count(&self, name: &str) -> usize {
        self.filters.get(name).map_or(0, |entry| entry.len)
    }

    /// Drop every callback registered under `name`.
    ///
    /// Returns `true` if the hook existed. The name may afterwards be reused
    /// with different types.
    pub fn remove_all_filters(&mut self, name: &str) -> bool {
        self.filters.remove(name).is_some()
    }

    /// Register `callback` on the action `hook` at `priority`. Ordering
    /// follows the same rules as filters.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::TypeMismatch`] if the action name is already
    /// bound to a different context type.
    pub fn add_action<C, F>(
        &mut self,
        hook: ActionHook<C>,
        priority: i32,
        callback: F,
    ) -> Result<(), HookError>
    where
        C: ?Sized + 'static,
        F: Fn(&C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let callback: Box<ActionFn<C>> = Box::new(callback);
        HookEntry::push(&mut self.actions, hook.name(), priority, callback)
    }

    /// Call every callback registered on the action `hook` with `context`.
    /// An action with no callbacks does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Callback`] with the first callback error, or
    /// [`HookError::TypeMismatch`] if the action was registered with
    /// another context type.
    pub fn do_actions<C>(&self, hook: ActionHook<C>, context: &C) -> Result<(), HookError>
    where
        C: ?Sized + 'static,
    {
        let Some(buckets) = HookEntry::get::<ActionFn<C>>(&self.actions, hook.name())? else {
            return Ok(());
        };

        buckets.iter().try_for_each(|callback| {
            callback(context).map_err(|source| HookError::Callback {
                hook: hook.name(),
                source,
            })
        })
    }

    /// Returns `true` if at least one action callback is registered under
    /// `name`.
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.get(name).is_some_and(|entry| entry.len > 0)
    }

    /// Drop every action callback registered under `name`.
    pub fn remove_all_actions(&mut self, name: &str) -> bool {
        self.actions.remove(name).is_some()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filters: Vec<&&'static str> = self.filters.keys().collect();
        filters.sort();
        let mut actions: Vec<&&'static str> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("HookRegistry")
            .field("filters", &filters)
            .field("actions", &actions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const NUMBERS: FilterHook<i64> = FilterHook::new("numbers");
    const TRACE: FilterHook<Vec<&'static str>> = FilterHook::new("trace");

    #[test]
    fn unregistered_hook_is_identity() {
        let registry = HookRegistry::new();
        assert_eq!(registry.run(NUMBERS, 42, &()).unwrap(), 42);
        assert!(!registry.has_filter("numbers"));
    }

    #[test]
    fn callbacks_thread_the_value() {
        let mut registry = HookRegistry::new();
        registry
            .add_filter(NUMBERS, DEFAULT_PRIORITY, |v, _: &()| Ok(v + 1))
            .unwrap();
        registry
            .add_filter(NUMBERS, DEFAULT_PRIORITY, |v, _: &()| Ok(v * 2))
            .unwrap();

        assert_eq!(registry.run(NUMBERS, 3, &()).unwrap(), 8);
    }

    #[test]
    fn priorities_run_ascending_and_stable_within_bucket() {
        let mut registry = HookRegistry::new();
        for (priority, marker) in [(5, "5a"), (1, "1"), (5, "5b"), (10, "10")] {
            registry
                .add_filter(TRACE, priority, move |mut v: Vec<&'static str>, _: &()| {
                    v.push(marker);
                    Ok(v)
                })
                .unwrap();
        }

        let order = registry.run(TRACE, Vec::new(), &()).unwrap();
        assert_eq!(order, vec!["1", "5a", "5b", "10"]);
    }

    #[test]
    fn negative_priority_runs_before_default() {
        let mut registry = HookRegistry::new();
        registry
            .add_filter(NUMBERS, DEFAULT_PRIORITY, |v, _: &()| Ok(v * 10))
            .unwrap();
        registry.add_filter(NUMBERS, -1, |v, _: &()| Ok(v + 1)).unwrap();

        assert_eq!(registry.run(NUMBERS, 1, &()).unwrap(), 20);
    }

    #[test]
    fn every_callback_sees_the_original_context() {
        const SUFFIX: FilterHook<String, str> = FilterHook::new("suffix");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut registry = HookRegistry::new();
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            registry
                .add_filter(SUFFIX, DEFAULT_PRIORITY, move |v: String, ctx: &str| {
                    seen.lock().unwrap().push(ctx.to_string());
                    Ok(format!("{v}+{ctx}"))
                })
                .unwrap();
        }

        let out = registry.run(SUFFIX, "base".to_string(), "x").unwrap();
        assert_eq!(out, "base+x+x");
        assert_eq!(*seen.lock().unwrap(), vec!["x", "x"]);
    }

    #[test]
    fn callback_error_stops_the_chain() {
        let calls = Arc::new(Mutex::new(0_u32));
        let mut registry = HookRegistry::new();
        registry
            .add_filter(NUMBERS, 1, |_, _: &()| Err(anyhow::anyhow!("boom")))
            .unwrap();
        {
            let calls = Arc::clone(&calls);
            registry
                .add_filter(NUMBERS, 2, move |v, _: &()| {
                    *calls.lock().unwrap() += 1;
                    Ok(v)
                })
                .unwrap();
        }

        let err = registry.run(NUMBERS, 1, &()).unwrap_err();
        assert!(matches!(err, HookError::Callback { hook: "numbers", .. }));
        assert!(err.to_string().contains("boom"));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn reusing_a_name_with_other_types_is_rejected() {
        const AS_TEXT: FilterHook<String> = FilterHook::new("numbers");
        let mut registry = HookRegistry::new();
        registry
            .add_filter(NUMBERS, DEFAULT_PRIORITY, |v, _: &()| Ok(v))
            .unwrap();

        let err = registry
            .add_filter(AS_TEXT, DEFAULT_PRIORITY, |v, _: &()| Ok(v))
            .unwrap_err();
        assert!(matches!(err, HookError::TypeMismatch { hook: "numbers" }));

        let err = registry.run(AS_TEXT, String::new(), &()).unwrap_err();
        assert!(matches!(err, HookError::TypeMismatch { .. }));
    }

    #[test]
    fn actions_run_in_priority_order_with_shared_context() {
        const OPENED: ActionHook<str> = ActionHook::new("opened");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut registry = HookRegistry::new();
        for (priority, marker) in [(20, "late"), (1, "early"), (20, "later")] {
            let seen = Arc::clone(&seen);
            registry
                .add_action(OPENED, priority, move |ctx: &str| {
                    seen.lock().unwrap().push(format!("{marker}:{ctx}"));
                    Ok(())
                })
                .unwrap();
        }

        registry.do_actions(OPENED, "P-1").unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["early:P-1", "late:P-1", "later:P-1"]
        );
        assert!(registry.has_action("opened"));
        assert!(!registry.has_filter("opened"));
    }

    #[test]
    fn actions_without_callbacks_do_nothing() {
        const IDLE: ActionHook = ActionHook::new("idle");
        let registry = HookRegistry::new();
        registry.do_actions(IDLE, &()).unwrap();
        assert!(!registry.has_action("idle"));
    }

    #[test]
    fn action_error_stops_later_callbacks() {
        const SAVE: ActionHook = ActionHook::new("save");
        let calls = Arc::new(Mutex::new(0_u32));
        let mut registry = HookRegistry::new();
        registry
            .add_action(SAVE, 1, |_: &()| Err(anyhow::anyhow!("disk full")))
            .unwrap();
        {
            let calls = Arc::clone(&calls);
            registry
                .add_action(SAVE, 2, move |_: &()| {
                    *calls.lock().unwrap() += 1;
                    Ok(())
                })
                .unwrap();
        }

        let err = registry.do_actions(SAVE, &()).unwrap_err();
        assert!(matches!(err, HookError::Callback { hook: "save", .. }));
        assert_eq!(*calls.lock().unwrap(), 0);

        assert!(registry.remove_all_actions("save"));
        registry.do_actions(SAVE, &()).unwrap();
    }

    #[test]
    fn filter_and_action_names_are_separate() {
        const SHARED_FILTER: FilterHook<i64> = FilterHook::new("shared");
        const SHARED_ACTION: ActionHook<String> = ActionHook::new("shared");
        const OTHER: ActionHook<i64> = ActionHook::new("shared");
        let mut registry = HookRegistry::new();
        registry
            .add_filter(SHARED_FILTER, DEFAULT_PRIORITY, |v, _: &()| Ok(v + 1))
            .unwrap();
        registry
            .add_action(SHARED_ACTION, DEFAULT_PRIORITY, |_: &String| Ok(()))
            .unwrap();

        assert_eq!(registry.run(SHARED_FILTER, 1, &()).unwrap(), 2);
        registry
            .do_actions(SHARED_ACTION, &String::from("x"))
            .unwrap();

        let err = registry.add_action(OTHER, 1, |_: &i64| Ok(())).unwrap_err();
        assert!(matches!(err, HookError::TypeMismatch { hook: "shared" }));
    }

    #[test]
    fn remove_all_filters_restores_identity() {
        let mut registry = HookRegistry::new();
        registry
            .add_filter(NUMBERS, DEFAULT_PRIORITY, |v, _: &()| Ok(v + 100))
            .unwrap();
        assert!(registry.has_filter("numbers"));

        assert!(registry.remove_all_filters("numbers"));
        assert!(!registry.remove_all_filters("numbers"));
        assert_eq!(registry.run(NUMBERS, 7, &()).unwrap(), 7);
    }
}
