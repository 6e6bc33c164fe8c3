//! The hook registry
//!
//! Tracks which callbacks are registered on which hooks and which hooks have
//! fired with which arguments. Callbacks are never invoked: firing a hook only
//! records the arguments so tests can assert on them afterwards.

use crate::callback::{Callback, CallbackId, Validation};
use crate::config::RegistryConfig;
use crate::types::{identical, FiredRecord, HookError, HookKind, HookValue, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Callbacks registered at one priority, keyed by identity
pub type Bucket = BTreeMap<CallbackId, Registration>;

/// All buckets of one hook, ordered by priority
pub type PriorityMap = BTreeMap<i32, Bucket>;

/// A callback registered on a hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The registered callback
    pub callback: Callback,
    /// Number of arguments the callback accepts
    pub accepted_args: u32,
}

/// One map per hook kind
#[derive(Debug, Clone)]
struct KindStore<T> {
    actions: BTreeMap<String, T>,
    filters: BTreeMap<String, T>,
}

impl<T> KindStore<T> {
    fn new() -> Self {
        Self {
            actions: BTreeMap::new(),
            filters: BTreeMap::new(),
        }
    }

    fn get(&self, kind: HookKind) -> &BTreeMap<String, T> {
        match kind {
            HookKind::Action => &self.actions,
            HookKind::Filter => &self.filters,
        }
    }

    fn get_mut(&mut self, kind: HookKind) -> &mut BTreeMap<String, T> {
        match kind {
            HookKind::Action => &mut self.actions,
            HookKind::Filter => &mut self.filters,
        }
    }

    fn clear(&mut self) {
        self.actions.clear();
        self.filters.clear();
    }

    fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.filters.is_empty()
    }
}

/// In-memory registry of hook registrations and firings
#[derive(Debug, Clone)]
pub struct HookRegistry {
    config: RegistryConfig,
    hooks: KindStore<PriorityMap>,
    fired: KindStore<Vec<Vec<HookValue>>>,
}

impl HookRegistry {
    /// Create an empty registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            hooks: KindStore::new(),
            fired: KindStore::new(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn strict(&self) -> Validation<'_> {
        Validation::Strict(&self.config)
    }

    /// Register `callback` on `hook`.
    ///
    /// Omitted `priority` and `accepted_args` take the configured defaults
    /// (10 and 1). Registering the same callback again at the same priority
    /// overwrites the stored accepted-argument count.
    pub fn register(
        &mut self,
        kind: HookKind,
        hook: &str,
        callback: Callback,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    ) -> Result<()> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "error on adding {}: invalid hook",
                kind
            )));
        }
        if !callback.is_invocable(self.strict()) {
            return Err(HookError::InvalidInput(format!(
                "error on adding {}: given callback {} for the hook {} is not a valid callback",
                kind, callback, hook
            )));
        }

        let priority = priority.unwrap_or(self.config.default_priority);
        let accepted_args = accepted_args.unwrap_or(self.config.default_accepted_args);
        let id = callback.unique_id();

        log::debug!(
            "Adding {} '{}': {} at priority {} ({} args)",
            kind,
            hook,
            callback,
            priority,
            accepted_args
        );

        self.hooks
            .get_mut(kind)
            .entry(hook.to_string())
            .or_default()
            .entry(priority)
            .or_default()
            .insert(
                id,
                Registration {
                    callback,
                    accepted_args,
                },
            );
        Ok(())
    }

    /// Remove `callback` from `hook` at `priority` (default 10).
    ///
    /// Missing hooks, priorities and callbacks are not an error. When
    /// `accepted_args` is given it must match the stored count, otherwise
    /// nothing is removed. Returns whether a registration was removed.
    pub fn unregister(
        &mut self,
        kind: HookKind,
        hook: &str,
        callback: &Callback,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    ) -> Result<bool> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "error on removing {}: invalid hook",
                kind
            )));
        }
        if !callback.is_invocable(self.strict()) {
            return Err(HookError::InvalidInput(format!(
                "error on removing {}: given callback {} for the hook {} is not a valid callback",
                kind, callback, hook
            )));
        }

        let priority = priority.unwrap_or(self.config.default_priority);
        let id = callback.unique_id();

        let hooks = self.hooks.get_mut(kind);
        let Some(priorities) = hooks.get_mut(hook) else {
            return Ok(false);
        };
        let Some(bucket) = priorities.get_mut(&priority) else {
            return Ok(false);
        };
        let Some(registration) = bucket.get(&id) else {
            return Ok(false);
        };
        if let Some(expected) = accepted_args {
            if registration.accepted_args != expected {
                log::debug!(
                    "Not removing {} '{}': {} accepts {} args, not {}",
                    kind,
                    hook,
                    callback,
                    registration.accepted_args,
                    expected
                );
                return Ok(false);
            }
        }

        bucket.remove(&id);
        if bucket.is_empty() {
            priorities.remove(&priority);
        }
        if priorities.is_empty() {
            hooks.remove(hook);
        }

        log::debug!(
            "Removed {} '{}': {} at priority {}",
            kind,
            hook,
            callback,
            priority
        );
        Ok(true)
    }

    /// Record that `hook` fired with `args`.
    ///
    /// Registered callbacks are not run.
    pub fn fire(
        &mut self,
        kind: HookKind,
        hook: &str,
        args: Vec<HookValue>,
    ) -> Result<FiredRecord> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "error on firing {}: invalid hook",
                kind
            )));
        }

        log::debug!("Firing {} '{}' with {} args", kind, hook, args.len());

        self.fired
            .get_mut(kind)
            .entry(hook.to_string())
            .or_default()
            .push(args.clone());

        Ok(FiredRecord {
            kind,
            hook: hook.to_string(),
            args,
        })
    }

    /// Check whether `hook` has registrations.
    ///
    /// With a callback, check for that callback, at exactly `priority` if
    /// given or at any priority otherwise.
    pub fn has_hook(
        &self,
        kind: HookKind,
        hook: &str,
        callback: Option<&Callback>,
        priority: Option<i32>,
    ) -> Result<bool> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "error on checking {}: invalid hook",
                kind
            )));
        }
        if let Some(callback) = callback {
            if !callback.is_invocable(self.strict()) {
                return Err(HookError::InvalidInput(format!(
                    "error on checking {} {}: {} is not a valid callback",
                    hook, kind, callback
                )));
            }
        }
        if let Some(priority) = priority {
            if priority < 0 {
                return Err(HookError::InvalidInput(format!(
                    "error on checking {} {}: {} is not a valid priority",
                    hook, kind, priority
                )));
            }
        }

        let Some(priorities) = self.hooks.get(kind).get(hook) else {
            log::trace!("{} '{}' has no registrations", kind, hook);
            return Ok(false);
        };
        let Some(callback) = callback else {
            return Ok(true);
        };

        let id = callback.unique_id();
        let found = match priority {
            Some(priority) => priorities
                .get(&priority)
                .is_some_and(|bucket| bucket.contains_key(&id)),
            None => priorities.values().any(|bucket| bucket.contains_key(&id)),
        };
        log::trace!("{} '{}' has {}: {}", kind, hook, callback, found);
        Ok(found)
    }

    /// Check whether `hook` fired at least once
    pub fn has_hook_fired(&self, kind: HookKind, hook: &str) -> Result<bool> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "checking a fired {} needs a valid hook",
                kind
            )));
        }
        Ok(self.fired.get(kind).contains_key(hook))
    }

    /// Assert that `callback` is registered on `hook`.
    ///
    /// `priority` defaults to 10 when omitted or zero. `accepted_args` is only
    /// compared when given.
    pub fn assert_hook_added(
        &self,
        kind: HookKind,
        hook: &str,
        callback: &Callback,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    ) -> Result<()> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "asserting an added {} needs a valid hook to check",
                kind
            )));
        }
        let label = format!("{} {}", hook, kind);
        if !callback.is_invocable(Validation::Loose) {
            return Err(HookError::InvalidInput(format!(
                "use a valid callback to check for {}",
                label
            )));
        }

        let Some(priorities) = self.hooks.get(kind).get(hook) else {
            return Err(HookError::Assertion(format!(
                "{} is not a registered {}",
                hook, kind
            )));
        };

        let priority = priority
            .filter(|p| *p != 0)
            .unwrap_or(self.config.default_priority);
        let Some(bucket) = priorities.get(&priority) else {
            return Err(HookError::Assertion(format!(
                "no callbacks at priority {} for {}",
                priority, label
            )));
        };

        let Some(registration) = bucket.get(&callback.unique_id()) else {
            return Err(HookError::Assertion(format!(
                "wrong callback {} for {} at priority {}",
                callback, label, priority
            )));
        };

        match accepted_args {
            Some(expected) if expected != registration.accepted_args => {
                Err(HookError::Assertion(format!(
                    "{} is a wrong accepted args num for {} on the {} (registered with {})",
                    expected, callback, label, registration.accepted_args
                )))
            }
            _ => Ok(()),
        }
    }

    /// Assert that `hook` fired, with exactly `args` in at least one firing
    /// if given.
    pub fn assert_hook_fired(
        &self,
        kind: HookKind,
        hook: &str,
        args: Option<&[HookValue]>,
    ) -> Result<()> {
        if hook.is_empty() {
            return Err(HookError::InvalidInput(format!(
                "asserting a fired {} needs a valid hook to check",
                kind
            )));
        }
        let label = format!("{} {}", hook, kind);

        let Some(history) = self.fired.get(kind).get(hook) else {
            return Err(HookError::Assertion(format!("{} was not fired", label)));
        };
        let Some(expected) = args else {
            return Ok(());
        };

        let matches = |recorded: &Vec<HookValue>| {
            recorded.len() == expected.len()
                && recorded.iter().zip(expected).all(|(a, b)| identical(a, b))
        };
        if history.iter().any(matches) {
            Ok(())
        } else {
            Err(HookError::Assertion(format!(
                "{} was never fired with arguments {}",
                label,
                HookValue::Array(expected.to_vec())
            )))
        }
    }

    /// Forget every registration and firing
    pub fn reset(&mut self) {
        log::debug!("Resetting hook registry");
        self.hooks.clear();
        self.fired.clear();
    }

    /// True when nothing is registered and nothing has fired
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty() && self.fired.is_empty()
    }

    /// Registrations of `hook`, by priority then identity
    pub fn registrations(&self, kind: HookKind, hook: &str) -> Option<&PriorityMap> {
        self.hooks.get(kind).get(hook)
    }

    /// Argument snapshots of every firing of `hook`, oldest first
    pub fn fired(&self, kind: HookKind, hook: &str) -> Option<&[Vec<HookValue>]> {
        self.fired.get(kind).get(hook).map(Vec::as_slice)
    }

    /// How many times `hook` fired
    pub fn fire_count(&self, kind: HookKind, hook: &str) -> usize {
        self.fired.get(kind).get(hook).map_or(0, Vec::len)
    }

    /// Names of hooks with registrations, sorted
    pub fn hook_names(&self, kind: HookKind) -> impl Iterator<Item = &str> {
        self.hooks.get(kind).keys().map(String::as_str)
    }

    /// Names of hooks that fired, sorted
    pub fn fired_hook_names(&self, kind: HookKind) -> impl Iterator<Item = &str> {
        self.fired.get(kind).keys().map(String::as_str)
    }

    /// Serializable copy of both stores
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            actions: self.kind_snapshot(HookKind::Action),
            filters: self.kind_snapshot(HookKind::Filter),
        }
    }

    fn kind_snapshot(&self, kind: HookKind) -> KindSnapshot {
        let registered: RegisteredSnapshot = self
            .hooks
            .get(kind)
            .iter()
            .map(|(hook, priorities)| {
                let priorities = priorities
                    .iter()
                    .map(|(priority, bucket)| {
                        let bucket = bucket
                            .iter()
                            .map(|(id, registration)| {
                                (
                                    id.to_string(),
                                    RegistrationSnapshot {
                                        callback: registration.callback.to_string(),
                                        accepted_args: registration.accepted_args,
                                    },
                                )
                            })
                            .collect();
                        (*priority, bucket)
                    })
                    .collect();
                (hook.clone(), priorities)
            })
            .collect();

        KindSnapshot {
            registered,
            fired: self.fired.get(kind).clone(),
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dump of a registry's state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub actions: KindSnapshot,
    pub filters: KindSnapshot,
}

/// hook → priority → callback identity → registration
pub type RegisteredSnapshot =
    BTreeMap<String, BTreeMap<i32, BTreeMap<String, RegistrationSnapshot>>>;

/// Dump of one hook kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSnapshot {
    pub registered: RegisteredSnapshot,
    /// hook → argument snapshots, oldest first
    pub fired: BTreeMap<String, Vec<Vec<HookValue>>>,
}

/// Registration as it appears in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSnapshot {
    /// Display form of the callback
    pub callback: String,
    pub accepted_args: u32,
}
