//! Assertions against the thread's default registry
//!
//! Each function returns `Ok(())` when the expectation holds and a
//! [`HookError::Assertion`](crate::HookError::Assertion) describing the
//! mismatch otherwise. Malformed arguments yield `InvalidInput` instead.

use crate::callback::Callback;
use crate::functions::with_registry;
use crate::types::{HookKind, HookValue, Result};

pub fn assert_action_added(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<()> {
    let callback = callback.into();
    with_registry(|r| {
        r.assert_hook_added(HookKind::Action, hook, &callback, priority, accepted_args)
    })
}

pub fn assert_filter_added(
    hook: &str,
    callback: impl Into<Callback>,
    priority: Option<i32>,
    accepted_args: Option<u32>,
) -> Result<()> {
    let callback = callback.into();
    with_registry(|r| {
        r.assert_hook_added(HookKind::Filter, hook, &callback, priority, accepted_args)
    })
}

/// Assert the action fired, with exactly `args` at least once if given
pub fn assert_action_fired(hook: &str, args: Option<&[HookValue]>) -> Result<()> {
    with_registry(|r| r.assert_hook_fired(HookKind::Action, hook, args))
}

/// Assert the filter fired, with exactly `args` at least once if given
pub fn assert_filter_fired(hook: &str, args: Option<&[HookValue]>) -> Result<()> {
    with_registry(|r| r.assert_hook_fired(HookKind::Filter, hook, args))
}
