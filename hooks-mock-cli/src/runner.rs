//! Scenario execution
//!
//! Every scenario runs against its own [`HookRegistry`], so scenarios can be
//! processed in parallel without sharing state.

use crate::config::{Operation, Scenario, Step};
use hooks_mock::{Callback, HookError, HookRegistry, ObjectHandle, RegistrySnapshot};
use std::collections::HashMap;
use std::path::PathBuf;

/// Result of one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// 1-based position in the scenario
    pub index: usize,
    pub operation: &'static str,
    pub passed: bool,
    /// Why the step failed, or the expected error it produced
    pub detail: Option<String>,
}

/// Result of a whole scenario
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub name: String,
    pub path: PathBuf,
    pub outcomes: Vec<StepOutcome>,
    /// Steps not run after a failure in fail-fast mode
    pub skipped: usize,
    /// Registry state after the last step
    pub snapshot: RegistrySnapshot,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed) && self.skipped == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

/// What a successful operation produced
enum Check {
    /// Nothing to compare
    Done,
    /// A query result and the value the scenario expects
    Query { actual: bool, expected: bool },
}

/// Runs scenario steps against a private registry
pub struct ScenarioRunner {
    registry: HookRegistry,
    /// Named objects referenced as `$name->method`
    objects: HashMap<String, ObjectHandle>,
    /// Named closures referenced as `closure:label`
    closures: HashMap<String, Callback>,
    fail_fast: bool,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            registry: HookRegistry::with_config(scenario.config.clone()),
            objects: HashMap::new(),
            closures: HashMap::new(),
            fail_fast: false,
        }
    }

    /// Builder method: stop at the first failed step
    pub fn with_fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Turn a scenario callback reference into a [`Callback`].
    ///
    /// - `$name->method`: method bound to the named object
    /// - `closure:label`: the named closure
    /// - `Class::method`: static method
    /// - anything else: function name
    ///
    /// Objects and closures are created on first use, so a name always refers
    /// to the same instance within one scenario.
    pub fn resolve_callback(&mut self, reference: &str) -> hooks_mock::Result<Callback> {
        if let Some(rest) = reference.strip_prefix('$') {
            let Some((object, method)) = rest.split_once("->") else {
                return Err(HookError::InvalidInput(format!(
                    "callback reference {} is missing '->method'",
                    reference
                )));
            };
            if object.is_empty() {
                return Err(HookError::InvalidInput(format!(
                    "callback reference {} names no object",
                    reference
                )));
            }
            let handle = self
                .objects
                .entry(object.to_string())
                .or_insert_with(|| ObjectHandle::new(object));
            return Ok(Callback::method(handle, method));
        }

        if let Some(label) = reference.strip_prefix("closure:") {
            let closure = self
                .closures
                .entry(label.to_string())
                .or_insert_with(|| Callback::labeled_closure(label));
            return Ok(closure.clone());
        }

        match reference.split_once("::") {
            Some((class, method)) => Ok(Callback::static_method(class, method)),
            None => Ok(Callback::function(reference)),
        }
    }

    fn execute(&mut self, operation: &Operation) -> hooks_mock::Result<Check> {
        match operation {
            Operation::Add {
                kind,
                hook,
                callback,
                priority,
                accepted_args,
            } => {
                let callback = self.resolve_callback(callback)?;
                self.registry
                    .register(*kind, hook, callback, *priority, *accepted_args)?;
                Ok(Check::Done)
            }
            Operation::Remove {
                kind,
                hook,
                callback,
                priority,
                accepted_args,
            } => {
                let callback = self.resolve_callback(callback)?;
                self.registry
                    .unregister(*kind, hook, &callback, *priority, *accepted_args)?;
                Ok(Check::Done)
            }
            Operation::Fire { kind, hook, args } => {
                self.registry.fire(*kind, hook, args.clone())?;
                Ok(Check::Done)
            }
            Operation::HasHook {
                kind,
                hook,
                callback,
                priority,
                expect,
            } => {
                let callback = match callback {
                    Some(reference) => Some(self.resolve_callback(reference)?),
                    None => None,
                };
                let actual = self
                    .registry
                    .has_hook(*kind, hook, callback.as_ref(), *priority)?;
                Ok(Check::Query {
                    actual,
                    expected: *expect,
                })
            }
            Operation::HasFired { kind, hook, expect } => {
                let actual = self.registry.has_hook_fired(*kind, hook)?;
                Ok(Check::Query {
                    actual,
                    expected: *expect,
                })
            }
            Operation::AssertAdded {
                kind,
                hook,
                callback,
                priority,
                accepted_args,
            } => {
                let callback = self.resolve_callback(callback)?;
                self.registry
                    .assert_hook_added(*kind, hook, &callback, *priority, *accepted_args)?;
                Ok(Check::Done)
            }
            Operation::AssertFired { kind, hook, args } => {
                self.registry
                    .assert_hook_fired(*kind, hook, args.as_deref())?;
                Ok(Check::Done)
            }
            Operation::Reset => {
                self.registry.reset();
                Ok(Check::Done)
            }
        }
    }

    /// Run one step and judge it against its expectation
    pub fn run_step(&mut self, index: usize, step: &Step) -> StepOutcome {
        let operation = step.operation.name();
        let result = self.execute(&step.operation);

        let (passed, detail) = match (result, step.expect_error) {
            (Ok(_), Some(expected)) => (
                false,
                Some(format!("expected {:?} error, but the step succeeded", expected)),
            ),
            (Ok(Check::Query { actual, expected }), None) if actual != expected => (
                false,
                Some(format!("expected {}, got {}", expected, actual)),
            ),
            (Ok(_), None) => (true, None),
            (Err(err), Some(expected)) if expected.matches(&err) => (true, Some(err.to_string())),
            (Err(err), _) => (false, Some(err.to_string())),
        };

        if passed {
            log::trace!("step {} ({}) passed", index, operation);
        } else {
            log::debug!("step {} ({}) failed: {:?}", index, operation, detail);
        }

        StepOutcome {
            index,
            operation,
            passed,
            detail,
        }
    }

    /// Run every step of `scenario`
    pub fn run(mut self, scenario: &Scenario, path: PathBuf) -> ScenarioReport {
        let name = scenario
            .name
            .clone()
            .unwrap_or_else(|| path.display().to_string());
        log::info!("Running scenario '{}' ({} steps)", name, scenario.steps.len());

        let mut outcomes = Vec::with_capacity(scenario.steps.len());
        let mut skipped = 0;
        for (i, step) in scenario.steps.iter().enumerate() {
            let outcome = self.run_step(i + 1, step);
            let failed = !outcome.passed;
            outcomes.push(outcome);
            if failed && self.fail_fast {
                skipped = scenario.steps.len() - (i + 1);
                break;
            }
        }

        ScenarioReport {
            name,
            path,
            outcomes,
            skipped,
            snapshot: self.registry.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(toml_content: &str) -> Scenario {
        toml::from_str(toml_content).unwrap()
    }

    #[test]
    fn test_resolve_callback_forms() {
        let s = scenario("");
        let mut runner = ScenarioRunner::new(&s);

        assert_eq!(
            runner.resolve_callback("__return_true").unwrap(),
            Callback::function("__return_true")
        );
        assert_eq!(
            runner.resolve_callback("Stub::stubStatic").unwrap(),
            Callback::static_method("Stub", "stubStatic")
        );

        let first = runner.resolve_callback("$stub->stub").unwrap();
        let again = runner.resolve_callback("$stub->stub").unwrap();
        let other = runner.resolve_callback("$other->stub").unwrap();
        assert_eq!(first.unique_id(), again.unique_id());
        assert_ne!(first.unique_id(), other.unique_id());

        let closure = runner.resolve_callback("closure:init").unwrap();
        assert_eq!(
            closure.unique_id(),
            runner.resolve_callback("closure:init").unwrap().unique_id()
        );

        assert!(runner.resolve_callback("$stub").unwrap_err().is_invalid_input());
        assert!(runner.resolve_callback("$->stub").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_run_passing_scenario() {
        let s = scenario(
            r#"
            [[step]]
            op = "add"
            hook = "foo"
            callback = "fnA"
            priority = 20
            accepted_args = 3

            [[step]]
            op = "assert_added"
            hook = "foo"
            callback = "fnA"
            priority = 20
            accepted_args = 3

            [[step]]
            op = "assert_added"
            hook = "foo"
            callback = "fnA"
            priority = 20
            accepted_args = 2
            expect_error = "assertion"

            [[step]]
            op = "fire"
            hook = "hook1"
            args = ["x", ["y", "z"], true]

            [[step]]
            op = "assert_fired"
            hook = "hook1"
            args = ["x", ["y", "z"], true]

            [[step]]
            op = "has_fired"
            kind = "filter"
            hook = "hook1"
            expect = false

            [[step]]
            op = "add"
            hook = ""
            callback = "fnA"
            expect_error = "invalid_input"
            "#,
        );

        let report = ScenarioRunner::new(&s).run(&s, PathBuf::from("passing.toml"));
        assert!(report.passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.outcomes.len(), 7);
        assert!(report.snapshot.actions.registered.contains_key("foo"));
        assert_eq!(report.snapshot.actions.fired["hook1"].len(), 1);
    }

    #[test]
    fn test_failed_steps_are_reported() {
        let s = scenario(
            r#"
            [[step]]
            op = "has_hook"
            hook = "foo"
            expect = true

            [[step]]
            op = "assert_fired"
            hook = "init"

            [[step]]
            op = "fire"
            hook = "init"
            expect_error = "invalid_input"
            "#,
        );

        let report = ScenarioRunner::new(&s).run(&s, PathBuf::from("failing.toml"));
        assert!(!report.passed());
        let failed: Vec<usize> = report.failures().map(|o| o.index).collect();
        assert_eq!(failed, vec![1, 2, 3]);
        assert_eq!(report.outcomes[0].detail.as_deref(), Some("expected true, got false"));
        assert_eq!(report.name, "failing.toml");
    }

    #[test]
    fn test_fail_fast_skips_rest() {
        let s = scenario(
            r#"
            [[step]]
            op = "assert_fired"
            hook = "init"

            [[step]]
            op = "fire"
            hook = "init"

            [[step]]
            op = "reset"
            "#,
        );

        let runner = ScenarioRunner::new(&s).with_fail_fast(true);
        let report = runner.run(&s, PathBuf::from("fast.toml"));
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.skipped, 2);
        assert!(!report.passed());
        assert!(report.snapshot.actions.fired.is_empty());
    }

    #[test]
    fn test_scenario_config_applies() {
        let s = scenario(
            r#"
            [config]
            known_functions = ["__return_true"]

            [[step]]
            op = "add"
            hook = "foo"
            callback = "this_callback_does_not_exists"
            expect_error = "invalid_input"

            [[step]]
            op = "add"
            hook = "foo"
            callback = "$stub->stub"
            priority = 30
            "#,
        );

        let report = ScenarioRunner::new(&s).run(&s, PathBuf::from("config.toml"));
        assert!(report.passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());

        let bucket = &report.snapshot.actions.registered["foo"][&30];
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.values().next().unwrap().callback, "stub->stub");
    }
}
