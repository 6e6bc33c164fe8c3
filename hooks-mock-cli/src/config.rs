//! Scenario file loading and parsing

use anyhow::{Context, Result};
use hooks_mock::{HookKind, HookValue, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A hook scenario (loaded from a TOML file)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    /// Display name, defaults to the file stem
    pub name: Option<String>,
    /// Registry configuration the scenario runs against
    #[serde(default)]
    pub config: RegistryConfig,
    /// Steps run in order
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One scenario step and its expected outcome
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Step {
    #[serde(flatten)]
    pub operation: Operation,
    /// The step is expected to fail with this error kind
    pub expect_error: Option<ExpectedError>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Add {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        callback: String,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    },
    Remove {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        callback: String,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    },
    Fire {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        #[serde(default)]
        args: Vec<HookValue>,
    },
    HasHook {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        callback: Option<String>,
        priority: Option<i32>,
        expect: bool,
    },
    HasFired {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        expect: bool,
    },
    AssertAdded {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        callback: String,
        priority: Option<i32>,
        accepted_args: Option<u32>,
    },
    AssertFired {
        #[serde(default)]
        kind: HookKind,
        hook: String,
        args: Option<Vec<HookValue>>,
    },
    Reset,
}

impl Operation {
    /// Name of the operation as written in scenario files
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Remove { .. } => "remove",
            Operation::Fire { .. } => "fire",
            Operation::HasHook { .. } => "has_hook",
            Operation::HasFired { .. } => "has_fired",
            Operation::AssertAdded { .. } => "assert_added",
            Operation::AssertFired { .. } => "assert_fired",
            Operation::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedError {
    InvalidInput,
    Assertion,
}

impl ExpectedError {
    pub fn matches(&self, err: &hooks_mock::HookError) -> bool {
        match self {
            ExpectedError::InvalidInput => err.is_invalid_input(),
            ExpectedError::Assertion => err.is_assertion(),
        }
    }
}

/// Load a scenario from a TOML file
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {:?}", path))?;

    let mut scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file: {:?}", path))?;

    if scenario.name.is_none() {
        scenario.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
    }
    log::debug!(
        "Loaded scenario {:?} with {} steps",
        scenario.name,
        scenario.steps.len()
    );

    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_scenario_deserialization() {
        let toml_content = r#"
            name = "registration"

            [config]
            known_functions = ["__return_true"]

            [[step]]
            op = "add"
            kind = "filter"
            hook = "foo"
            callback = "__return_true"
            priority = 20
            accepted_args = 3

            [[step]]
            op = "fire"
            hook = "hook1"
            args = ["x", ["y", "z"], true]

            [[step]]
            op = "assert_added"
            kind = "filter"
            hook = "foo"
            callback = "__return_true"
            priority = 20
            accepted_args = 2
            expect_error = "assertion"

            [[step]]
            op = "reset"
        "#;

        let scenario: Scenario = toml::from_str(toml_content).unwrap();
        assert_eq!(scenario.name.as_deref(), Some("registration"));
        assert_eq!(
            scenario.config.known_functions,
            Some(vec!["__return_true".to_string()])
        );
        assert_eq!(scenario.config.default_priority, 10);
        assert_eq!(scenario.steps.len(), 4);

        match &scenario.steps[0].operation {
            Operation::Add {
                kind,
                priority,
                accepted_args,
                ..
            } => {
                assert_eq!(*kind, HookKind::Filter);
                assert_eq!(*priority, Some(20));
                assert_eq!(*accepted_args, Some(3));
            }
            other => panic!("unexpected operation: {:?}", other),
        }

        match &scenario.steps[1].operation {
            Operation::Fire { kind, args, .. } => {
                assert_eq!(*kind, HookKind::Action);
                assert_eq!(args, &vec![json!("x"), json!(["y", "z"]), json!(true)]);
            }
            other => panic!("unexpected operation: {:?}", other),
        }

        assert_eq!(scenario.steps[2].expect_error, Some(ExpectedError::Assertion));
        assert!(matches!(scenario.steps[3].operation, Operation::Reset));
    }

    #[test]
    fn test_unknown_kind_is_action() {
        let toml_content = r#"
            [[step]]
            op = "has_fired"
            kind = "event"
            hook = "init"
            expect = false
        "#;

        let scenario: Scenario = toml::from_str(toml_content).unwrap();
        match &scenario.steps[0].operation {
            Operation::HasFired { kind, .. } => assert_eq!(*kind, HookKind::Action),
            other => panic!("unexpected operation: {:?}", other),
        }
    }

    #[test]
    fn test_load_scenario_names_from_file() {
        let mut file = tempfile::Builder::new()
            .prefix("init_hooks")
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[[step]]\nop = \"fire\"\nhook = \"init\"").unwrap();

        let scenario = load_scenario(file.path()).unwrap();
        let stem = file.path().file_stem().unwrap().to_string_lossy().into_owned();
        assert_eq!(scenario.name, Some(stem));
        assert_eq!(scenario.steps[0].operation.name(), "fire");
    }

    #[test]
    fn test_load_scenario_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[step]]\nop = \"explode\"").unwrap();

        let err = load_scenario(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse scenario file"));
    }
}
