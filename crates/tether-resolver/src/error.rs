use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use tether_core::{ModuleId, Requirement};
use thiserror::Error;

/// Why a resolve call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// A non-optional requirement was left without a viable candidate.
    Unsatisfied,
    /// Every candidate configuration violated a constraint.
    Exhausted,
    ExecutionEnvironment,
    NativeLibrary,
    /// The state referenced a module it could not produce.
    UnknownModule,
}

impl FailureReason {
    fn help(self) -> &'static str {
        match self {
            FailureReason::Unsatisfied => {
                "Add a module providing the requirement, or mark the requirement optional"
            }
            FailureReason::Exhausted => {
                "Run with --conflicts to list the uses constraints that could not be satisfied"
            }
            FailureReason::ExecutionEnvironment => {
                "Add the environment to [resolver] execution-environments in the config file"
            }
            FailureReason::NativeLibrary => {
                "Check the module's native library entries against its content and [resolver.platform]"
            }
            FailureReason::UnknownModule => "Check the module id against the universe file",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureReason::Unsatisfied => "unsatisfied",
            FailureReason::Exhausted => "exhausted",
            FailureReason::ExecutionEnvironment => "execution-environment",
            FailureReason::NativeLibrary => "native-library",
            FailureReason::UnknownModule => "unknown-module",
        };
        f.write_str(label)
    }
}

/// The single error raised by the resolution engine.
///
/// Consistency conflicts are never reported through this type; they only
/// drive the search forward.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message}{}", location(.module.as_ref(), .requirement.as_deref()))]
#[diagnostic(code(tether::resolve))]
pub struct ResolveError {
    pub message: String,
    pub module: Option<ModuleId>,
    pub requirement: Option<Arc<Requirement>>,
    pub reason: FailureReason,
    #[help]
    pub help: Option<String>,
}

fn location(module: Option<&ModuleId>, requirement: Option<&Requirement>) -> String {
    match (module, requirement) {
        (Some(m), Some(r)) => format!(" ({m}: {r})"),
        (Some(m), None) => format!(" ({m})"),
        (None, Some(r)) => format!(" ({r})"),
        (None, None) => String::new(),
    }
}

impl ResolveError {
    fn new(
        reason: FailureReason,
        message: impl Into<String>,
        module: Option<ModuleId>,
        requirement: Option<Arc<Requirement>>,
    ) -> Self {
        Self {
            message: message.into(),
            module,
            requirement,
            reason,
            help: Some(reason.help().to_string()),
        }
    }

    pub fn unsatisfied(module: ModuleId, requirement: Arc<Requirement>) -> Self {
        Self::new(
            FailureReason::Unsatisfied,
            "Unable to resolve.",
            Some(module),
            Some(requirement),
        )
    }

    pub fn exhausted() -> Self {
        Self::new(
            FailureReason::Exhausted,
            "Unable to resolve due to constraint violation.",
            None,
            None,
        )
    }

    /// The configured attempt budget ran out before the search finished.
    pub fn attempt_limit(limit: usize) -> Self {
        Self::new(
            FailureReason::Exhausted,
            format!("Unable to resolve within {limit} attempts."),
            None,
            None,
        )
    }

    pub fn execution_environment(module: ModuleId, required: &str) -> Self {
        Self::new(
            FailureReason::ExecutionEnvironment,
            format!("Execution environment not supported: {required}"),
            Some(module),
            None,
        )
    }

    pub fn native_library(module: ModuleId, message: impl Into<String>) -> Self {
        Self::new(FailureReason::NativeLibrary, message, Some(module), None)
    }

    pub fn unknown_module(module: ModuleId) -> Self {
        Self::new(
            FailureReason::UnknownModule,
            format!("Unknown module: {module}"),
            Some(module),
            None,
        )
    }

    pub fn is_exhausted(&self) -> bool {
        self.reason == FailureReason::Exhausted
    }
}
