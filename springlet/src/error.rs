use crate::value::ValueKind;
use std::error::Error;
use std::rc::Rc;
use thiserror::Error;

/// Type-erased error returned by user-provided constructors and setters.
pub type ErrorPtr = Rc<dyn Error + 'static>;

/// Errors related to retrieving component instances from a container.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ComponentInstanceProviderError {
    #[error("Cannot find named component: {0}")]
    NoNamedInstance(String),
    #[error("Tried to downcast component '{name}' to incompatible type: {type_name}")]
    IncompatibleComponent {
        name: String,
        type_name: &'static str,
    },
}

/// Error related to component registries.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ComponentDefinitionRegistryError {
    #[error("Attempted to register a duplicated component with name: {name} (type: {type_name})")]
    DuplicateComponentName {
        name: String,
        type_name: &'static str,
    },
}

/// Outcome of a failed setter call.
#[derive(Error, Clone, Debug)]
pub enum SetterError {
    /// The setter exists, but does not accept the given value type.
    #[error("Setter expects a value of type {expected}")]
    TypeMismatch { expected: &'static str },
    #[error("Instance is not a component of type {0}")]
    IncompatibleInstance(&'static str),
    #[error("Instance of {0} is already borrowed")]
    InstanceBorrowed(&'static str),
    #[error("Setter failed: {0}")]
    Custom(ErrorPtr),
}

/// Errors related to parsing literal values.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum ValueError {
    #[error("Cannot parse '{literal}' as {kind}: {reason}")]
    Parse {
        literal: String,
        kind: ValueKind,
        reason: String,
    },
}

/// A problem encountered while bootstrapping a container. Diagnostics never abort the bootstrap
/// sequence - the affected component or field is skipped and processing continues.
#[derive(Error, Clone, Debug)]
pub enum Diagnostic {
    #[error("Cannot register component: {0}")]
    DuplicateComponentName(#[from] ComponentDefinitionRegistryError),
    #[error("Cannot instantiate component '{component}': {error}")]
    Instantiation { component: String, error: ErrorPtr },
    #[error("No matching setter for field '{field}' of component '{component}': {reason}")]
    MutatorNotFound {
        component: String,
        field: &'static str,
        reason: String,
    },
    #[error("Setter for field '{field}' of component '{component}' failed: {source}")]
    Invocation {
        component: String,
        field: &'static str,
        #[source]
        source: SetterError,
    },
    #[error("Cannot inject value into field '{field}' of component '{component}': {source}")]
    ValueParse {
        component: String,
        field: &'static str,
        #[source]
        source: ValueError,
    },
    #[error("Field '{field}' of component '{component}' has unsupported value type {declared_type} - leaving default")]
    UnsupportedValueType {
        component: String,
        field: &'static str,
        declared_type: &'static str,
    },
    #[error("Cannot resolve component '{target}' for field '{field}' of component '{component}' - injecting none")]
    UnresolvedReference {
        component: String,
        field: &'static str,
        target: String,
    },
}

impl Diagnostic {
    /// Name of the component the diagnostic refers to.
    pub fn component(&self) -> &str {
        match self {
            Diagnostic::DuplicateComponentName(
                ComponentDefinitionRegistryError::DuplicateComponentName { name, .. },
            ) => name,
            Diagnostic::Instantiation { component, .. }
            | Diagnostic::MutatorNotFound { component, .. }
            | Diagnostic::Invocation { component, .. }
            | Diagnostic::ValueParse { component, .. }
            | Diagnostic::UnsupportedValueType { component, .. }
            | Diagnostic::UnresolvedReference { component, .. } => component,
        }
    }
}
