//! Second bootstrap phase: instantiating components and injecting literal values.
//!
//! Precondition: component definitions are registered under unique names.
//! Postcondition: every component whose constructor succeeded is stored in the [BeanCache], with
//! all injectable literal values assigned. Reference fields are untouched.

use crate::cache::BeanCache;
use crate::component::ComponentInstanceAnyPtr;
use crate::component_registry::{ComponentDefinition, ValueFieldMetadata};
use crate::error::{Diagnostic, SetterError};
use tracing::{debug, warn};

/// Creates instances for all given definitions and stores them in the cache. A failure of a single
/// component or field never stops the process - it's reported as a [Diagnostic] instead.
pub fn build<'a, C: BeanCache + ?Sized>(
    definitions: impl IntoIterator<Item = &'a ComponentDefinition>,
    cache: &mut C,
) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    for definition in definitions {
        debug!(name = %definition.name, "Creating component instance.");

        let instance = match (definition.metadata.constructor)() {
            Ok(instance) => instance,
            Err(error) => {
                report(
                    &mut diagnostics,
                    Diagnostic::Instantiation {
                        component: definition.name.clone(),
                        error,
                    },
                );
                continue;
            }
        };

        for field in &definition.metadata.values {
            if let Err(diagnostic) = inject_value(&definition.name, field, &instance) {
                report(&mut diagnostics, diagnostic);
            }
        }

        cache.store_instance(&definition.name, instance);
    }

    diagnostics
}

fn inject_value(
    component: &str,
    field: &ValueFieldMetadata,
    instance: &ComponentInstanceAnyPtr,
) -> Result<(), Diagnostic> {
    let setter = field.setter.ok_or_else(|| Diagnostic::MutatorNotFound {
        component: component.to_string(),
        field: field.field,
        reason: format!("no setter accepting {}", field.declared_type),
    })?;

    let value = field
        .kind
        .coerce(field.literal)
        .map_err(|source| Diagnostic::ValueParse {
            component: component.to_string(),
            field: field.field,
            source,
        })?
        .ok_or_else(|| Diagnostic::UnsupportedValueType {
            component: component.to_string(),
            field: field.field,
            declared_type: field.declared_type,
        })?;

    debug!(
        component,
        field = field.field,
        value = ?value,
        "Injecting literal value."
    );

    (setter)(instance, value.into_any())
        .map_err(|error| setter_diagnostic(component, field.field, error))
}

/// Maps setter failures to diagnostics: a setter not accepting the given type is treated as a
/// missing one.
pub(crate) fn setter_diagnostic(
    component: &str,
    field: &'static str,
    error: SetterError,
) -> Diagnostic {
    match error {
        SetterError::TypeMismatch { .. } => Diagnostic::MutatorNotFound {
            component: component.to_string(),
            field,
            reason: error.to_string(),
        },
        _ => Diagnostic::Invocation {
            component: component.to_string(),
            field,
            source: error,
        },
    }
}

pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}
