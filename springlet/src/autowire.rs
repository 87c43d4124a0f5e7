//! Third bootstrap phase: injecting references between components (autowiring).
//!
//! Precondition: all instances are already stored in the [BeanCache]. Wiring only reads the cache,
//! so the order of definitions doesn't matter and cyclic references resolve to the cached
//! instances.
//! Postcondition: every reference field of every cached component has been assigned - either the
//! resolved target or none, if the target is missing.

use crate::cache::BeanCache;
use crate::component::ComponentInstanceAnyPtr;
use crate::component_registry::{ComponentDefinition, ReferenceFieldMetadata};
use crate::error::Diagnostic;
use crate::instance_builder::{report, setter_diagnostic};
use tracing::debug;

/// Injects references into all cached instances of the given definitions. The target is looked up
/// by the qualifier name, if present, or by the name derived from the declared target type.
pub fn wire<'a, C: BeanCache + ?Sized>(
    definitions: impl IntoIterator<Item = &'a ComponentDefinition>,
    cache: &C,
) -> Vec<Diagnostic> {
    let mut diagnostics = vec![];

    for definition in definitions {
        if definition.metadata.references.is_empty() {
            continue;
        }

        let instance = if let Some(instance) = cache.instance(&definition.name) {
            instance
        } else {
            // construction failed and has already been reported
            debug!(name = %definition.name, "Skipping wiring of a missing component.");
            continue;
        };

        for field in &definition.metadata.references {
            wire_reference(&definition.name, field, &instance, cache, &mut diagnostics);
        }
    }

    diagnostics
}

fn wire_reference<C: BeanCache + ?Sized>(
    component: &str,
    field: &ReferenceFieldMetadata,
    instance: &ComponentInstanceAnyPtr,
    cache: &C,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let setter = if let Some(setter) = field.setter {
        setter
    } else {
        report(
            diagnostics,
            Diagnostic::MutatorNotFound {
                component: component.to_string(),
                field: field.field,
                reason: format!("no setter accepting {}", field.target_type),
            },
        );
        return;
    };

    let target_name = field.target_name();
    let target = cache.instance(&target_name);

    debug!(
        component,
        field = field.field,
        target = %target_name,
        resolved = target.is_some(),
        "Injecting reference."
    );

    if target.is_none() {
        report(
            diagnostics,
            Diagnostic::UnresolvedReference {
                component: component.to_string(),
                field: field.field,
                target: target_name,
            },
        );
    }

    if let Err(error) = (setter)(instance, target) {
        report(diagnostics, setter_diagnostic(component, field.field, error));
    }
}

#[cfg(test)]
mod tests {
    use crate::autowire::wire;
    use crate::cache::{BeanCache, MockBeanCache, NamedBeanCache};
    use crate::component::{
        construct, downcast_reference, with_instance, BeanPtr, Component,
        ComponentInstanceAnyPtr,
    };
    use crate::component_registry::{
        ComponentDefinition, ComponentMetadata, ReferenceFieldMetadata,
    };
    use crate::error::{Diagnostic, ErrorPtr, SetterError};
    use mockall::predicate::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Dependency;

    impl Component for Dependency {
        fn create() -> Result<Self, ErrorPtr> {
            Ok(Dependency)
        }

        fn metadata() -> ComponentMetadata {
            ComponentMetadata::new::<Self>(construct::<Self>)
        }
    }

    #[derive(Default)]
    struct Owner {
        by_type: Option<BeanPtr<Dependency>>,
        by_name: Option<BeanPtr<Dependency>>,
        owner: Option<BeanPtr<Owner>>,
    }

    impl Component for Owner {
        fn create() -> Result<Self, ErrorPtr> {
            Ok(Self::default())
        }

        fn metadata() -> ComponentMetadata {
            ComponentMetadata::new::<Self>(construct::<Self>)
                .with_reference(ReferenceFieldMetadata::new::<Option<BeanPtr<Dependency>>>(
                    "by_type",
                    None,
                    Some(set_by_type),
                ))
                .with_reference(ReferenceFieldMetadata::new::<Option<BeanPtr<Dependency>>>(
                    "by_name",
                    Some("named"),
                    Some(set_by_name),
                ))
        }
    }

    fn set_by_type(
        instance: &ComponentInstanceAnyPtr,
        target: Option<ComponentInstanceAnyPtr>,
    ) -> Result<(), SetterError> {
        let target = downcast_reference::<Option<BeanPtr<Dependency>>>(target)?;
        with_instance::<Owner>(instance, |owner| owner.by_type = target)
    }

    fn set_by_name(
        instance: &ComponentInstanceAnyPtr,
        target: Option<ComponentInstanceAnyPtr>,
    ) -> Result<(), SetterError> {
        let target = downcast_reference::<Option<BeanPtr<Dependency>>>(target)?;
        with_instance::<Owner>(instance, |owner| owner.by_name = target)
    }

    fn set_owner(
        instance: &ComponentInstanceAnyPtr,
        target: Option<ComponentInstanceAnyPtr>,
    ) -> Result<(), SetterError> {
        let target = downcast_reference::<Option<BeanPtr<Owner>>>(target)?;
        with_instance::<Owner>(instance, |owner| owner.owner = target)
    }

    fn create_definition(name: &str, metadata: ComponentMetadata) -> ComponentDefinition {
        ComponentDefinition {
            name: name.to_string(),
            metadata,
        }
    }

    fn store(cache: &mut NamedBeanCache, name: &str, instance: ComponentInstanceAnyPtr) {
        cache.store_instance(name, instance);
    }

    fn owner(cache: &NamedBeanCache) -> Rc<RefCell<Owner>> {
        cache
            .instance("owner")
            .unwrap()
            .downcast::<RefCell<Owner>>()
            .unwrap()
    }

    #[test]
    fn should_prefer_qualifier_over_type_name() {
        let definitions = [create_definition("owner", Owner::metadata())];

        let mut cache = NamedBeanCache::default();
        let by_type = construct::<Dependency>().unwrap();
        let by_name = construct::<Dependency>().unwrap();
        store(&mut cache, "owner", construct::<Owner>().unwrap());
        store(&mut cache, "dependency", by_type.clone());
        store(&mut cache, "named", by_name.clone());

        let diagnostics = wire(&definitions, &cache);
        assert!(diagnostics.is_empty());

        let owner = owner(&cache);
        let owner = owner.borrow();
        assert!(Rc::ptr_eq(
            &(owner.by_type.clone().unwrap() as ComponentInstanceAnyPtr),
            &by_type
        ));
        assert!(Rc::ptr_eq(
            &(owner.by_name.clone().unwrap() as ComponentInstanceAnyPtr),
            &by_name
        ));
    }

    #[test]
    fn should_inject_none_for_missing_targets() {
        let definitions = [create_definition("owner", Owner::metadata())];

        let mut cache = NamedBeanCache::default();
        store(&mut cache, "owner", construct::<Owner>().unwrap());
        store(&mut cache, "dependency", construct::<Dependency>().unwrap());

        let diagnostics = wire(&definitions, &cache);
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::UnresolvedReference { field: "by_name", target, .. }] if target == "named"
        ));

        let owner = owner(&cache);
        assert!(owner.borrow().by_type.is_some());
        assert!(owner.borrow().by_name.is_none());
    }

    #[test]
    fn should_wire_self_references() {
        let definitions = [create_definition(
            "owner",
            ComponentMetadata::new::<Owner>(construct::<Owner>).with_reference(
                ReferenceFieldMetadata::new::<Option<BeanPtr<Owner>>>(
                    "owner",
                    None,
                    Some(set_owner),
                ),
            ),
        )];

        let mut cache = NamedBeanCache::default();
        store(&mut cache, "owner", construct::<Owner>().unwrap());

        assert!(wire(&definitions, &cache).is_empty());

        let owner = owner(&cache);
        let injected = owner.borrow().owner.clone().unwrap();
        assert!(Rc::ptr_eq(&injected, &owner));
    }

    #[test]
    fn should_report_missing_setter() {
        let definitions = [create_definition(
            "owner",
            ComponentMetadata::new::<Owner>(construct::<Owner>)
                .with_reference(ReferenceFieldMetadata::new::<Option<BeanPtr<Dependency>>>(
                    "by_type",
                    None,
                    None,
                ))
                .with_reference(ReferenceFieldMetadata::new::<Option<BeanPtr<Dependency>>>(
                    "by_name",
                    Some("dependency"),
                    Some(set_by_name),
                )),
        )];

        let mut cache = NamedBeanCache::default();
        store(&mut cache, "owner", construct::<Owner>().unwrap());
        store(&mut cache, "dependency", construct::<Dependency>().unwrap());

        let diagnostics = wire(&definitions, &cache);
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::MutatorNotFound {
                field: "by_type",
                ..
            }]
        ));
        assert!(owner(&cache).borrow().by_name.is_some());
    }

    #[test]
    fn should_report_incompatible_target() {
        let definitions = [create_definition(
            "owner",
            ComponentMetadata::new::<Owner>(construct::<Owner>).with_reference(
                ReferenceFieldMetadata::new::<Option<BeanPtr<Dependency>>>(
                    "by_name",
                    Some("owner"),
                    Some(set_by_name),
                ),
            ),
        )];

        let mut cache = NamedBeanCache::default();
        store(&mut cache, "owner", construct::<Owner>().unwrap());

        let diagnostics = wire(&definitions, &cache);
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::MutatorNotFound {
                field: "by_name",
                ..
            }]
        ));
    }

    #[test]
    fn should_skip_missing_owner() {
        let definitions = [create_definition("owner", Owner::metadata())];

        let mut cache = MockBeanCache::new();
        cache
            .expect_instance()
            .with(eq("owner"))
            .times(1)
            .return_const_st(None);

        assert!(wire(&definitions, &cache).is_empty());
    }
}
