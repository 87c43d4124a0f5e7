//! The container itself - [ApplicationContext]. Creating a context runs the whole bootstrap
//! sequence eagerly:
//!
//! 1. components declared in the base package (and its nested modules) are [scanned](scan) and
//! registered together with manually added ones,
//! 2. all components are instantiated and receive their literal values
//! ([build](crate::instance_builder::build)),
//! 3. references between components are injected ([wire](crate::autowire::wire)).
//!
//! Each phase completes for all components before the next one starts. Problems with individual
//! components never abort the sequence - they're collected as [Diagnostics](Diagnostic) available
//! from the finished context.
//!
//! ```
//! use springlet::context::ApplicationContext;
//!
//! mod entity {
//!     use springlet::component::BeanPtr;
//!     use springlet::Component;
//!
//!     #[derive(Component)]
//!     pub struct Engine {
//!         #[value("300")]
//!         pub power: i32,
//!     }
//!
//!     #[derive(Component)]
//!     #[component(name = "car")]
//!     pub struct Car {
//!         // injected by type - looks for a component named "engine"
//!         #[autowired]
//!         pub engine: Option<BeanPtr<Engine>>,
//!     }
//! }
//!
//! fn main() {
//!     let context = ApplicationContext::new(concat!(module_path!(), "::entity"));
//!     let car = context.get_bean_typed::<entity::Car>("car").unwrap();
//!     let engine = car.borrow().engine.clone().unwrap();
//!
//!     assert_eq!(engine.borrow().power, 300);
//! }
//! ```

use crate::autowire::wire;
use crate::cache::{BeanCache, NamedBeanCache};
use crate::component::{BeanPtr, Component, ComponentInstanceAnyPtr};
use crate::component_registry::{
    register_all, scan, ComponentDefinitionRegistry, ComponentMetadata,
    NamedComponentDefinitionRegistry,
};
use crate::config::ContainerConfig;
use crate::error::{ComponentInstanceProviderError, Diagnostic};
use crate::instance_builder::{build, report};
use crate::instance_provider::{ComponentInstanceProvider, TypedComponentInstanceProvider};
use itertools::Itertools;
use tracing::{info, warn};

/// Builder for [ApplicationContext] with sensible defaults, for easy construction.
#[derive(Default)]
pub struct ApplicationContextBuilder {
    config: ContainerConfig,
    base_package: Option<String>,
    components: Vec<ComponentMetadata>,
}

impl ApplicationContextBuilder {
    /// Creates a new builder with a default configuration and no components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets new [ContainerConfig].
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the package to scan for components.
    pub fn with_base_package<T: ToString>(mut self, base_package: T) -> Self {
        self.base_package = Some(base_package.to_string());
        self
    }

    /// Adds a manually described component. Manual components are registered after scanned ones.
    pub fn with_component_metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.components.push(metadata);
        self
    }

    /// Adds a component by type, regardless of the package it's declared in.
    pub fn with_component<T: Component>(self) -> Self {
        self.with_component_metadata(T::metadata())
    }

    /// Runs the bootstrap sequence and returns the resulting [ApplicationContext].
    pub fn build(self) -> ApplicationContext {
        let mut diagnostics = vec![];

        let scanned = self
            .base_package
            .as_deref()
            .map(|base_package| {
                info!(base_package, "Scanning for components...");
                scan(base_package)
            })
            .unwrap_or_default();

        let mut registry =
            NamedComponentDefinitionRegistry::new(self.config.allow_definition_overriding);
        for error in register_all(&mut registry, scanned.into_iter().chain(self.components)) {
            report(&mut diagnostics, error.into());
        }

        let definitions = registry.all_definitions();
        let mut cache = NamedBeanCache::default();

        info!(count = definitions.len(), "Creating component instances...");
        diagnostics.extend(build(&definitions, &mut cache));

        info!("Injecting component references...");
        diagnostics.extend(wire(&definitions, &cache));

        if !diagnostics.is_empty() {
            warn!(
                count = diagnostics.len(),
                "Application context created with problems."
            );
        }

        ApplicationContext { cache, diagnostics }
    }
}

/// A fully bootstrapped container holding component instances by name.
pub struct ApplicationContext {
    cache: NamedBeanCache,
    diagnostics: Vec<Diagnostic>,
}

impl ApplicationContext {
    /// Scans `base_package` and creates all found components. Configuration is read from the
    /// environment (see [crate::config]), falling back to defaults when it's invalid.
    pub fn new(base_package: &str) -> Self {
        let config = ContainerConfig::init_from_environment().unwrap_or_else(|error| {
            warn!(%error, "Cannot read container configuration - using defaults.");
            ContainerConfig::default()
        });

        ApplicationContextBuilder::new()
            .with_config(config)
            .with_base_package(base_package)
            .build()
    }

    /// Returns the component instance registered under the given name. Never creates instances.
    #[inline]
    pub fn get_bean(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        self.cache.instance(name)
    }

    /// Typesafe version of [ApplicationContext::get_bean].
    #[inline]
    pub fn get_bean_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<BeanPtr<T>, ComponentInstanceProviderError> {
        self.instance_by_name_typed(name)
    }

    /// Checks if there's an instance with the given name.
    #[inline]
    pub fn contains_bean(&self, name: &str) -> bool {
        self.cache.instance(name).is_some()
    }

    /// Names of all created instances, sorted.
    pub fn bean_names(&self) -> Vec<String> {
        self.cache.names().into_iter().sorted().collect()
    }

    /// Problems encountered while bootstrapping, in order of occurrence.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl ComponentInstanceProvider for ApplicationContext {
    #[inline]
    fn instance_by_name(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        self.get_bean(name)
    }
}

#[cfg(test)]
//noinspection DuplicatedCode
mod tests {
    use crate::component::{
        construct, downcast_reference, downcast_value, with_instance, BeanPtr, Component,
        ComponentInstanceAnyPtr,
    };
    use crate::component_registry::internal::{submit, ComponentDefinitionRegisterer};
    use crate::component_registry::{ComponentMetadata, ReferenceFieldMetadata, ValueFieldMetadata};
    use crate::config::ContainerConfig;
    use crate::context::ApplicationContextBuilder;
    use crate::error::{ComponentDefinitionRegistryError, Diagnostic, ErrorPtr, SetterError};
    use std::any::Any;
    use std::rc::Rc;

    mod scanned {
        use crate::component::{
            construct, downcast_reference, with_instance, BeanPtr, Component,
            ComponentInstanceAnyPtr,
        };
        use crate::component_registry::{ComponentMetadata, ReferenceFieldMetadata};
        use crate::error::{ErrorPtr, SetterError};

        #[derive(Default)]
        pub struct Left {
            pub right: Option<BeanPtr<Right>>,
        }

        #[derive(Default)]
        pub struct Right {
            pub left: Option<BeanPtr<Left>>,
        }

        fn set_right(
            instance: &ComponentInstanceAnyPtr,
            target: Option<ComponentInstanceAnyPtr>,
        ) -> Result<(), SetterError> {
            let target = downcast_reference::<Option<BeanPtr<Right>>>(target)?;
            with_instance::<Left>(instance, |left| left.right = target)
        }

        fn set_left(
            instance: &ComponentInstanceAnyPtr,
            target: Option<ComponentInstanceAnyPtr>,
        ) -> Result<(), SetterError> {
            let target = downcast_reference::<Option<BeanPtr<Left>>>(target)?;
            with_instance::<Right>(instance, |right| right.left = target)
        }

        impl Component for Left {
            fn create() -> Result<Self, ErrorPtr> {
                Ok(Self::default())
            }

            fn metadata() -> ComponentMetadata {
                ComponentMetadata::new::<Self>(construct::<Self>).with_reference(
                    ReferenceFieldMetadata::new::<Option<BeanPtr<Right>>>(
                        "right",
                        None,
                        Some(set_right),
                    ),
                )
            }
        }

        impl Component for Right {
            fn create() -> Result<Self, ErrorPtr> {
                Ok(Self::default())
            }

            fn metadata() -> ComponentMetadata {
                ComponentMetadata::new::<Self>(construct::<Self>).with_reference(
                    ReferenceFieldMetadata::new::<Option<BeanPtr<Left>>>(
                        "left",
                        None,
                        Some(set_left),
                    ),
                )
            }
        }
    }

    #[derive(Default)]
    struct Counter {
        count: i32,
        left: Option<BeanPtr<scanned::Left>>,
    }

    fn set_count(
        instance: &ComponentInstanceAnyPtr,
        value: Box<dyn Any>,
    ) -> Result<(), SetterError> {
        let value = downcast_value::<i32>(value)?;
        with_instance::<Counter>(instance, |counter| counter.count = value)
    }

    fn set_counter_left(
        instance: &ComponentInstanceAnyPtr,
        target: Option<ComponentInstanceAnyPtr>,
    ) -> Result<(), SetterError> {
        let target = downcast_reference::<Option<BeanPtr<scanned::Left>>>(target)?;
        with_instance::<Counter>(instance, |counter| counter.left = target)
    }

    impl Component for Counter {
        fn create() -> Result<Self, ErrorPtr> {
            Ok(Self::default())
        }

        fn metadata() -> ComponentMetadata {
            ComponentMetadata::new::<Self>(construct::<Self>)
                .with_name("counter")
                .with_value(ValueFieldMetadata::new::<i32>("count", "42", Some(set_count)))
                .with_reference(ReferenceFieldMetadata::new::<Option<BeanPtr<scanned::Left>>>(
                    "left",
                    None,
                    Some(set_counter_left),
                ))
        }
    }

    fn register_left() -> ComponentMetadata {
        scanned::Left::metadata()
    }

    fn register_right() -> ComponentMetadata {
        scanned::Right::metadata()
    }

    submit! {
        ComponentDefinitionRegisterer {
            register: register_left
        }
    }

    submit! {
        ComponentDefinitionRegisterer {
            register: register_right
        }
    }

    fn scanned_package() -> String {
        format!("{}::scanned", module_path!())
    }

    #[test]
    fn should_wire_cyclic_references() {
        let context = ApplicationContextBuilder::new()
            .with_base_package(scanned_package())
            .build();

        assert!(context.diagnostics().is_empty());
        assert_eq!(context.bean_names(), vec!["left", "right"]);

        let left = context.get_bean_typed::<scanned::Left>("left").unwrap();
        let right = context.get_bean_typed::<scanned::Right>("right").unwrap();

        assert!(Rc::ptr_eq(left.borrow().right.as_ref().unwrap(), &right));
        assert!(Rc::ptr_eq(right.borrow().left.as_ref().unwrap(), &left));
    }

    #[test]
    fn should_combine_scanned_and_manual_components() {
        let context = ApplicationContextBuilder::new()
            .with_base_package(scanned_package())
            .with_component::<Counter>()
            .build();

        assert!(context.diagnostics().is_empty());

        let counter = context.get_bean_typed::<Counter>("counter").unwrap();
        let left = context.get_bean_typed::<scanned::Left>("left").unwrap();
        assert_eq!(counter.borrow().count, 42);
        assert!(Rc::ptr_eq(counter.borrow().left.as_ref().unwrap(), &left));
    }

    #[test]
    fn should_report_unresolved_references_without_aborting() {
        let context = ApplicationContextBuilder::new()
            .with_component::<Counter>()
            .build();

        assert!(matches!(
            context.diagnostics(),
            [Diagnostic::UnresolvedReference { target, .. }] if target == "left"
        ));

        let counter = context.get_bean_typed::<Counter>("counter").unwrap();
        assert_eq!(counter.borrow().count, 42);
        assert!(counter.borrow().left.is_none());
    }

    #[test]
    fn should_reject_duplicate_names_by_default() {
        let context = ApplicationContextBuilder::new()
            .with_component::<Counter>()
            .with_component_metadata(scanned::Left::metadata().with_name("counter"))
            .build();

        assert!(matches!(
            context.diagnostics().first(),
            Some(Diagnostic::DuplicateComponentName(
                ComponentDefinitionRegistryError::DuplicateComponentName { .. }
            ))
        ));
        assert!(context.get_bean_typed::<Counter>("counter").is_ok());
    }

    #[test]
    fn should_override_duplicate_names_when_configured() {
        let context = ApplicationContextBuilder::new()
            .with_config(ContainerConfig::default().with_definition_overriding(true))
            .with_component::<Counter>()
            .with_component_metadata(scanned::Left::metadata().with_name("counter"))
            .build();

        assert!(context.get_bean_typed::<scanned::Left>("counter").is_ok());
        assert!(context.get_bean_typed::<Counter>("counter").is_err());
    }

    #[test]
    fn should_not_create_instances_on_lookup_miss() {
        let context = ApplicationContextBuilder::new().build();

        assert!(context.get_bean("missing").is_none());
        assert!(!context.contains_bean("missing"));
        assert!(context.bean_names().is_empty());
    }

    #[test]
    fn should_skip_components_failing_construction() {
        fn failing_constructor() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
            Err(Rc::new(std::fmt::Error) as ErrorPtr)
        }

        let context = ApplicationContextBuilder::new()
            .with_component_metadata(
                ComponentMetadata::new::<scanned::Left>(failing_constructor).with_name("left"),
            )
            .with_component::<Counter>()
            .build();

        assert!(!context.contains_bean("left"));
        assert!(context.contains_bean("counter"));
        assert!(matches!(
            context.diagnostics(),
            [
                Diagnostic::Instantiation { .. },
                Diagnostic::UnresolvedReference { .. }
            ]
        ));
    }
}
