//! Functionality related to registering definitions of components. The container creates
//! [Component](crate::component::Component) instances based on those definitions, which can be
//! registered automatically (by deriving `Component` and [scanning](scan) a package) or manually.

use crate::component::{ComponentInstanceAnyPtr, Reference};
use crate::error::{ComponentDefinitionRegistryError, ErrorPtr, SetterError};
use crate::naming::derive_component_name;
use crate::value::ValueKind;
use derivative::Derivative;
use fxhash::FxHashMap;
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, Any};
use tracing::debug;

/// Type-erased component constructor.
pub type Constructor = fn() -> Result<ComponentInstanceAnyPtr, ErrorPtr>;

/// Assigns a coerced literal value to a field of the given instance. The value is a type-erased
/// [Value](crate::value::Value) - setters should report [SetterError::TypeMismatch] if they don't
/// accept the given type.
pub type ValueSetter = fn(&ComponentInstanceAnyPtr, Box<dyn Any>) -> Result<(), SetterError>;

/// Assigns a resolved target instance (or none, if the target is missing) to a reference field of
/// the given instance.
pub type ReferenceSetter =
    fn(&ComponentInstanceAnyPtr, Option<ComponentInstanceAnyPtr>) -> Result<(), SetterError>;

/// A field marked for literal value injection.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ValueFieldMetadata {
    pub field: &'static str,

    /// Unparsed literal to inject.
    pub literal: &'static str,

    /// Name of the declared field type, used for reporting.
    pub declared_type: &'static str,

    /// Decides how the literal is parsed.
    pub kind: ValueKind,

    /// `None` means there's no way to assign the field.
    #[derivative(Debug = "ignore")]
    pub setter: Option<ValueSetter>,
}

impl ValueFieldMetadata {
    /// Creates metadata for a field of type `T`.
    pub fn new<T: 'static>(
        field: &'static str,
        literal: &'static str,
        setter: Option<ValueSetter>,
    ) -> Self {
        Self {
            field,
            literal,
            declared_type: type_name::<T>(),
            kind: ValueKind::of::<T>(),
            setter,
        }
    }
}

/// A field marked for reference injection.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ReferenceFieldMetadata {
    pub field: &'static str,

    /// Explicit name of the target component. When absent, the target is looked up by the name
    /// derived from `target_type`.
    pub qualifier: Option<&'static str>,

    /// Fully-qualified name of the referenced component type.
    pub target_type: &'static str,

    #[derivative(Debug = "ignore")]
    pub setter: Option<ReferenceSetter>,
}

impl ReferenceFieldMetadata {
    /// Creates metadata for a reference field of type `R`.
    pub fn new<R: Reference>(
        field: &'static str,
        qualifier: Option<&'static str>,
        setter: Option<ReferenceSetter>,
    ) -> Self {
        Self {
            field,
            qualifier,
            target_type: type_name::<R::Target>(),
            setter,
        }
    }

    /// Name of the component which should be injected into this field.
    pub fn target_name(&self) -> String {
        self.qualifier
            .map(str::to_string)
            .unwrap_or_else(|| derive_component_name(self.target_type))
    }
}

/// Registration information for a [Component](crate::component::Component).
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ComponentMetadata {
    /// Explicit component name. Empty or missing names are replaced by names derived from
    /// `type_name`.
    pub name: Option<String>,

    /// Fully-qualified type name.
    pub type_name: &'static str,

    /// Module in which the component is declared. Used when scanning packages.
    pub module_path: &'static str,

    #[derivative(Debug = "ignore")]
    pub constructor: Constructor,

    pub values: Vec<ValueFieldMetadata>,

    pub references: Vec<ReferenceFieldMetadata>,
}

impl ComponentMetadata {
    /// Creates metadata for an unnamed component with no injected fields. The module path is
    /// derived from the type name.
    pub fn new<T: 'static>(constructor: Constructor) -> Self {
        let type_name = type_name::<T>();
        let path_end = type_name.find('<').unwrap_or(type_name.len());
        let module_path = type_name[..path_end]
            .rfind("::")
            .map(|separator| &type_name[..separator])
            .unwrap_or_default();

        Self {
            name: None,
            type_name,
            module_path,
            constructor,
            values: vec![],
            references: vec![],
        }
    }

    pub fn with_name<T: ToString>(mut self, name: T) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_module_path(mut self, module_path: &'static str) -> Self {
        self.module_path = module_path;
        self
    }

    pub fn with_value(mut self, value: ValueFieldMetadata) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_reference(mut self, reference: ReferenceFieldMetadata) -> Self {
        self.references.push(reference);
        self
    }

    /// Returns the name under which this component is registered.
    pub fn component_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => derive_component_name(self.type_name),
        }
    }

    /// Checks if the component is declared in `package` or any of its nested modules.
    pub fn is_in_package(&self, package: &str) -> bool {
        self.module_path
            .strip_prefix(package)
            .map(|rest| rest.is_empty() || rest.starts_with("::"))
            .unwrap_or(false)
    }
}

/// Definition for a component registered in a definition registry.
#[derive(Clone, Debug)]
pub struct ComponentDefinition {
    /// Unique name of the component within the registry.
    pub name: String,

    pub metadata: ComponentMetadata,
}

/// A registry of component definitions which drive the creation of component instances.
#[cfg_attr(test, automock)]
pub trait ComponentDefinitionRegistry {
    /// Adds a new definition. Handling of duplicate component names depends on
    /// `allow_definition_overriding`.
    fn register_component(
        &mut self,
        metadata: ComponentMetadata,
    ) -> Result<(), ComponentDefinitionRegistryError>;

    /// Returns a definition with given name.
    fn component_by_name(&self, name: &str) -> Option<ComponentDefinition>;

    /// Checks if there's a definition with given name.
    fn is_name_registered(&self, name: &str) -> bool;

    /// Returns all definitions in registration order.
    fn all_definitions(&self) -> Vec<ComponentDefinition>;
}

/// Registers every given definition, collecting rejected ones instead of stopping at the first.
pub fn register_all<R: ComponentDefinitionRegistry + ?Sized>(
    registry: &mut R,
    components: impl IntoIterator<Item = ComponentMetadata>,
) -> Vec<ComponentDefinitionRegistryError> {
    components
        .into_iter()
        .filter_map(|metadata| registry.register_component(metadata).err())
        .collect()
}

/// Registry of component definitions keyed by component name.
#[derive(Clone, Debug, Default)]
pub struct NamedComponentDefinitionRegistry {
    definitions: Vec<ComponentDefinition>,
    names: FxHashMap<String, usize>,
    allow_definition_overriding: bool,
}

impl NamedComponentDefinitionRegistry {
    /// Creates an empty registry. With `allow_definition_overriding`, registering a name for the
    /// second time replaces the previous definition; otherwise the new one is rejected.
    pub fn new(allow_definition_overriding: bool) -> Self {
        Self {
            allow_definition_overriding,
            ..Default::default()
        }
    }
}

impl ComponentDefinitionRegistry for NamedComponentDefinitionRegistry {
    fn register_component(
        &mut self,
        metadata: ComponentMetadata,
    ) -> Result<(), ComponentDefinitionRegistryError> {
        let definition = ComponentDefinition {
            name: metadata.component_name(),
            metadata,
        };

        if let Some(index) = self.names.get(&definition.name) {
            if !self.allow_definition_overriding {
                return Err(ComponentDefinitionRegistryError::DuplicateComponentName {
                    name: definition.name,
                    type_name: definition.metadata.type_name,
                });
            }

            debug!(
                name = %definition.name,
                type_name = definition.metadata.type_name,
                "Overriding component definition."
            );

            self.definitions[*index] = definition;
        } else {
            self.names
                .insert(definition.name.clone(), self.definitions.len());
            self.definitions.push(definition);
        }

        Ok(())
    }

    #[inline]
    fn component_by_name(&self, name: &str) -> Option<ComponentDefinition> {
        self.names
            .get(name)
            .and_then(|index| self.definitions.get(*index))
            .cloned()
    }

    #[inline]
    fn is_name_registered(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[inline]
    fn all_definitions(&self) -> Vec<ComponentDefinition> {
        self.definitions.clone()
    }
}

/// Collects metadata of all statically registered components declared in `base_package` or its
/// nested modules. The result is ordered by component name and type name, so registration order
/// does not depend on link order.
pub fn scan(base_package: &str) -> Vec<ComponentMetadata> {
    inventory::iter::<internal::ComponentDefinitionRegisterer>
        .into_iter()
        .map(|registerer| (registerer.register)())
        .filter(|metadata| metadata.is_in_package(base_package))
        .map(|metadata| (metadata.component_name(), metadata))
        .sorted_by(|(lhs_name, lhs), (rhs_name, rhs)| {
            lhs_name
                .cmp(rhs_name)
                .then_with(|| lhs.type_name.cmp(rhs.type_name))
        })
        .map(|(_, metadata)| metadata)
        .collect()
}

#[doc(hidden)]
pub mod internal {
    use crate::component_registry::ComponentMetadata;
    use inventory::collect;
    pub use inventory::submit;

    pub struct ComponentDefinitionRegisterer {
        pub register: fn() -> ComponentMetadata,
    }

    collect!(ComponentDefinitionRegisterer);
}
