use crate::component::{BeanPtr, ComponentInstanceAnyPtr};
use crate::error::ComponentInstanceProviderError;
use std::any::type_name;
use std::cell::RefCell;

/// Generic provider for component instances.
pub trait ComponentInstanceProvider {
    /// Returns the instance registered under the given name, if any. Never creates new instances.
    fn instance_by_name(&self, name: &str) -> Option<ComponentInstanceAnyPtr>;
}

/// Helper trait for [ComponentInstanceProvider] providing strongly-typed access.
pub trait TypedComponentInstanceProvider {
    /// Typesafe version of [ComponentInstanceProvider::instance_by_name].
    fn instance_by_name_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<BeanPtr<T>, ComponentInstanceProviderError>;

    /// Tries to get an instance like [TypedComponentInstanceProvider::instance_by_name_typed] does,
    /// but returns `None` on missing instance.
    fn instance_by_name_option<T: 'static>(
        &self,
        name: &str,
    ) -> Result<Option<BeanPtr<T>>, ComponentInstanceProviderError>;
}

impl<CIP: ComponentInstanceProvider + ?Sized> TypedComponentInstanceProvider for CIP {
    fn instance_by_name_typed<T: 'static>(
        &self,
        name: &str,
    ) -> Result<BeanPtr<T>, ComponentInstanceProviderError> {
        self.instance_by_name_option(name)?
            .ok_or_else(|| ComponentInstanceProviderError::NoNamedInstance(name.to_string()))
    }

    fn instance_by_name_option<T: 'static>(
        &self,
        name: &str,
    ) -> Result<Option<BeanPtr<T>>, ComponentInstanceProviderError> {
        self.instance_by_name(name)
            .map(|instance| {
                instance.downcast::<RefCell<T>>().map_err(|_| {
                    ComponentInstanceProviderError::IncompatibleComponent {
                        name: name.to_string(),
                        type_name: type_name::<T>(),
                    }
                })
            })
            .transpose()
    }
}
