//! Constructed component instances (beans) are kept in a [BeanCache], keyed by component name.
//! The cache is filled while the container bootstraps and only read afterwards. There is no
//! distinction between singleton and prototype instances - every component has exactly one
//! instance.

use crate::component::ComponentInstanceAnyPtr;
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;

/// A name-keyed store of component instances.
#[cfg_attr(test, automock)]
pub trait BeanCache {
    /// Gets an instance with the given name, if present.
    fn instance(&self, name: &str) -> Option<ComponentInstanceAnyPtr>;

    /// Stores given instance, replacing any previous instance with the same name.
    fn store_instance(&mut self, name: &str, instance: ComponentInstanceAnyPtr);

    /// Names of all stored instances, in no particular order.
    fn names(&self) -> Vec<String>;
}

/// Default [BeanCache] backed by a hash map.
#[derive(Default)]
pub struct NamedBeanCache {
    instances: FxHashMap<String, ComponentInstanceAnyPtr>,
}

impl BeanCache for NamedBeanCache {
    #[inline]
    fn instance(&self, name: &str) -> Option<ComponentInstanceAnyPtr> {
        self.instances.get(name).cloned()
    }

    #[inline]
    fn store_instance(&mut self, name: &str, instance: ComponentInstanceAnyPtr) {
        self.instances.insert(name.to_string(), instance);
    }

    fn names(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }
}
