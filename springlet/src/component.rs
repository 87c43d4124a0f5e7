//! One of the basic blocks of dependency injection is a [Component]. Components are objects
//! managed by the container: they get default-constructed, receive literal values for marked
//! fields and references to other components.
//!
//! ## Registering components
//!
//! Any type which wants to be managed by the container needs to implement `Component`. For
//! convenience, the trait can be automatically derived with all infrastructure if the `derive`
//! feature is enabled:
//!
//! ```
//! use springlet::component::BeanPtr;
//! use springlet::Component;
//!
//! #[derive(Component)]
//! #[component(name = "cls")]
//! struct Class {
//!     #[value("1001")]
//!     cid: i32,
//!     #[value("精英班")]
//!     class_name: String,
//! }
//!
//! #[derive(Component)]
//! struct Student {
//!     #[value("张三")]
//!     name: String,
//!     // injected by name
//!     #[autowired]
//!     #[qualifier("cls")]
//!     clazz: Option<BeanPtr<Class>>,
//!     // not a value nor a reference - initialized with a custom expression
//!     #[component(default = "default_grade")]
//!     grade: u8,
//! }
//!
//! fn default_grade() -> u8 {
//!     1
//! }
//! ```
//!
//! ### Supported `#[component]` struct configuration
//!
//! * `name = "name"` - use given name as the component name, instead of the one derived from the
//! type name (see [crate::naming])
//! * `constructor = "expr"` - call `expr()` to construct the component, instead of initializing
//! every field with its default; must return `Result<Self, ErrorPtr>`
//!
//! ### Supported field attributes
//!
//! * `#[value("literal")]` - parse the literal and assign it after construction; supported field
//! types are listed in [ValueKind](crate::value::ValueKind), other types keep their default
//! * `#[autowired]` - inject another component; the field must be an `Option<BeanPtr<T>>`
//! * `#[qualifier("name")]` - together with `#[autowired]`, inject the component named `name`
//! instead of the one named after `T`
//! * `#[component(default = "expr")]` - call `expr()` for the initial value, instead of
//! `Default::default()`

use crate::component_registry::ComponentMetadata;
use crate::error::{ErrorPtr, SetterError};
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, mutable handle to a component instance.
pub type BeanPtr<T> = Rc<RefCell<T>>;

/// Type-erased [BeanPtr]. The pointee is always a `RefCell<T>` of the concrete component type.
pub type ComponentInstanceAnyPtr = Rc<dyn Any>;

/// Base trait for components managed by the container. Please see the module-level documentation
/// for more information.
pub trait Component: Sized + 'static {
    /// Creates a fresh, not yet injected instance.
    fn create() -> Result<Self, ErrorPtr>;

    /// Returns registration information for this component.
    fn metadata() -> ComponentMetadata;
}

/// Field types which can hold an injected reference to another component.
pub trait Reference: Sized + 'static {
    /// Concrete component type being referenced.
    type Target: 'static;

    fn from_bean(bean: Option<BeanPtr<Self::Target>>) -> Self;
}

impl<T: 'static> Reference for Option<BeanPtr<T>> {
    type Target = T;

    #[inline]
    fn from_bean(bean: Option<BeanPtr<Self::Target>>) -> Self {
        bean
    }
}

/// Type-erased constructor for a [Component].
pub fn construct<T: Component>() -> Result<ComponentInstanceAnyPtr, ErrorPtr> {
    T::create().map(|instance| Rc::new(RefCell::new(instance)) as ComponentInstanceAnyPtr)
}

/// Mutably borrows the concrete component behind a type-erased instance.
pub fn with_instance<T: 'static>(
    instance: &ComponentInstanceAnyPtr,
    f: impl FnOnce(&mut T),
) -> Result<(), SetterError> {
    let cell = (**instance)
        .downcast_ref::<RefCell<T>>()
        .ok_or(SetterError::IncompatibleInstance(type_name::<T>()))?;
    let mut instance = cell
        .try_borrow_mut()
        .map_err(|_| SetterError::InstanceBorrowed(type_name::<T>()))?;

    f(&mut instance);
    Ok(())
}

/// Unpacks a type-erased [Value](crate::value::Value) for a setter accepting `V`.
pub fn downcast_value<V: 'static>(value: Box<dyn Any>) -> Result<V, SetterError> {
    value
        .downcast::<V>()
        .map(|value| *value)
        .map_err(|_| SetterError::TypeMismatch {
            expected: type_name::<V>(),
        })
}

/// Converts a resolved (or missing) target instance to a reference field value.
pub fn downcast_reference<R: Reference>(
    target: Option<ComponentInstanceAnyPtr>,
) -> Result<R, SetterError> {
    target
        .map(|target| {
            target
                .downcast::<RefCell<R::Target>>()
                .map_err(|_| SetterError::TypeMismatch {
                    expected: type_name::<R::Target>(),
                })
        })
        .transpose()
        .map(R::from_bean)
}
