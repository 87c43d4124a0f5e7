//! A miniature, eager dependency injection container in the spirit of Spring's annotation-based
//! application context.
//!
//! Components are plain structs deriving [Component]. The container scans a package (module path)
//! for them, default-constructs each one, assigns literal values to fields marked with
//! `#[value(...)]` and finally injects references between components, either by an explicit
//! `#[qualifier(...)]` name or by the name derived from the referenced type. See
//! [component] for declaring components and [context] for running the container.
//!
//! ### Features
//!
//! * `derive` - automatically derive `Component` (enabled by default)

pub mod autowire;
pub mod cache;
pub mod component;
pub mod component_registry;
pub mod config;
pub mod context;
mod error;
pub mod instance_builder;
pub mod instance_provider;
pub mod naming;
pub mod value;

pub use error::{
    ComponentDefinitionRegistryError, ComponentInstanceProviderError, Diagnostic, ErrorPtr,
    SetterError, ValueError,
};

#[cfg(feature = "derive")]
pub use springlet_derive::Component;
