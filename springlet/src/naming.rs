//! Default component naming.
//!
//! Components registered without an explicit name are named after their type: the namespace is
//! stripped from the fully-qualified type name and the first character of the remaining simple
//! name is lower-cased, e.g. `my_app::entity::Class` becomes `class`. Autowiring by type uses the
//! very same rule on the declared type of a reference field, which is what makes the two meet.

/// Derives a component name from a fully-qualified type name, as returned by
/// [type_name](std::any::type_name).
pub fn derive_component_name(type_name: &str) -> String {
    let simple_name = simple_type_name(type_name);
    let mut chars = simple_name.chars();

    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strips the namespace from a type name. Paths inside generic arguments are left intact.
pub fn simple_type_name(type_name: &str) -> &str {
    let path_end = type_name.find('<').unwrap_or(type_name.len());
    type_name[..path_end]
        .rfind("::")
        .map(|separator| &type_name[separator + 2..])
        .unwrap_or(type_name)
}
