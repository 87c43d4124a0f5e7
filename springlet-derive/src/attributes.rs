use syn::{Attribute, Error, ExprPath, LitStr, Token};

pub const COMPONENT: &str = "component";
pub const VALUE: &str = "value";
pub const AUTOWIRED: &str = "autowired";
pub const QUALIFIER: &str = "qualifier";

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

/// Field configuration, gathered from all attributes on the field.
#[derive(Default)]
pub struct FieldAttributes {
    pub default: Option<DefaultDefinition>,
    pub value: Option<LitStr>,
    pub autowired: bool,
    pub qualifier: Option<LitStr>,
}

impl TryFrom<&[Attribute]> for FieldAttributes {
    type Error = Error;

    fn try_from(attributes: &[Attribute]) -> Result<Self, Self::Error> {
        let mut result = Self::default();
        let mut qualifier_attribute = None;

        for attribute in attributes {
            let path = attribute.path();
            if path.is_ident(COMPONENT) {
                attribute.parse_nested_meta(|meta| {
                    if meta.path.is_ident("default") {
                        if meta.input.peek(Token![=]) {
                            let value = meta.value()?;
                            let expr: LitStr = value.parse()?;
                            result.default = Some(DefaultDefinition::Expr(expr.parse()?));
                        } else {
                            result.default = Some(DefaultDefinition::Default);
                        }

                        Ok(())
                    } else {
                        Err(meta.error("unsupported component field attribute"))
                    }
                })?;
            } else if path.is_ident(VALUE) {
                result.value = Some(attribute.parse_args()?);
            } else if path.is_ident(AUTOWIRED) {
                attribute.meta.require_path_only()?;
                result.autowired = true;
            } else if path.is_ident(QUALIFIER) {
                result.qualifier = Some(attribute.parse_args()?);
                qualifier_attribute = Some(attribute);
            }
        }

        if let Some(attribute) = qualifier_attribute {
            if !result.autowired {
                return Err(Error::new_spanned(
                    attribute,
                    "#[qualifier] can only be used together with #[autowired]",
                ));
            }
        }

        if let (Some(value), true) = (&result.value, result.autowired) {
            return Err(Error::new_spanned(
                value,
                "A field cannot be both #[value] and #[autowired]",
            ));
        }

        Ok(result)
    }
}

#[derive(Default)]
pub struct ComponentAttributes {
    pub name: Option<LitStr>,
    pub constructor: Option<ExprPath>,
}

impl TryFrom<&Attribute> for ComponentAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self, Self::Error> {
        let mut name = None;
        let mut constructor = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value().and_then(|value| value.parse())?);
            } else if meta.path.is_ident("constructor") {
                let expr: LitStr = meta.value()?.parse()?;
                constructor = Some(expr.parse()?);
            } else {
                return Err(meta.error("unsupported component attribute"));
            }

            Ok(())
        })?;

        Ok(Self { name, constructor })
    }
}
