use crate::attributes::{ComponentAttributes, DefaultDefinition, FieldAttributes, COMPONENT};
use itertools::Itertools;
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{
    Attribute, Data, DataStruct, DeriveInput, Error, Field, Fields, Index, Member, Result,
};

struct InjectedField<'a> {
    member: Member,
    name: String,
    field: &'a Field,
    attributes: FieldAttributes,
}

impl<'a> InjectedField<'a> {
    fn new(index: usize, field: &'a Field) -> Result<Self> {
        let (member, name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
            None => (
                Member::Unnamed(Index {
                    index: index as u32,
                    span: field.span(),
                }),
                index.to_string(),
            ),
        };

        Ok(Self {
            member,
            name,
            field,
            attributes: FieldAttributes::try_from(field.attrs.as_slice())?,
        })
    }

    fn setter_ident(&self) -> Ident {
        format_ident!("__springlet_set_{}", self.name)
    }

    fn generate_initialization(&self) -> TokenStream {
        match &self.attributes.default {
            Some(DefaultDefinition::Expr(path)) => quote!(#path()),
            Some(DefaultDefinition::Default) | None => quote!(::std::default::Default::default()),
        }
    }
}

fn collect_fields(fields: &Fields) -> Result<Vec<InjectedField>> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| InjectedField::new(index, field))
        .try_collect()
}

fn generate_creation(fields: &Fields, injected_fields: &[InjectedField]) -> TokenStream {
    let initializers = injected_fields.iter().map(|field| {
        let member = &field.member;
        let initialization = field.generate_initialization();
        quote!(#member: #initialization)
    });

    match fields {
        Fields::Unit => quote!(Self),
        _ => quote!(Self { #(#initializers),* }),
    }
}

fn generate_value_field(ident: &Ident, field: &InjectedField) -> Option<(TokenStream, TokenStream)> {
    let literal = field.attributes.value.as_ref()?;
    let member = &field.member;
    let name = &field.name;
    let ty = &field.field.ty;
    let setter = field.setter_ident();

    Some((
        quote! {
            fn #setter(
                instance: &::springlet::component::ComponentInstanceAnyPtr,
                value: ::std::boxed::Box<dyn ::std::any::Any>,
            ) -> ::std::result::Result<(), ::springlet::SetterError> {
                let value = ::springlet::component::downcast_value::<#ty>(value)?;
                ::springlet::component::with_instance::<#ident>(instance, |instance| {
                    instance.#member = value;
                })
            }
        },
        quote! {
            .with_value(::springlet::component_registry::ValueFieldMetadata::new::<#ty>(
                #name,
                #literal,
                ::std::option::Option::Some(#setter),
            ))
        },
    ))
}

fn generate_reference_field(
    ident: &Ident,
    field: &InjectedField,
) -> Option<(TokenStream, TokenStream)> {
    if !field.attributes.autowired {
        return None;
    }

    let member = &field.member;
    let name = &field.name;
    let ty = &field.field.ty;
    let setter = field.setter_ident();
    let qualifier = match &field.attributes.qualifier {
        Some(qualifier) => quote!(::std::option::Option::Some(#qualifier)),
        None => quote!(::std::option::Option::None),
    };

    Some((
        quote! {
            fn #setter(
                instance: &::springlet::component::ComponentInstanceAnyPtr,
                target: ::std::option::Option<::springlet::component::ComponentInstanceAnyPtr>,
            ) -> ::std::result::Result<(), ::springlet::SetterError> {
                let target = ::springlet::component::downcast_reference::<#ty>(target)?;
                ::springlet::component::with_instance::<#ident>(instance, |instance| {
                    instance.#member = target;
                })
            }
        },
        quote! {
            .with_reference(::springlet::component_registry::ReferenceFieldMetadata::new::<#ty>(
                #name,
                #qualifier,
                ::std::option::Option::Some(#setter),
            ))
        },
    ))
}

fn extract_component_attributes(attributes: &[Attribute]) -> Result<ComponentAttributes> {
    attributes
        .iter()
        .filter(|attribute| attribute.path().is_ident(COMPONENT))
        .map(ComponentAttributes::try_from)
        .next()
        .transpose()
        .map(Option::unwrap_or_default)
}

pub fn expand_component(input: &DeriveInput) -> Result<TokenStream> {
    let fields = if let Data::Struct(DataStruct { fields, .. }) = &input.data {
        fields
    } else {
        return Err(Error::new(
            input.span(),
            "Can only derive Component on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Generic components are not supported!",
        ));
    }

    let ident = &input.ident;
    let attributes = extract_component_attributes(&input.attrs)?;
    let injected_fields = collect_fields(fields)?;

    let creation = match &attributes.constructor {
        Some(constructor) => quote!(#constructor()),
        None => {
            let creation = generate_creation(fields, &injected_fields);
            quote!(::std::result::Result::Ok(#creation))
        }
    };

    let name = attributes
        .name
        .map(|name| quote!(.with_name(#name)))
        .unwrap_or_default();

    let (value_setters, values): (Vec<_>, Vec<_>) = injected_fields
        .iter()
        .filter_map(|field| generate_value_field(ident, field))
        .unzip();

    let (reference_setters, references): (Vec<_>, Vec<_>) = injected_fields
        .iter()
        .filter_map(|field| generate_reference_field(ident, field))
        .unzip();

    let register = Ident::new("register", Span::call_site());

    Ok(quote! {
        #[automatically_derived]
        impl ::springlet::component::Component for #ident {
            fn create() -> ::std::result::Result<Self, ::springlet::ErrorPtr> {
                #creation
            }

            fn metadata() -> ::springlet::component_registry::ComponentMetadata {
                #(#value_setters)*
                #(#reference_setters)*

                ::springlet::component_registry::ComponentMetadata::new::<#ident>(
                    ::springlet::component::construct::<#ident>,
                )
                .with_module_path(::std::module_path!())
                #name
                #(#values)*
                #(#references)*
            }
        }

        const _: () = {
            fn #register() -> ::springlet::component_registry::ComponentMetadata {
                <#ident as ::springlet::component::Component>::metadata()
            }

            ::springlet::component_registry::internal::submit! {
                ::springlet::component_registry::internal::ComponentDefinitionRegisterer {
                    register: #register
                }
            };
        };
    })
}
