use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr, Path,
    PathArguments, Type,
};

/// Derive macro for mapper introspection.
///
/// Generates an `impl reshape_api::Mappable` for a struct with named fields:
///
/// - `shape()`: the descriptor table, one `FieldDescriptor` per field.
/// - `get` / `set`: read any field, write leaf fields.
/// - `object_mut`: reset a nested object field to its default and hand it out.
/// - `append`: default-construct, fill and append one sequence element.
///
/// Nested object and element types must implement `Mappable` and `Default`.
///
/// # Example
///
/// ```ignore
/// #[derive(Mappable, Default)]
/// pub struct RequestDto {
///     #[mapper(adapter = StringToUuid)]
///     pub requester_id: Option<Uuid>,
///
///     #[mapper(bind = "id")]
///     pub identifier: Option<String>,
/// }
/// ```
///
/// Field attributes:
/// - `bind = "name"` (repeatable): receive source leaf field `name` when the
///   destination has no field of that name.
/// - `adapter = Path`: `TypeAdapter` used when the incoming leaf kind differs.
/// - `skip`: hide the field from the mapper.
/// - `leaf` / `object`: override the leaf/object classification of the type.
///
/// Supported field types: leaves (`bool`, signed and unsigned integers, `f32`,
/// `f64`, `char`, `String`, `Uuid`, chrono `NaiveDate` and `DateTime<Utc>`,
/// `HashMap`, `BTreeMap`), objects (`T`, `Box<T>`), sequences (`Vec`,
/// `VecDeque`, `BTreeSet`, `HashSet` of `T` or `Option<T>`), each optionally
/// wrapped in `Option`.
#[proc_macro_derive(Mappable, attributes(mapper))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

const LEAF_TYPES: &[&str] = &[
    "bool", "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "f32", "f64",
    "char", "String", "Uuid", "NaiveDate", "DateTime", "HashMap", "BTreeMap",
];
const CONTAINER_TYPES: &[&str] = &["Vec", "VecDeque", "BTreeSet", "HashSet"];

/// Parsed `#[mapper(...)]` options of one field.
#[derive(Default)]
struct FieldAttrs {
    bindings: Vec<String>,
    adapter: Option<Path>,
    skip: bool,
    force_leaf: bool,
    force_object: bool,
}

/// How a field is stored, decided from its type syntax.
enum Slot<'a> {
    Leaf {
        ty: &'a Type,
        optional: bool,
    },
    Object {
        ty: &'a Type,
        optional: bool,
        boxed: bool,
    },
    Sequence {
        container: &'a Type,
        optional: bool,
        element: &'a Type,
        element_optional: bool,
        element_leaf: bool,
    },
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let type_name_str = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Mappable only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Mappable only supports structs")),
    };

    let mut descriptor_tokens = Vec::new();
    let mut get_tokens = Vec::new();
    let mut set_tokens = Vec::new();
    let mut object_tokens = Vec::new();
    let mut append_tokens = Vec::new();

    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = ident.to_string();
        let slot = classify(&field.ty, &attrs)?;

        let kind_expr = kind_tokens(&slot)?;
        let bindings = &attrs.bindings;
        let adapter_expr = match &attrs.adapter {
            Some(path) => quote! { Some(reshape_api::adapter::AdapterRef::of::<#path>()) },
            None => quote! { None },
        };
        descriptor_tokens.push(quote! {
            reshape_api::shape::FieldDescriptor {
                name: #field_name_str.to_string(),
                kind: #kind_expr,
                bindings: vec![#(#bindings.to_string()),*],
                adapter: #adapter_expr,
                adapter_name: None,
            }
        });

        get_tokens.push(get_arm(ident, &field_name_str, &slot));

        let not = |expected: &str| {
            quote! {
                #field_name_str => Err(reshape_api::error::FieldError::field_kind(
                    #type_name_str, #field_name_str, #expected,
                )),
            }
        };

        match &slot {
            Slot::Leaf { optional, .. } => {
                let writer = if *optional {
                    quote! { reshape_api::slot::write_optional_leaf }
                } else {
                    quote! { reshape_api::slot::write_leaf }
                };
                set_tokens.push(quote! {
                    #field_name_str => #writer(&mut self.#ident, value, #field_name_str),
                });
                object_tokens.push(not("an object"));
                append_tokens.push(not("a sequence of objects"));
            }
            Slot::Object { optional, boxed, .. } => {
                let reset = match (optional, boxed) {
                    (false, false) => quote! {
                        self.#ident = ::std::default::Default::default();
                        let slot: &mut dyn reshape_api::Mappable = &mut self.#ident;
                    },
                    (false, true) => quote! {
                        self.#ident = ::std::boxed::Box::default();
                        let slot: &mut dyn reshape_api::Mappable = &mut *self.#ident;
                    },
                    (true, false) => quote! {
                        let slot: &mut dyn reshape_api::Mappable =
                            self.#ident.insert(::std::default::Default::default());
                    },
                    (true, true) => quote! {
                        let slot: &mut dyn reshape_api::Mappable =
                            &mut **self.#ident.insert(::std::boxed::Box::default());
                    },
                };
                object_tokens.push(quote! {
                    #field_name_str => {
                        #reset
                        Ok(slot)
                    }
                });
                set_tokens.push(not("a leaf"));
                append_tokens.push(not("a sequence of objects"));
            }
            Slot::Sequence {
                optional,
                element,
                element_optional,
                element_leaf,
                ..
            } => {
                set_tokens.push(not("a leaf"));
                object_tokens.push(not("an object"));
                if *element_leaf {
                    append_tokens.push(not("a sequence of objects"));
                    continue;
                }
                let container = if *optional {
                    quote! { self.#ident.get_or_insert_with(::std::default::Default::default) }
                } else {
                    quote! { &mut self.#ident }
                };
                let item = if *element_optional {
                    quote! { Some(item) }
                } else {
                    quote! { item }
                };
                append_tokens.push(quote! {
                    #field_name_str => {
                        let mut item = <#element as ::std::default::Default>::default();
                        fill(&mut item)?;
                        reshape_api::slot::Container::append(#container, #item);
                        Ok(())
                    }
                });
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics reshape_api::Mappable for #name #ty_generics #where_clause {
            fn shape(&self) -> reshape_api::shape::TypeShape {
                reshape_api::shape::TypeShape {
                    name: #type_name_str.to_string(),
                    fields: vec![
                        #(#descriptor_tokens),*
                    ],
                }
            }

            fn get(&self, name: &str) -> Option<reshape_api::value::Value<'_>> {
                match name {
                    #(#get_tokens)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                name: &str,
                value: reshape_api::value::Scalar,
            ) -> Result<(), reshape_api::error::FieldError> {
                match name {
                    #(#set_tokens)*
                    _ => Err(reshape_api::error::FieldError::unknown_field(#type_name_str, name)),
                }
            }

            fn object_mut(
                &mut self,
                name: &str,
            ) -> Result<&mut dyn reshape_api::Mappable, reshape_api::error::FieldError> {
                match name {
                    #(#object_tokens)*
                    _ => Err(reshape_api::error::FieldError::unknown_field(#type_name_str, name)),
                }
            }

            #[allow(unused_variables)]
            fn append(
                &mut self,
                name: &str,
                fill: &mut reshape_api::mappable::Fill<'_>,
            ) -> Result<(), reshape_api::error::FieldError> {
                match name {
                    #(#append_tokens)*
                    _ => Err(reshape_api::error::FieldError::unknown_field(#type_name_str, name)),
                }
            }
        }
    };

    Ok(expanded)
}

fn parse_field_attrs(field: &Field) -> Result<FieldAttrs, syn::Error> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("mapper") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("bind") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.bindings.push(value.value());
            } else if meta.path.is_ident("adapter") {
                let path: Path = meta.value()?.parse()?;
                attrs.adapter = Some(path);
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("leaf") {
                attrs.force_leaf = true;
            } else if meta.path.is_ident("object") {
                attrs.force_object = true;
            } else {
                return Err(meta.error(
                    "unknown mapper option (expected bind, adapter, skip, leaf or object)",
                ));
            }
            Ok(())
        })?;
    }
    if attrs.force_leaf && attrs.force_object {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "`leaf` and `object` are mutually exclusive",
        ));
    }
    Ok(attrs)
}

fn classify<'a>(ty: &'a Type, attrs: &FieldAttrs) -> Result<Slot<'a>, syn::Error> {
    let (inner, optional) = match generic_arg("Option", ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };

    let ident = type_ident_name(inner)
        .ok_or_else(|| syn::Error::new_spanned(ty, "unsupported type for Mappable"))?;

    if CONTAINER_TYPES.contains(&ident.as_str()) && !attrs.force_leaf && !attrs.force_object {
        let element = generic_arg(&ident, inner)
            .ok_or_else(|| syn::Error::new_spanned(inner, "container needs an element type"))?;
        let (element, element_optional) = match generic_arg("Option", element) {
            Some(e) => (e, true),
            None => (element, false),
        };
        let element_name = type_ident_name(element)
            .ok_or_else(|| syn::Error::new_spanned(element, "unsupported element type"))?;
        return Ok(Slot::Sequence {
            container: inner,
            optional,
            element,
            element_optional,
            element_leaf: LEAF_TYPES.contains(&element_name.as_str()),
        });
    }

    if attrs.force_leaf || (!attrs.force_object && LEAF_TYPES.contains(&ident.as_str())) {
        return Ok(Slot::Leaf { ty: inner, optional });
    }

    match generic_arg("Box", inner) {
        Some(boxed) => Ok(Slot::Object {
            ty: boxed,
            optional,
            boxed: true,
        }),
        None => Ok(Slot::Object {
            ty: inner,
            optional,
            boxed: false,
        }),
    }
}

fn kind_tokens(slot: &Slot<'_>) -> Result<TokenStream2, syn::Error> {
    let tokens = match slot {
        Slot::Leaf { ty, .. } => quote! {
            reshape_api::shape::FieldKind::Leaf(<#ty as reshape_api::value::LeafType>::KIND)
        },
        Slot::Object { ty, .. } => {
            let type_name = object_type_name(ty)?;
            quote! {
                reshape_api::shape::FieldKind::Object { type_name: #type_name.to_string() }
            }
        }
        Slot::Sequence {
            container,
            element,
            element_leaf,
            ..
        } => {
            let element_kind = if *element_leaf {
                quote! {
                    reshape_api::shape::ElementKind::Leaf(
                        <#element as reshape_api::value::LeafType>::KIND
                    )
                }
            } else {
                let type_name = object_type_name(element)?;
                quote! {
                    reshape_api::shape::ElementKind::Object { type_name: #type_name.to_string() }
                }
            };
            quote! {
                reshape_api::shape::FieldKind::Sequence {
                    element: #element_kind,
                    container: <#container as reshape_api::slot::Container>::KIND,
                }
            }
        }
    };
    Ok(tokens)
}

fn get_arm(ident: &Ident, field_name_str: &str, slot: &Slot<'_>) -> TokenStream2 {
    let value = match slot {
        Slot::Leaf { optional: false, .. } => quote! {
            reshape_api::slot::read_leaf(&self.#ident)
        },
        Slot::Leaf { optional: true, .. } => quote! {
            reshape_api::slot::read_optional_leaf(&self.#ident)
        },
        Slot::Object {
            optional: false,
            boxed,
            ..
        } => {
            let target = if *boxed {
                quote! { &*self.#ident }
            } else {
                quote! { &self.#ident }
            };
            quote! { reshape_api::value::Value::Object(#target) }
        }
        Slot::Object {
            optional: true,
            boxed,
            ..
        } => {
            let target = if *boxed {
                quote! { self.#ident.as_deref() }
            } else {
                quote! { self.#ident.as_ref() }
            };
            quote! {
                match #target {
                    Some(v) => reshape_api::value::Value::Object(v),
                    None => reshape_api::value::Value::Null,
                }
            }
        }
        Slot::Sequence {
            optional,
            element_optional,
            element_leaf,
            ..
        } => {
            let iter = if *optional {
                quote! { self.#ident.iter().flatten() }
            } else {
                quote! { self.#ident.iter() }
            };
            let view = match (element_leaf, element_optional) {
                (true, false) => quote! { |e| reshape_api::slot::read_leaf(e) },
                (true, true) => quote! { |e| reshape_api::slot::read_optional_leaf(e) },
                (false, false) => quote! { |e| reshape_api::value::Value::Object(e) },
                (false, true) => quote! {
                    |e| match e {
                        Some(e) => reshape_api::value::Value::Object(e),
                        None => reshape_api::value::Value::Null,
                    }
                },
            };
            quote! {
                reshape_api::value::Value::Sequence(#iter.map(#view).collect())
            }
        }
    };
    quote! {
        #field_name_str => Some(#value),
    }
}

/// Name recorded in `FieldKind::Object`: the last path segment (e.g. `AddressDto`).
fn object_type_name(ty: &Type) -> Result<String, syn::Error> {
    type_ident_name(ty).ok_or_else(|| syn::Error::new_spanned(ty, "unsupported object type"))
}

/// Extract the last path segment ident name from a type (e.g. `u64`, `String`).
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}

/// `Some(T)` when `ty` is `wrapper<T>` (matched on the last path segment).
fn generic_arg<'a>(wrapper: &str, ty: &'a Type) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}
