use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Fields, Generics, LitStr, Type, TypeParamBound, parse_macro_input, parse_quote,
};

/// Derive macro for `refl::Reflect`.
///
/// On a struct with named fields, generates `Reflect` and `Struct`, exposing
/// every field in declaration order to the assignment and traversal engines.
/// The struct must be `Clone`: assigning a value of the same type copies it
/// whole, skipped fields included. Its zero value is built from the zero of
/// every reflected field and `Default` of every skipped one.
///
/// Container attributes:
///
/// - `#[reflect(opaque)]`: treat the type as a leaf (any struct or enum;
///   requires `Clone` and `Default`).
/// - `#[reflect(no_clone)]`: drop the `Clone` requirement; same-type
///   assignment then converts the reflected fields one by one.
/// - `#[reflect(text)]`: route string assignment through the type's
///   `TextParsable` impl.
/// - `#[reflect(shared_text)]`: same, through `SharedTextParsable`.
/// - `#[reflect(from_str)]`: generate the `TextParsable` impl from `FromStr`.
/// - `#[reflect(display)]`: use `Display` when the value is a map key.
///
/// Field attributes:
///
/// - `#[reflect(skip)]`: hide the field.
/// - `#[reflect(tag = "...")]`: attach a `key:"value"` tag.
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Clone, Default)]
/// pub struct Listener {
///     #[reflect(tag = r#"env:"LISTEN_ADDR""#)]
///     pub addr: String,
///     pub timeout: std::time::Duration,
///     #[reflect(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct ContainerAttrs {
    opaque: bool,
    text: bool,
    shared_text: bool,
    from_str: bool,
    display: bool,
    no_clone: bool,
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    tag: Option<String>,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let attrs = container_attrs(&input.attrs)?;

    if attrs.text && attrs.from_str {
        return Err(syn::Error::new_spanned(
            name,
            "#[reflect(text)] and #[reflect(from_str)] both provide the text hook",
        ));
    }

    if attrs.opaque && attrs.no_clone {
        return Err(syn::Error::new_spanned(
            name,
            "#[reflect(no_clone)] cannot be combined with #[reflect(opaque)], which copies through Clone",
        ));
    }

    let hooks = hook_methods(&attrs);
    let copy = (!attrs.no_clone).then(copy_method);
    let parse_impl = attrs.from_str.then(|| from_str_impl(input));

    if attrs.opaque {
        let generics = with_bounds(
            &input.generics,
            &[
                parse_quote!(::core::clone::Clone),
                parse_quote!(::core::default::Default),
                parse_quote!('static),
            ],
        );
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
        return Ok(quote! {
            impl #impl_generics ::refl::Reflect for #name #ty_generics #where_clause {
                fn zero() -> Self {
                    ::core::default::Default::default()
                }

                fn reflect_ref(&self) -> ::refl::ReflectRef<'_> {
                    ::refl::ReflectRef::Opaque(self)
                }

                fn reflect_mut(&mut self) -> ::refl::ReflectMut<'_> {
                    ::refl::ReflectMut::Opaque(self)
                }

                #copy

                #hooks
            }

            #parse_impl
        });
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect only supports structs with named fields; use #[reflect(opaque)] for other types",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect only supports structs; use #[reflect(opaque)] for other types",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut zeros = Vec::new();
    let mut ref_arms = Vec::new();
    let mut mut_arms = Vec::new();

    for field in fields {
        let field_attrs = field_attrs(&field.attrs)?;
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        if field_attrs.skip {
            zeros.push(quote! { #field_name: ::core::default::Default::default() });
            continue;
        }
        let field_ty = &field.ty;
        zeros.push(quote! { #field_name: <#field_ty as ::refl::Reflect>::zero() });
        let field_name_str = field_name.to_string();
        let index = descriptors.len();
        let type_str = type_text(&field.ty);
        let tag = field_attrs.tag.unwrap_or_default();

        descriptors.push(quote! {
            ::refl::Field::new(#field_name_str, #index, #type_str, ::refl::Tag::new(#tag))
        });
        ref_arms.push(quote! {
            #index => ::core::option::Option::Some(&self.#field_name as &dyn ::refl::Reflect),
        });
        mut_arms.push(quote! {
            #index => ::core::option::Option::Some(&mut self.#field_name as &mut dyn ::refl::Reflect),
        });
    }

    let count = descriptors.len();
    let mut bounds: Vec<TypeParamBound> = vec![parse_quote!(::refl::Reflect)];
    if !attrs.no_clone {
        bounds.push(parse_quote!(::core::clone::Clone));
    }
    let generics = with_bounds(&input.generics, &bounds);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::refl::Reflect for #name #ty_generics #where_clause {
            fn zero() -> Self {
                Self {
                    #(#zeros),*
                }
            }

            fn reflect_ref(&self) -> ::refl::ReflectRef<'_> {
                ::refl::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> ::refl::ReflectMut<'_> {
                ::refl::ReflectMut::Struct(self)
            }

            #copy

            #hooks
        }

        impl #impl_generics ::refl::Struct for #name #ty_generics #where_clause {
            fn fields(&self) -> &'static [::refl::Field] {
                static FIELDS: [::refl::Field; #count] = [#(#descriptors),*];
                &FIELDS
            }

            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn ::refl::Reflect> {
                match index {
                    #(#ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::refl::Reflect> {
                match index {
                    #(#mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #parse_impl
    })
}

fn container_attrs(attrs: &[Attribute]) -> Result<ContainerAttrs, syn::Error> {
    let mut parsed = ContainerAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("opaque") {
                parsed.opaque = true;
            } else if meta.path.is_ident("text") {
                parsed.text = true;
            } else if meta.path.is_ident("shared_text") {
                parsed.shared_text = true;
            } else if meta.path.is_ident("from_str") {
                parsed.from_str = true;
            } else if meta.path.is_ident("display") {
                parsed.display = true;
            } else if meta.path.is_ident("no_clone") {
                parsed.no_clone = true;
            } else {
                return Err(meta.error(
                    "unknown container attribute (expected opaque, no_clone, text, shared_text, from_str or display)",
                ));
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

fn field_attrs(attrs: &[Attribute]) -> Result<FieldAttrs, syn::Error> {
    let mut parsed = FieldAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("tag") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.tag = Some(value.value());
            } else {
                return Err(meta.error("unknown field attribute (expected skip or tag)"));
            }
            Ok(())
        })?;
    }
    Ok(parsed)
}

fn hook_methods(attrs: &ContainerAttrs) -> TokenStream2 {
    let mut methods = TokenStream2::new();
    if attrs.shared_text {
        methods.extend(quote! {
            fn shared_text_hook(&self) -> ::core::option::Option<&dyn ::refl::SharedTextParsable> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if attrs.text || attrs.from_str {
        methods.extend(quote! {
            fn text_hook(&mut self) -> ::core::option::Option<&mut dyn ::refl::TextParsable> {
                ::core::option::Option::Some(self)
            }
        });
    }
    if attrs.display {
        methods.extend(quote! {
            fn display_text(&self) -> ::core::option::Option<::std::string::String> {
                ::core::option::Option::Some(::std::string::ToString::to_string(self))
            }
        });
    }
    methods
}

/// Whole-value copy through `Clone` when `src` has the same type.
fn copy_method() -> TokenStream2 {
    quote! {
        fn copy_from(&mut self, src: &dyn ::refl::Reflect) -> bool {
            match ::refl::AsAny::as_any(src).downcast_ref::<Self>() {
                ::core::option::Option::Some(value) => {
                    *self = ::core::clone::Clone::clone(value);
                    true
                }
                ::core::option::Option::None => false,
            }
        }
    }
}

fn from_str_impl(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::refl::TextParsable for #name #ty_generics #where_clause {
            fn parse_text(&mut self, text: &str) -> ::core::result::Result<(), ::refl::BoxError> {
                *self = text.parse::<Self>().map_err(::refl::BoxError::from)?;
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// Add `bounds` to every type parameter.
fn with_bounds(generics: &Generics, bounds: &[TypeParamBound]) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.extend(bounds.iter().cloned());
    }
    generics
}

/// Field type as written, with token spacing collapsed (`Option<u16>`,
/// `Vec<String>`).
fn type_text(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.peek().copied();
            let glued = matches!(prev, Some('<' | '&' | ':' | '(' | '['))
                || matches!(next, Some('<' | '>' | ',' | ':' | ')' | ']' | ';'));
            if glued {
                continue;
            }
        }
        out.push(c);
    }
    out
}
