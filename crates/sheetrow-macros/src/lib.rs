use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Type, parse_macro_input,
    spanned::Spanned,
};

/* ────────────────────────── the derive macro ──────────────────────── */

/// Derive `sheetrow::Record` for a struct with named fields.
///
/// Struct attribute:
/// - `#[record(policy = "own_fields" | "includes_inherited")]`
///
/// Field attributes:
/// - `#[record(ignore)]` leaves the field out of every row
/// - `#[record(extends)]` marks the embedded parent record
/// - `#[column]`, `#[column(name = "..", default = "..")]`
/// - `#[datetime(pattern = "..")]`
///
/// The struct must also implement `Default`.
#[proc_macro_derive(Record, attributes(record, column, datetime))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct ColumnAttr {
    name: Option<LitStr>,
    default_value: Option<LitStr>,
}

struct FieldSpec<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    ignore: bool,
    extends: bool,
    column: Option<ColumnAttr>,
    pattern: Option<LitStr>,
}

impl FieldSpec<'_> {
    fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    /* -------- 1 · shape checks -------- */
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[derive(Record)] does not support generic structs",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Record)] only supports structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new(
            data.fields.span(),
            "#[derive(Record)] needs named fields",
        ));
    };

    /* -------- 2 · examine attributes -------- */
    let policy = parse_policy(&input.attrs)?;
    let specs = named
        .named
        .iter()
        .map(parse_field)
        .collect::<syn::Result<Vec<_>>>()?;

    let mut parents = specs.iter().filter(|s| s.extends);
    let parent = parents.next();
    if let Some(extra) = parents.next() {
        return Err(syn::Error::new(
            extra.ident.span(),
            "only one field can be #[record(extends)]",
        ));
    }
    let declared: Vec<&FieldSpec> = specs.iter().filter(|s| !s.extends).collect();

    /* -------- 3 · schema tokens -------- */
    let ident = &input.ident;
    let record_name = ident.unraw().to_string();

    let field_defs = declared.iter().map(|spec| field_def(spec));
    let parent_call = parent.map(|p| {
        let ty = p.ty;
        quote! { .with_parent(<#ty as ::sheetrow::Record>::record_type) }
    });

    /* -------- 4 · accessor / mutator arms -------- */
    let mapped = declared.iter().enumerate().filter(|(_, s)| !s.ignore);
    let get_arms = mapped.clone().map(|(index, spec)| {
        let field = spec.ident;
        quote! { #index => ::sheetrow::CellType::to_field_value(&self.#field), }
    });
    let set_arms = mapped.map(|(index, spec)| {
        let field = spec.ident;
        let ty = spec.ty;
        let name = spec.name();
        quote! {
            #index => {
                self.#field = <#ty as ::sheetrow::CellType>::from_field_value(value)
                    .map_err(|e| e.for_field(#name))?;
                ::core::result::Result::Ok(())
            }
        }
    });

    let (get_foreign, set_foreign) = match parent {
        Some(p) => {
            let field = p.ident;
            (
                quote! { return ::sheetrow::Record::field_value(&self.#field, key); },
                quote! { return ::sheetrow::Record::set_field_value(&mut self.#field, key, value); },
            )
        }
        None => (
            quote! { return ::core::option::Option::None; },
            quote! {
                return ::core::result::Result::Err(::sheetrow::CoercionError::UnknownField {
                    record: #record_name,
                    index: key.index(),
                });
            },
        ),
    };

    /* -------- 5 · assemble expanded code -------- */
    Ok(quote! {
        impl ::sheetrow::Record for #ident {
            fn record_type() -> &'static ::sheetrow::RecordType {
                static TYPE: ::std::sync::OnceLock<::sheetrow::RecordType> =
                    ::std::sync::OnceLock::new();
                TYPE.get_or_init(|| {
                    ::sheetrow::RecordType::new::<#ident>(#record_name)
                        .with_policy(::sheetrow::FieldInclusionPolicy::#policy)
                        #parent_call
                        #(.with_field(#field_defs))*
                })
            }

            fn field_value(
                &self,
                key: ::sheetrow::FieldKey,
            ) -> ::core::option::Option<::sheetrow::FieldValue> {
                if key.owner() != ::core::any::TypeId::of::<Self>() {
                    #get_foreign
                }
                match key.index() {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_field_value(
                &mut self,
                key: ::sheetrow::FieldKey,
                value: ::core::option::Option<::sheetrow::FieldValue>,
            ) -> ::core::result::Result<(), ::sheetrow::CoercionError> {
                if key.owner() != ::core::any::TypeId::of::<Self>() {
                    #set_foreign
                }
                match key.index() {
                    #(#set_arms)*
                    index => ::core::result::Result::Err(::sheetrow::CoercionError::UnknownField {
                        record: #record_name,
                        index,
                    }),
                }
            }
        }
    })
}

fn field_def(spec: &FieldSpec) -> TokenStream2 {
    let ty = spec.ty;
    let name = spec.name();
    if spec.ignore {
        return quote! { ::sheetrow::FieldDef::ignored(#name, ::core::stringify!(#ty)) };
    }

    let column = spec.column.as_ref().map(|c| {
        let name = option_lit(c.name.as_ref());
        let default_value = option_lit(c.default_value.as_ref());
        quote! { .with_column(#name, #default_value) }
    });
    let pattern = spec.pattern.as_ref().map(|p| quote! { .with_pattern(#p) });

    quote! { ::sheetrow::FieldDef::of::<#ty>(#name) #column #pattern }
}

fn option_lit(lit: Option<&LitStr>) -> TokenStream2 {
    match lit {
        Some(lit) => quote! { ::core::option::Option::Some(#lit) },
        None => quote! { ::core::option::Option::None },
    }
}

/* ────────────────────────── attribute parsing ─────────────────────── */

fn parse_policy(attrs: &[Attribute]) -> syn::Result<Ident> {
    let mut policy = format_ident!("OwnFields");
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("policy") {
                return Err(meta.error("expected `policy = \"...\"`"));
            }
            let lit: LitStr = meta.value()?.parse()?;
            policy = match lit.value().as_str() {
                "own_fields" => format_ident!("OwnFields"),
                "includes_inherited" => format_ident!("IncludesInherited"),
                other => {
                    return Err(syn::Error::new(
                        lit.span(),
                        format!(
                            "unknown policy `{other}`, expected `own_fields` or `includes_inherited`"
                        ),
                    ));
                }
            };
            Ok(())
        })?;
    }
    Ok(policy)
}

fn parse_field(field: &syn::Field) -> syn::Result<FieldSpec<'_>> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new(field.span(), "expected a named field"));
    };
    let mut spec = FieldSpec {
        ident,
        ty: &field.ty,
        ignore: false,
        extends: false,
        column: None,
        pattern: None,
    };

    for attr in &field.attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignore") {
                    spec.ignore = true;
                } else if meta.path.is_ident("extends") {
                    spec.extends = true;
                } else {
                    return Err(meta.error("expected `ignore` or `extends`"));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("column") {
            let mut column = ColumnAttr {
                name: None,
                default_value: None,
            };
            if !matches!(attr.meta, Meta::Path(_)) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        column.name = Some(meta.value()?.parse()?);
                    } else if meta.path.is_ident("default") {
                        column.default_value = Some(meta.value()?.parse()?);
                    } else {
                        return Err(meta.error("expected `name` or `default`"));
                    }
                    Ok(())
                })?;
            }
            spec.column = Some(column);
        } else if attr.path().is_ident("datetime") {
            attr.parse_nested_meta(|meta| {
                if !meta.path.is_ident("pattern") {
                    return Err(meta.error("expected `pattern = \"...\"`"));
                }
                spec.pattern = Some(meta.value()?.parse()?);
                Ok(())
            })?;
        }
    }

    if spec.extends && (spec.ignore || spec.column.is_some() || spec.pattern.is_some()) {
        return Err(syn::Error::new(
            ident.span(),
            "#[record(extends)] cannot be combined with other field attributes",
        ));
    }
    Ok(spec)
}
