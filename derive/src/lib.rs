use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parser, parse_macro_input, Data, DataStruct, DeriveInput, Fields, Meta};

/// 字段级属性：`#[record(rename = "col", default)]`
#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    default: bool,
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        let syn::Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                "expected #[record(rename = \"...\")] or #[record(default)]",
            ));
        };
        let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
        let metas = parser.parse2(list.tokens.clone())?;
        for meta in metas {
            match meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    if let syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(s),
                        ..
                    }) = nv.value
                    {
                        attrs.rename = Some(s.value());
                    } else {
                        return Err(syn::Error::new_spanned(
                            nv.value,
                            "rename expects a string literal",
                        ));
                    }
                }
                Meta::Path(path) if path.is_ident("default") => {
                    attrs.default = true;
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unsupported record attribute, expected `rename` or `default`",
                    ));
                }
            }
        }
    }
    Ok(attrs)
}

/// 生成 `FromRecord` trait 的实现
///
/// 按字段名（或 `rename` 指定的列名）从结果行中取值并反序列化，
/// 标记 `default` 的字段在列缺失或为 NULL 时使用 `Default::default()`。
///
/// 使用示例：
/// ```ignore
/// #[derive(FromRecord)]
/// struct User {
///     id: i64,
///     #[record(rename = "email_address")]
///     email: String,
///     #[record(default)]
///     score: i64,
/// }
/// ```
#[proc_macro_derive(FromRecord, attributes(record))]
pub fn derive_from_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_from_record(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand_from_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "FromRecord can only be derived for structs with named fields",
            ))
        }
    };

    let mut initializers = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let column = attrs.rename.unwrap_or_else(|| {
            let s = ident.to_string();
            s.strip_prefix("r#").map(str::to_string).unwrap_or(s)
        });
        let init = if attrs.default {
            quote! { #ident: sqlxfluent::traits::take_column_or_default(&mut row, #column)? }
        } else {
            quote! { #ident: sqlxfluent::traits::take_column(&mut row, #column)? }
        };
        initializers.push(init);
    }

    Ok(quote! {
        impl #impl_generics sqlxfluent::FromRecord for #name #ty_generics #where_clause {
            fn from_record(mut row: sqlxfluent::Row) -> sqlxfluent::Result<Self> {
                Ok(Self {
                    #(#initializers),*
                })
            }
        }
    })
}
