use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let table = match extract_table(&input) {
        Ok(table) => table,
        Err(err) => return err.to_compile_error().into(),
    };

    let fields = match extract_fields(&input) {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error().into(),
    };

    let key_body = if fields.keys.len() == 1 {
        let key = &fields.keys[0];
        quote! { ::std::string::ToString::to_string(&self.#key) }
    } else {
        let keys = &fields.keys;
        quote! {
            [#(::std::string::ToString::to_string(&self.#keys)),*].join(":")
        }
    };

    let index_idents = &fields.indexes;
    let index_names: Vec<String> = fields.indexes.iter().map(|i| i.to_string()).collect();

    let expanded = quote! {
        impl game_market::Record for #name {
            const TABLE: &'static str = #table;
            const INDEXES: &'static [&'static str] = &[#(#index_names),*];

            fn key(&self) -> ::std::string::String {
                #key_body
            }

            fn index_value(&self, field: &str) -> ::std::option::Option<::std::string::String> {
                match field {
                    #(#index_names => ::std::option::Option::Some(
                        ::std::string::ToString::to_string(&self.#index_idents)
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

struct RecordFields {
    keys: Vec<Ident>,
    indexes: Vec<Ident>,
}

fn extract_table(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let mut table = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;

        if let Some(t) = table {
            return Ok(t);
        }
    }

    let name = input.ident.to_string();
    Ok(format!("{}s", to_snake_case(&name)))
}

fn extract_fields(input: &DeriveInput) -> syn::Result<RecordFields> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Record derive only supports structs",
            ))
        }
    };

    let mut keys = Vec::new();
    let mut indexes = Vec::new();
    let mut id_field = None;

    for field in named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        if ident == "id" {
            id_field = Some(ident.clone());
        }

        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    keys.push(ident.clone());
                    Ok(())
                } else if meta.path.is_ident("index") {
                    indexes.push(ident.clone());
                    Ok(())
                } else {
                    Err(meta.error("expected `key` or `index`"))
                }
            })?;
        }
    }

    if keys.is_empty() {
        match id_field {
            Some(id) => keys.push(id),
            None => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Record derive: no field marked with #[record(key)] and no field named `id`",
                ))
            }
        }
    }

    Ok(RecordFields { keys, indexes })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
