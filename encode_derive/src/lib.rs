extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;

/// Derives `Encode` for a struct as the right comb of its fields
///
/// Unit structs encode as `Unit`, single-field structs as their field, and
/// structs of two or more fields as nested binary `Pair` nodes, in
/// declaration order.
#[proc_macro_derive(Encode)]
pub fn encode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_encode(&ast).into()
}

fn impl_encode(ast: &syn::DeriveInput) -> proc_macro2::TokenStream {
    let encode_trait = quote! { mimic::conv::Encode };
    let micheline_type = quote! { mimic::micheline::Micheline };
    let comb_fn = quote! { mimic::codec::mich_array_to_mich };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#encode_trait));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct { fields, .. }) => fields,
        _ => {
            return syn::Error::new_spanned(name, "Derive macro `Encode` is only implemented for structs")
                .to_compile_error()
        }
    };

    let accessors: Vec<proc_macro2::TokenStream> = match fields {
        syn::Fields::Unit => Vec::new(),
        syn::Fields::Unnamed(syn::FieldsUnnamed { unnamed, .. }) => (0..unnamed.len())
            .map(|i| {
                let i = syn::Index::from(i);
                quote! { self.#i }
            })
            .collect(),
        syn::Fields::Named(syn::FieldsNamed { named, .. }) => named
            .iter()
            .filter_map(|field| field.ident.as_ref())
            .map(|ident| quote! { self.#ident })
            .collect(),
    };

    let body = match accessors.as_slice() {
        [] => quote! { #micheline_type::unit() },
        [only] => quote! { #encode_trait::encode(&#only) },
        _ => quote! {
            #comb_fn(::std::vec![ #( #encode_trait::encode(&#accessors) ),* ])
        },
    };

    quote! {
        impl #impl_generics #encode_trait for #name #ty_generics #where_clause {
            fn encode(&self) -> #micheline_type {
                #body
            }
        }
    }
}
