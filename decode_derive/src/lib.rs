extern crate proc_macro;

use proc_macro::TokenStream;
use quote::{format_ident, quote};

/// Derives `Decode` for a struct, reading its fields from a right comb
///
/// This is the inverse of the `Encode` derive; flat n-ary `Pair` nodes are
/// accepted as well as nested ones.
#[proc_macro_derive(Decode)]
pub fn decode_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_decode(&ast).into()
}

fn impl_decode(ast: &syn::DeriveInput) -> proc_macro2::TokenStream {
    let decode_trait = quote! { mimic::conv::Decode };
    let decode_result_type = quote! { mimic::conv::DecodeResult };
    let micheline_type = quote! { mimic::micheline::Micheline };
    let unpair_fn = quote! { mimic::codec::unpair_n };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#decode_trait));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct { fields, .. }) => fields,
        _ => {
            return syn::Error::new_spanned(name, "Derive macro `Decode` is only implemented for structs")
                .to_compile_error()
        }
    };

    let ty: Vec<&syn::Type> = fields.iter().map(|field| &field.ty).collect();
    let comp: Vec<syn::Ident> = (0..ty.len()).map(|i| format_ident!("__comp{}", i)).collect();
    let arity = ty.len();

    let read = match arity {
        0 => quote! { node.as_unit()?; },
        1 => quote! { let [#( #comp ),*] = [node]; },
        _ => quote! {
            let [#( #comp ),*] = #unpair_fn::<#arity>(node)?;
            #( let #comp = &#comp; )*
        },
    };

    let construct = match fields {
        syn::Fields::Unit => quote! { Self },
        syn::Fields::Unnamed(_) => quote! {
            Self( #( <#ty as #decode_trait>::decode(#comp)? ),* )
        },
        syn::Fields::Named(syn::FieldsNamed { named, .. }) => {
            let fname = named.iter().filter_map(|field| field.ident.as_ref());
            quote! {
                Self { #( #fname: <#ty as #decode_trait>::decode(#comp)? ),* }
            }
        }
    };

    quote! {
        impl #impl_generics #decode_trait for #name #ty_generics #where_clause {
            fn decode(node: &#micheline_type) -> #decode_result_type<Self> {
                #read
                Ok(#construct)
            }
        }
    }
}
