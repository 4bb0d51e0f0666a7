extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;

/// Derives `Typed` for a struct as a right-comb `pair` type
///
/// Named fields are labelled with a `%field` annotation on their component
/// type; tuple-struct fields are left unannotated. Unit structs have type
/// `unit`, and single-field structs the (annotated) type of their field.
#[proc_macro_derive(Typed)]
pub fn typed_derive(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_typed(&ast).into()
}

fn impl_typed(ast: &syn::DeriveInput) -> proc_macro2::TokenStream {
    let typed_trait = quote! { mimic::conv::Typed };
    let mich_type = quote! { mimic::micheline::MichelineType };
    let type_prim = quote! { mimic::micheline::TypePrim };

    let name = &ast.ident;
    let mut generics = ast.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#typed_trait));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct { fields, .. }) => fields,
        _ => {
            return syn::Error::new_spanned(name, "Derive macro `Typed` is only implemented for structs")
                .to_compile_error()
        }
    };

    let components: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .map(|field| {
            let ty = &field.ty;
            match &field.ident {
                Some(ident) => {
                    let label = ident.to_string();
                    let label = label.strip_prefix("r#").unwrap_or(&label);
                    quote! { <#ty as #typed_trait>::mich_type().with_field(#label) }
                }
                None => quote! { <#ty as #typed_trait>::mich_type() },
            }
        })
        .collect();

    let body = components
        .iter()
        .rev()
        .cloned()
        .reduce(|acc, comp| quote! { #mich_type::pair(#comp, #acc) })
        .unwrap_or_else(|| quote! { #mich_type::prim(#type_prim::unit) });

    quote! {
        impl #impl_generics #typed_trait for #name #ty_generics #where_clause {
            fn mich_type() -> #mich_type {
                #body
            }
        }
    }
}
