// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides procedural macros for Lumen.

use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, parse_quote, DeriveInput, LitStr, Path, Token, Type};

/// A derive macro that implements `lumen_core::event::EventHandler` for a type
/// implementing `Handle<S>` for each subtype `S` listed in `#[handles(...)]`.
///
/// The generated dispatcher checks the specific subtypes first and the
/// generic `CommonEvent` view last, invoking at most one `handle` per event.
/// It is implemented both for the type and for `&mut` references to it.
///
/// Generated code names `::lumen_core`; a crate that only depends on a
/// re-exporting crate overrides the path with `#[lumen(crate = "...")]`.
///
/// ```ignore
/// #[derive(EventHandler)]
/// #[handles(KeyboardEvent, QuitEvent)]
/// struct Input { /* ... */ }
/// ```
#[proc_macro_derive(EventHandler, attributes(handles, lumen))]
pub fn derive_event_handler(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_event_handler(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand_event_handler(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    // Collect every subtype listed across all `#[handles(...)]` attributes.
    let mut subtypes: Vec<Type> = Vec::new();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("handles")) {
        let listed = attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
        subtypes.extend(listed);
    }
    if subtypes.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            format!(
                "`{name}` does not handle any event subtype: add `#[handles(...)]` listing at least one"
            ),
        ));
    }

    let root = core_path(input)?;
    let core = quote!(#root::event);
    let arms = subtypes.iter().map(|ty| {
        quote! {
            if <#ty as #core::EventSubtype>::GENERIC == generic {
                if let ::core::option::Option::Some(payload) = <#ty as #core::EventSubtype>::view(event) {
                    <Self as #core::Handle<#ty>>::handle(self, payload);
                    return true;
                }
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut ref_generics = input.generics.clone();
    ref_generics.params.insert(0, parse_quote!('__lumen_handler));
    let (ref_impl_generics, _, _) = ref_generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #core::EventHandler<#core::MethodHandler> for #name #ty_generics #where_clause {
            fn handle_event(&mut self, event: &#core::Event) -> bool {
                for generic in [false, true] {
                    #(#arms)*
                }
                false
            }
        }

        impl #ref_impl_generics #core::EventHandler<#core::MethodHandler>
            for &'__lumen_handler mut #name #ty_generics #where_clause
        {
            fn handle_event(&mut self, event: &#core::Event) -> bool {
                <#name #ty_generics as #core::EventHandler<#core::MethodHandler>>::handle_event(
                    &mut **self,
                    event,
                )
            }
        }
    };

    Ok(expanded)
}

/// Reads `#[lumen(crate = "...")]`, defaulting to `::lumen_core`.
fn core_path(input: &DeriveInput) -> syn::Result<Path> {
    let mut path: Path = parse_quote!(::lumen_core);
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("lumen")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported lumen attribute, expected `crate`"))
            }
        })?;
    }
    Ok(path)
}
