extern crate proc_macro2;
extern crate quote;
extern crate syn;

mod record;
mod settings;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(Record, attributes(dynawrap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(parse_macro_input!(input as DeriveInput))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
