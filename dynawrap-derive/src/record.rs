use crate::settings::Settings;
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

pub(crate) fn derive_record(input: DeriveInput) -> Result<TokenStream, syn::Error> {
    let settings = Settings::builder(&input)
        .container_attributes(&input)?
        .field_attributes(&input)?
        .build()?;

    let ident = settings.ident();
    let type_name = &settings.type_name;
    let pk_template = &settings.pk_template;
    let sk_template = &settings.sk_template;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let to_attributes_impl = settings.stored_fields().iter().map(|field| {
        let field_ident = &field.ident;
        let name = &field.attribute;

        quote! {
            attributes.insert(#name, ::std::clone::Clone::clone(&self.#field_ident));
        }
    });

    let from_attributes_impl = settings
        .stored_fields()
        .iter()
        .map(|field| {
            let field_ident = &field.ident;
            let name = &field.attribute;

            quote! {
                #field_ident: attributes.take_field(#name)?
            }
        })
        .chain(settings.skipped_fields().iter().map(|field_ident| {
            quote! {
                #field_ident: ::std::default::Default::default()
            }
        }));

    let expanded = quote! {
        #[automatically_derived]
        impl #impl_generics ::dynawrap::traits::Record for #ident #ty_generics #where_clause {
            #[inline]
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#type_name)
            }

            #[inline]
            fn pk_template() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#pk_template)
            }

            #[inline]
            fn sk_template() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#sk_template)
            }

            #[allow(unused_mut)]
            fn to_attributes(&self) -> ::dynawrap::TableAttributes {
                let mut attributes = ::dynawrap::TableAttributes::new();
                #(#to_attributes_impl)*
                attributes
            }

            #[allow(unused_mut, unused_variables)]
            fn from_attributes(
                mut attributes: ::dynawrap::TableAttributes,
            ) -> ::std::result::Result<Self, ::dynawrap::traits::ReadConversionError> {
                ::std::result::Result::Ok(Self {
                    #(#from_attributes_impl,)*
                })
            }
        }
    };

    Ok(expanded)
}
