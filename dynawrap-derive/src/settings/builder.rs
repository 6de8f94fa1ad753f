use super::{template::placeholders, Settings, StoredField};
use itertools::Itertools;
use proc_macro2::{Ident, Span};
use syn::{Data, DeriveInput, Fields, LitStr};

const RESERVED_ATTRIBUTE_NAMES: &[&str] = &["PK", "SK"];

pub(crate) struct SettingsBuilder {
    ident: Ident,
    type_name: String,
    pk_template: Option<(String, Span)>,
    sk_template: Option<(String, Span)>,
    stored_fields: Vec<StoredField>,
    skipped_fields: Vec<Ident>,
}

impl SettingsBuilder {
    pub(crate) fn new(input: &DeriveInput) -> Self {
        Self {
            ident: input.ident.clone(),
            type_name: input.ident.to_string(),
            pk_template: None,
            sk_template: None,
            stored_fields: Vec::new(),
            skipped_fields: Vec::new(),
        }
    }

    pub(crate) fn container_attributes(
        mut self,
        DeriveInput { attrs, .. }: &DeriveInput,
    ) -> Result<Self, syn::Error> {
        for attr in attrs {
            if attr.path().is_ident("dynawrap") {
                attr.parse_nested_meta(|meta| {
                    let ident = meta.path.get_ident().map(|i| i.to_string());
                    match ident.as_deref() {
                        Some("pk") => {
                            let t: LitStr = meta.value()?.parse()?;
                            self.pk_template = Some((t.value(), t.span()));
                            Ok(())
                        }
                        Some("sk") => {
                            let t: LitStr = meta.value()?.parse()?;
                            self.sk_template = Some((t.value(), t.span()));
                            Ok(())
                        }
                        Some("type_name") => {
                            let t: LitStr = meta.value()?.parse()?;
                            let value = t.value();

                            if value.is_empty() {
                                return Err(meta.error("type_name must not be empty"));
                            }

                            self.type_name = value;
                            Ok(())
                        }
                        _ => Err(meta.error("unsupported attribute")),
                    }
                })?;
            }
        }

        Ok(self)
    }

    pub(crate) fn field_attributes(
        mut self,
        DeriveInput { data, ident, .. }: &DeriveInput,
    ) -> Result<Self, syn::Error> {
        // Only support structs with named fields
        let Data::Struct(data_struct) = data else {
            return Err(syn::Error::new_spanned(
                ident,
                "Record can only be derived for structs",
            ));
        };

        let Fields::Named(fields_named) = &data_struct.fields else {
            return Err(syn::Error::new_spanned(
                ident,
                "Record can only be derived for structs with named fields",
            ));
        };

        for field in &fields_named.named {
            let field_ident = field.ident.clone().ok_or_else(|| {
                syn::Error::new_spanned(field, "internal error: identifier was not Some")
            })?;

            let mut attribute = field_ident.to_string();
            let mut skipped = false;

            for attr in &field.attrs {
                if attr.path().is_ident("dynawrap") {
                    attr.parse_nested_meta(|meta| {
                        let directive = meta.path.get_ident().map(|i| i.to_string());
                        match directive.as_deref() {
                            Some("skip") => {
                                // Don't store this field
                                skipped = true;
                                Ok(())
                            }
                            Some("rename") => {
                                let t: LitStr = meta.value()?.parse()?;
                                attribute = t.value();
                                Ok(())
                            }
                            _ => Err(meta.error("unsupported field attribute")),
                        }
                    })?;
                }
            }

            if skipped {
                self.skipped_fields.push(field_ident);
                continue;
            }

            if RESERVED_ATTRIBUTE_NAMES.contains(&attribute.as_str()) {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!(
                        "Invalid field '{attribute}': name is reserved for the key attributes"
                    ),
                ));
            }

            if let Some(existing) = self.stored_fields.iter().find(|f| f.attribute == attribute) {
                return Err(syn::Error::new_spanned(
                    &field_ident,
                    format!(
                        "Attribute '{attribute}' is already used by field '{}'",
                        existing.ident
                    ),
                ));
            }

            self.stored_fields.push(StoredField {
                ident: field_ident,
                attribute,
            });
        }

        Ok(self)
    }

    pub(crate) fn build(self) -> Result<Settings, syn::Error> {
        let SettingsBuilder {
            ident,
            type_name,
            pk_template,
            sk_template,
            stored_fields,
            skipped_fields,
        } = self;

        let (pk_template, pk_span) = pk_template.ok_or_else(|| {
            syn::Error::new_spanned(
                &ident,
                "Missing required attribute for Record: #[dynawrap(pk = \"...\")]",
            )
        })?;

        let (sk_template, sk_span) = sk_template.ok_or_else(|| {
            syn::Error::new_spanned(
                &ident,
                "Missing required attribute for Record: #[dynawrap(sk = \"...\")]",
            )
        })?;

        for (key, template, span) in [("pk", &pk_template, pk_span), ("sk", &sk_template, sk_span)]
        {
            let names = placeholders(template).map_err(|message| {
                syn::Error::new(span, format!("Invalid {key} template '{template}': {message}"))
            })?;

            let unknown = names
                .iter()
                .filter(|name| !stored_fields.iter().any(|f| &f.attribute == *name))
                .join(", ");

            if !unknown.is_empty() {
                return Err(syn::Error::new(
                    span,
                    format!("{key} template '{template}' refers to fields that are not stored: {unknown}"),
                ));
            }
        }

        Ok(Settings {
            ident,
            type_name,
            pk_template,
            sk_template,
            stored_fields,
            skipped_fields,
        })
    }
}
