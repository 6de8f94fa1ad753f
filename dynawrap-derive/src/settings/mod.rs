mod builder;
mod template;

use self::builder::SettingsBuilder;
use proc_macro2::Ident;
use syn::DeriveInput;

/// A field written to the store under `attribute`.
pub(crate) struct StoredField {
    pub(crate) ident: Ident,
    pub(crate) attribute: String,
}

pub(crate) struct Settings {
    ident: Ident,
    pub(crate) type_name: String,
    pub(crate) pk_template: String,
    pub(crate) sk_template: String,
    stored_fields: Vec<StoredField>,

    /// Skipped fields are never stored; reading a record rebuilds them via `Default`
    /// (like serde).
    skipped_fields: Vec<Ident>,
}

impl Settings {
    pub(crate) fn builder(input: &DeriveInput) -> SettingsBuilder {
        SettingsBuilder::new(input)
    }

    pub(crate) fn ident(&self) -> &Ident {
        &self.ident
    }

    pub(crate) fn stored_fields(&self) -> &[StoredField] {
        &self.stored_fields
    }

    pub(crate) fn skipped_fields(&self) -> &[Ident] {
        &self.skipped_fields
    }
}
