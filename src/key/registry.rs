use super::{build_key_pair, KeyError, KeyPair};
use crate::{
    pattern::{Pattern, TemplateError},
    traits::Record,
    TableAttributes,
};
use itertools::Itertools;
use log::error;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No access pattern registered as '{0}'")]
    UnknownPattern(String),
    #[error("Access pattern '{name}' is already registered as '{existing}', refusing '{template}'")]
    Conflict {
        name: String,
        existing: String,
        template: String,
    },
    #[error("TemplateError: {0}")]
    Template(#[from] TemplateError),
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
}

/// Append-only lookup from access pattern name to [`Pattern`].
///
/// Build one at startup by registering each record type, then share it by reference.
/// Each record contributes `<TypeName>_pk` and `<TypeName>_sk`.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: HashMap<String, Pattern>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: Record>(&mut self) -> Result<&mut Self, RegistryError> {
        self.insert(R::pk_pattern()?)?;
        self.insert(R::sk_pattern()?)?;
        Ok(self)
    }

    /// Add a pattern. Registering the same template twice is a no-op; registering a
    /// different template under an existing name is a [`RegistryError::Conflict`].
    pub fn insert(&mut self, pattern: Pattern) -> Result<(), RegistryError> {
        match self.patterns.get(pattern.name()) {
            Some(existing) if existing.template() == pattern.template() => Ok(()),
            Some(existing) => Err(RegistryError::Conflict {
                name: pattern.name().to_string(),
                existing: existing.template().to_string(),
                template: pattern.template().to_string(),
            }),
            None => {
                self.patterns.insert(pattern.name().to_string(), pattern);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Render the named pattern in full.
    pub fn key(&self, name: &str, values: &TableAttributes) -> Result<String, RegistryError> {
        let pattern = self.lookup(name)?;

        pattern.render(values).map_err(|err| {
            error!("{err} for pattern '{name}' ({pattern}) with values {values:?}");
            err.into()
        })
    }

    /// Build a key pair from two named patterns; see [`build_key_pair`].
    pub fn create_item_key(
        &self,
        pk_name: &str,
        sk_name: &str,
        values: &TableAttributes,
    ) -> Result<KeyPair, RegistryError> {
        let pk = self.lookup(pk_name)?;
        let sk = self.lookup(sk_name)?;

        Ok(build_key_pair(pk, sk, values)?)
    }

    fn lookup(&self, name: &str) -> Result<&Pattern, RegistryError> {
        self.patterns.get(name).ok_or_else(|| {
            error!("No access pattern registered as '{name}'");
            RegistryError::UnknownPattern(name.to_string())
        })
    }
}
