use super::{TableAttribute, TryFromTableAttr};
use crate::{
    codec::{DecodeError, WireItem},
    traits::ReadConversionError,
};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// Represents a collection of attributes for a table entry.
/// Attributes are stored as a map of `String` to `TableAttribute`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableAttributes(HashMap<String, TableAttribute>);

impl TableAttributes {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Merge this table attributes with another set of table attributes.
    /// Values in `other` win.
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TableAttribute>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&TableAttribute> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<TableAttribute> {
        self.0.remove(key)
    }

    /// Remove an attribute, reading a missing one as [`TableAttribute::Null`].
    pub fn take(&mut self, key: &str) -> TableAttribute {
        self.0.remove(key).unwrap_or(TableAttribute::Null)
    }

    /// Remove an attribute and convert it into a field value.
    ///
    /// A missing attribute is offered to the conversion as `Null`, so `Option` fields
    /// read as `None`; any other type fails with [`ReadConversionError::NoSuchAttribute`].
    pub fn take_field<T: TryFromTableAttr>(&mut self, key: &str) -> Result<T, ReadConversionError> {
        match self.0.remove(key) {
            Some(value) => T::try_from_table_attr(value),
            None => T::try_from_table_attr(TableAttribute::Null)
                .map_err(|_| ReadConversionError::NoSuchAttribute(key.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableAttribute)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_wire(self) -> WireItem {
        self.0.into_iter().map(|(k, v)| (k, v.into())).collect()
    }
}

impl TryFrom<WireItem> for TableAttributes {
    type Error = DecodeError;

    fn try_from(item: WireItem) -> Result<Self, Self::Error> {
        item.into_iter()
            .map(|(k, v)| {
                let value = TableAttribute::try_from(v).map_err(|err| {
                    log::error!("Failed to decode attribute '{k}': {err}");
                    err
                })?;
                Ok((k, value))
            })
            .collect::<Result<HashMap<_, _>, DecodeError>>()
            .map(Self)
    }
}

impl From<TableAttributes> for HashMap<String, AttributeValue> {
    fn from(attributes: TableAttributes) -> Self {
        attributes.into_wire()
    }
}

impl From<HashMap<String, TableAttribute>> for TableAttributes {
    fn from(map: HashMap<String, TableAttribute>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for TableAttributes
where
    K: Into<String>,
    V: Into<TableAttribute>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> Extend<(K, V)> for TableAttributes
where
    K: Into<String>,
    V: Into<TableAttribute>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for TableAttributes {
    type Item = (String, TableAttribute);
    type IntoIter = std::collections::hash_map::IntoIter<String, TableAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
