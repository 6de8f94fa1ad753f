mod registry;
pub use registry::{PatternRegistry, RegistryError};

use crate::{
    pattern::{lookup, render_segments, Pattern, Segment, TemplateError},
    table::TableAttribute,
    TableAttributes,
};
use itertools::Itertools;
use log::warn;
use std::fmt::Display;
use thiserror::Error;

/// Name of the partition key attribute.
pub const PARTITION_KEY: &str = "PK";
/// Name of the sort key attribute.
pub const SORT_KEY: &str = "SK";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Field '{0}' holds a value that cannot be rendered into a key")]
    InvalidValue(String),
    #[error("Field '{name}' does not satisfy format spec '{spec}'")]
    Format { name: String, spec: String },
    #[error("TemplateError: {0}")]
    Template(#[from] TemplateError),
}

/// A partition and sort key pair.
///
/// The partition key is always fully rendered. The sort key is either fully rendered or,
/// when built with [`build_key_pair`], a prefix suitable for a `begins_with` query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPair {
    pub pk: String,
    pub sk: String,
}

impl KeyPair {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl Display for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PARTITION_KEY}={}, {SORT_KEY}={}", self.pk, self.sk)
    }
}

impl From<KeyPair> for TableAttributes {
    fn from(KeyPair { pk, sk }: KeyPair) -> Self {
        let mut attributes = TableAttributes::new();
        attributes.insert(PARTITION_KEY, pk);
        attributes.insert(SORT_KEY, sk);
        attributes
    }
}

/// Build a key pair, falling back to a sort key prefix when trailing sort key fields are
/// missing. A missing partition key field is always an error.
pub fn build_key_pair(
    pk: &Pattern,
    sk: &Pattern,
    values: &TableAttributes,
) -> Result<KeyPair, KeyError> {
    let pk = pk.render(values)?;

    let sk = match sk.render(values) {
        Ok(sk) => sk,
        Err(KeyError::MissingField(_)) => derive_prefix(sk, values)?,
        Err(err) => return Err(err),
    };

    Ok(KeyPair { pk, sk })
}

/// Build a key pair where both keys must be fully rendered.
pub fn build_full_key_pair(
    pk: &Pattern,
    sk: &Pattern,
    values: &TableAttributes,
) -> Result<KeyPair, KeyError> {
    Ok(KeyPair {
        pk: pk.render(values)?,
        sk: sk.render(values)?,
    })
}

/// Derive a sort key prefix by truncating `sk` before its first unresolved placeholder.
///
/// Only a missing *suffix* of fields is meaningful here. If a later placeholder has a value
/// but an earlier one does not, the later values are ignored and a warning is logged.
/// When every placeholder has a value the full key is rendered (with a warning, since the
/// caller probably did not intend a prefix query).
pub fn derive_prefix(sk: &Pattern, values: &TableAttributes) -> Result<String, KeyError> {
    let segments = sk.segments();
    let first_missing = segments.iter().position(|segment| {
        matches!(segment, Segment::Field { name, .. } if lookup(values, name).is_none())
    });

    let Some(cut) = first_missing else {
        if sk.placeholders().next().is_some() {
            warn!(
                "All fields of '{}' are present, rendering the full key instead of a prefix",
                sk.name()
            );
        }
        return sk.render(values);
    };

    let ignored = segments[cut..]
        .iter()
        .filter_map(|segment| match segment {
            Segment::Field { name, .. } if lookup(values, name).is_some() => Some(name.as_str()),
            _ => None,
        })
        .join(", ");

    if !ignored.is_empty() {
        warn!(
            "Prefix for '{}' stops at the first missing field; ignoring values for: {ignored}",
            sk.name()
        );
    }

    render_segments(&segments[..cut], values)
}

/// True if both candidates can be produced by their respective templates.
pub fn is_match(pk_candidate: &str, sk_candidate: &str, pk: &Pattern, sk: &Pattern) -> bool {
    pk.is_match(pk_candidate) && sk.is_match(sk_candidate)
}

/// Extract the key strings from an item, if both are present as strings.
pub(crate) fn key_strings(item: &TableAttributes) -> Option<(&str, &str)> {
    let pk = item.get(PARTITION_KEY).and_then(TableAttribute::as_str)?;
    let sk = item.get(SORT_KEY).and_then(TableAttribute::as_str)?;
    Some((pk, sk))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(template: &str) -> Pattern {
        Pattern::new("test", template).unwrap()
    }

    fn values<const N: usize>(pairs: [(&str, &str); N]) -> TableAttributes {
        pairs.into_iter().collect()
    }

    #[test]
    fn test_build_key_pair_complete() {
        let keys = build_key_pair(
            &pattern("USER#{owner}#STORY#{story_id}"),
            &pattern("STORY#{story_id}"),
            &values([("owner", "johndoe"), ("story_id", "1234")]),
        )
        .unwrap();

        assert_eq!(keys, KeyPair::new("USER#johndoe#STORY#1234", "STORY#1234"));
    }

    #[test]
    fn test_build_key_pair_partial_sort_key() {
        let keys = build_key_pair(
            &pattern("ITEM#{item_id}"),
            &pattern("DETAIL#{detail_id}"),
            &values([("item_id", "x")]),
        )
        .unwrap();

        assert_eq!(keys, KeyPair::new("ITEM#x", "DETAIL#"));
    }

    #[test]
    fn test_build_key_pair_missing_partition_field() {
        let err = build_key_pair(
            &pattern("ITEM#{item_id}"),
            &pattern("DETAIL#{detail_id}"),
            &values([("detail_id", "y")]),
        )
        .unwrap_err();

        assert_eq!(err, KeyError::MissingField("item_id".to_string()));
    }

    #[test]
    fn test_build_full_key_pair_rejects_prefix() {
        let err = build_full_key_pair(
            &pattern("ITEM#{item_id}"),
            &pattern("DETAIL#{detail_id}"),
            &values([("item_id", "x")]),
        )
        .unwrap_err();

        assert_eq!(err, KeyError::MissingField("detail_id".to_string()));
    }

    #[test]
    fn test_derive_prefix_no_values() {
        assert_eq!(
            derive_prefix(&pattern("STORY#{story_id}"), &TableAttributes::new()).unwrap(),
            "STORY#"
        );
    }

    #[test]
    fn test_derive_prefix_unrelated_values() {
        assert_eq!(
            derive_prefix(&pattern("DETAIL#{detail_id}"), &values([("item_id", "abc")])).unwrap(),
            "DETAIL#"
        );
    }

    #[test]
    fn test_derive_prefix_all_fields_present() {
        assert_eq!(
            derive_prefix(&pattern("DETAIL#{detail_id}"), &values([("detail_id", "123")]))
                .unwrap(),
            "DETAIL#123"
        );
    }

    #[test]
    fn test_derive_prefix_trailing_fields_missing() {
        let sk = pattern("DATE#{date}#EXECUTION#{execution_id}");

        assert_eq!(
            derive_prefix(&sk, &values([("date", "2023-01-05")])).unwrap(),
            "DATE#2023-01-05#EXECUTION#"
        );
    }

    #[test]
    fn test_derive_prefix_interior_gap_stops_at_first_missing() {
        let sk = pattern("DATE#{date}#EXECUTION#{execution_id}");

        assert_eq!(
            derive_prefix(&sk, &values([("execution_id", "5678")])).unwrap(),
            "DATE#"
        );
    }

    #[test]
    fn test_derive_prefix_literal_only() {
        assert_eq!(
            derive_prefix(&pattern("USER#SIGNUP"), &TableAttributes::new()).unwrap(),
            "USER#SIGNUP"
        );
    }

    #[test]
    fn test_is_match() {
        let sk = pattern("DETAIL#{d}");

        assert!(is_match("ITEM#a", "DETAIL#b", &pattern("ITEM#{id}"), &sk));
        assert!(!is_match("ITEM#a", "DETAIL#b", &pattern("OTHER#{x}"), &sk));
    }

    #[test]
    fn test_key_pair_into_attributes() {
        let attributes: TableAttributes = KeyPair::new("ITEM#1", "DETAIL#2").into();

        assert_eq!(key_strings(&attributes), Some(("ITEM#1", "DETAIL#2")));
    }
}
