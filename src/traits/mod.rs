pub use crate::table::{TableAttribute, TryFromTableAttr};

use crate::{
    codec::{decode_change_event, split_keys, StreamError, WireItem},
    errors::ReadError,
    key::{build_full_key_pair, build_key_pair, is_match, key_strings, KeyError, KeyPair},
    pattern::{Pattern, TemplateError},
    TableAttributes,
};
use log::{error, warn};
use serde_json::Value;
use std::{
    borrow::Cow,
    fmt::{self, Debug, Display},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadConversionError {
    #[error("Missing attribute: {0}")]
    NoSuchAttribute(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Failed to convert attribute to {0}")]
    ConversionFailed(String),
}

/// A typed entity stored under a pair of key templates.
///
/// Usually implemented with `#[derive(Record)]`. The required methods describe the type;
/// everything else (key construction, item encoding, stream decoding) is provided.
pub trait Record: Debug + Sized {
    /// Name used to register this type's patterns as `<type_name>_pk` and `<type_name>_sk`.
    fn type_name() -> Cow<'static, str>;

    fn pk_template() -> Cow<'static, str>;

    fn sk_template() -> Cow<'static, str>;

    /// The record's own fields, without `PK` or `SK`.
    fn to_attributes(&self) -> TableAttributes;

    /// Rebuild a record from its fields. Extra attributes are ignored.
    fn from_attributes(attributes: TableAttributes) -> Result<Self, ReadConversionError>;

    fn pk_pattern() -> Result<Pattern, TemplateError> {
        Pattern::new(format!("{}_pk", Self::type_name()), Self::pk_template())
    }

    fn sk_pattern() -> Result<Pattern, TemplateError> {
        Pattern::new(format!("{}_sk", Self::type_name()), Self::sk_template())
    }

    fn key_patterns() -> Result<(Pattern, Pattern), TemplateError> {
        Ok((Self::pk_pattern()?, Self::sk_pattern()?))
    }

    /// Key pair for `values`, where the sort key degrades to a prefix if trailing fields
    /// are missing.
    fn create_item_key(values: &TableAttributes) -> Result<KeyPair, KeyError> {
        let (pk, sk) = Self::key_patterns()?;
        build_key_pair(&pk, &sk, values)
    }

    /// Key pair for `values` where both keys must be complete.
    fn full_item_key(values: &TableAttributes) -> Result<KeyPair, KeyError> {
        let (pk, sk) = Self::key_patterns()?;
        build_full_key_pair(&pk, &sk, values)
    }

    /// Whether a stored key pair could belong to this type. A type whose templates do not
    /// parse matches nothing; the template error is logged.
    fn matches(pk: &str, sk: &str) -> bool {
        match Self::key_patterns() {
            Ok((pk_pattern, sk_pattern)) => is_match(pk, sk, &pk_pattern, &sk_pattern),
            Err(err) => {
                error!("Invalid key template for {}: {err}", Self::type_name());
                false
            }
        }
    }

    fn primary_key(&self) -> Result<KeyPair, KeyError> {
        Self::full_item_key(&self.to_attributes())
    }

    /// Formats as `<type_name>(PK=..., SK=...)`.
    fn display_key(&self) -> DisplayKey<'_, Self> {
        DisplayKey(self)
    }

    /// Own fields plus the full key pair, ready to be written.
    fn to_store_item(&self) -> Result<TableAttributes, KeyError> {
        let attributes = self.to_attributes();
        let key = Self::full_item_key(&attributes)?;

        Ok(attributes.merge(key.into()))
    }

    fn from_store_item(item: Option<TableAttributes>) -> Result<Self, ReadError> {
        let item = item.ok_or(ReadError::NotFound)?;
        let (key, fields) = split_keys(item);

        if key.is_none() {
            return Err(ReadError::MissingKeys);
        }

        Ok(Self::from_attributes(fields)?)
    }

    fn from_wire_item(item: Option<WireItem>) -> Result<Self, ReadError> {
        let item = item.map(TableAttributes::try_from).transpose()?;
        Self::from_store_item(item)
    }

    /// Build a record from the new image of a change-stream event, checking that the
    /// image's keys belong to this type.
    fn from_change_event(event: &Value) -> Result<Self, StreamError> {
        let image = decode_change_event(event)?;
        let (pk_pattern, sk_pattern) = Self::key_patterns()?;

        if let Some((pk, sk)) = key_strings(&image) {
            if !is_match(pk, sk, &pk_pattern, &sk_pattern) {
                warn!(
                    "Stream record {pk} / {sk} does not match {} ({} / {})",
                    Self::type_name(),
                    Self::pk_template(),
                    Self::sk_template()
                );

                return Err(StreamError::PatternMismatch {
                    pk: pk.to_string(),
                    sk: sk.to_string(),
                    type_name: Self::type_name().into_owned(),
                });
            }
        }

        let (_, fields) = split_keys(image);
        Ok(Self::from_attributes(fields)?)
    }
}

/// See [`Record::display_key`].
pub struct DisplayKey<'a, R>(&'a R);

impl<R: Record> Display for DisplayKey<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match R::create_item_key(&self.0.to_attributes()) {
            Ok(KeyPair { pk, sk }) => write!(f, "{}(PK={pk}, SK={sk})", R::type_name()),
            Err(err) => write!(f, "{}(<{err}>)", R::type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Signup {
        username: String,
        timestamp: String,
        email: Option<String>,
    }

    impl Record for Signup {
        fn type_name() -> Cow<'static, str> {
            Cow::Borrowed("Signup")
        }

        fn pk_template() -> Cow<'static, str> {
            Cow::Borrowed("USER#SIGNUP")
        }

        fn sk_template() -> Cow<'static, str> {
            Cow::Borrowed("TS#{timestamp}")
        }

        fn to_attributes(&self) -> TableAttributes {
            let mut attributes = TableAttributes::new();
            attributes.insert("username", self.username.clone());
            attributes.insert("timestamp", self.timestamp.clone());
            attributes.insert("email", self.email.clone());
            attributes
        }

        fn from_attributes(mut attributes: TableAttributes) -> Result<Self, ReadConversionError> {
            Ok(Self {
                username: attributes.take_field("username")?,
                timestamp: attributes.take_field("timestamp")?,
                email: attributes.take_field("email")?,
            })
        }
    }

    fn signup() -> Signup {
        Signup {
            username: "tester-001".into(),
            timestamp: "2025-05-04T22:57:47".into(),
            email: Some("tester@example.com".into()),
        }
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!(Signup::pk_pattern().unwrap().name(), "Signup_pk");
        assert_eq!(Signup::sk_pattern().unwrap().name(), "Signup_sk");
    }

    #[test]
    fn test_store_item_round_trip() {
        let item = signup().to_store_item().unwrap();

        assert_eq!(item.get("PK"), Some(&TableAttribute::from("USER#SIGNUP")));
        assert_eq!(item.get("SK"), Some(&TableAttribute::from("TS#2025-05-04T22:57:47")));
        assert_eq!(Signup::from_store_item(Some(item)).unwrap(), signup());
    }

    #[test]
    fn test_from_store_item_not_found() {
        assert!(matches!(
            Signup::from_store_item(None),
            Err(ReadError::NotFound)
        ));
    }

    #[test]
    fn test_from_store_item_requires_keys() {
        assert!(matches!(
            Signup::from_store_item(Some(signup().to_attributes())),
            Err(ReadError::MissingKeys)
        ));
    }

    #[test]
    fn test_from_wire_item() {
        let wire = signup().to_store_item().unwrap().into_wire();

        assert_eq!(Signup::from_wire_item(Some(wire)).unwrap(), signup());
    }

    #[test]
    fn test_primary_key_requires_all_fields() {
        let record = Signup {
            timestamp: String::new(),
            ..signup()
        };

        assert_eq!(
            record.primary_key().unwrap(),
            KeyPair::new("USER#SIGNUP", "TS#")
        );
        assert_eq!(
            Signup::full_item_key(&TableAttributes::new()).unwrap_err(),
            KeyError::MissingField("timestamp".to_string())
        );
        assert_eq!(
            Signup::create_item_key(&TableAttributes::new()).unwrap(),
            KeyPair::new("USER#SIGNUP", "TS#")
        );
    }

    #[test]
    fn test_matches() {
        assert!(Signup::matches("USER#SIGNUP", "TS#2025"));
        assert!(!Signup::matches("USER#OTHER", "TS#2025"));
        assert!(!Signup::matches("USER#SIGNUP", "TS#"));
    }

    #[test]
    fn test_from_change_event() {
        let event = json!({
            "eventName": "INSERT",
            "dynamodb": {
                "NewImage": {
                    "PK": {"S": "USER#SIGNUP"},
                    "SK": {"S": "TS#2025-05-04T22:57:47"},
                    "email": {"S": "tester@example.com"},
                    "timestamp": {"S": "2025-05-04T22:57:47"},
                    "username": {"S": "tester-001"},
                    "unrelated": {"N": "1"},
                }
            }
        });

        assert_eq!(Signup::from_change_event(&event).unwrap(), signup());
    }

    #[test]
    fn test_from_change_event_mismatch() {
        let event = json!({
            "dynamodb": {
                "NewImage": {
                    "PK": {"S": "ITEM#1"},
                    "SK": {"S": "DETAIL#1"},
                    "username": {"S": "tester-001"},
                }
            }
        });

        assert_eq!(
            Signup::from_change_event(&event).unwrap_err(),
            StreamError::PatternMismatch {
                pk: "ITEM#1".into(),
                sk: "DETAIL#1".into(),
                type_name: "Signup".into(),
            }
        );
    }

    #[derive(Debug)]
    struct Unbalanced;

    impl Record for Unbalanced {
        fn type_name() -> Cow<'static, str> {
            Cow::Borrowed("Unbalanced")
        }

        fn pk_template() -> Cow<'static, str> {
            Cow::Borrowed("USER#{id")
        }

        fn sk_template() -> Cow<'static, str> {
            Cow::Borrowed("PROFILE")
        }

        fn to_attributes(&self) -> TableAttributes {
            TableAttributes::new()
        }

        fn from_attributes(_: TableAttributes) -> Result<Self, ReadConversionError> {
            Ok(Self)
        }
    }

    #[test]
    fn test_from_change_event_invalid_template() {
        let event = json!({
            "dynamodb": {
                "NewImage": {
                    "PK": {"S": "USER#1"},
                    "SK": {"S": "PROFILE"},
                    "name": {"S": "tester-001"},
                }
            }
        });

        assert!(!Unbalanced::matches("USER#1", "PROFILE"));
        assert!(matches!(
            Unbalanced::from_change_event(&event).unwrap_err(),
            StreamError::Template(TemplateError::UnbalancedBrace { brace: '{', .. })
        ));
    }

    #[test]
    fn test_display_key() {
        assert_eq!(
            signup().display_key().to_string(),
            "Signup(PK=USER#SIGNUP, SK=TS#2025-05-04T22:57:47)"
        );
        assert!(Unbalanced
            .display_key()
            .to_string()
            .starts_with("Unbalanced(<"));
    }
}
