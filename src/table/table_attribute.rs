use crate::{codec::DecodeError, traits::ReadConversionError};
use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use std::{
    collections::{BTreeMap, HashMap},
    str::FromStr,
};

/// Trait for converting `TableAttribute` to `Self`
pub trait TryFromTableAttr: Sized {
    /// Try to convert `value` to `Self`
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError>;
}

/// A plain (untagged) attribute value.
///
/// Numbers keep the decimal text they were stored with so that no precision is lost
/// between the store and the typed field they are read into.
#[derive(Clone, PartialEq, Debug)]
pub enum TableAttribute {
    String(String),
    Number(String),
    Bool(bool),
    Bytes(Vec<u8>),

    StringVec(Vec<String>),
    ByteVec(Vec<Vec<u8>>),
    NumberVec(Vec<String>),
    Map(HashMap<String, TableAttribute>),
    List(Vec<TableAttribute>),

    Null,
}

impl TableAttribute {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The store's type tag for this value.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::String(_) => "S",
            Self::Number(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Bytes(_) => "B",
            Self::StringVec(_) => "SS",
            Self::ByteVec(_) => "BS",
            Self::NumberVec(_) => "NS",
            Self::Map(_) => "M",
            Self::List(_) => "L",
            Self::Null => "NULL",
        }
    }

    fn conversion_failed<T>() -> ReadConversionError {
        ReadConversionError::ConversionFailed(std::any::type_name::<T>().to_string())
    }
}

macro_rules! impl_number_attr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TableAttribute {
                fn from(value: $ty) -> Self {
                    TableAttribute::Number(value.to_string())
                }
            }

            impl TryFromTableAttr for $ty {
                fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
                    let TableAttribute::Number(number) = value else {
                        return Err(TableAttribute::conversion_failed::<$ty>());
                    };

                    number
                        .trim()
                        .parse()
                        .map_err(|_| TableAttribute::conversion_failed::<$ty>())
                }
            }
        )*
    };
}

macro_rules! impl_simple_attr {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TableAttribute {
                fn from(value: $ty) -> Self {
                    TableAttribute::$variant(value)
                }
            }

            impl TryFromTableAttr for $ty {
                fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
                    match value {
                        TableAttribute::$variant(value) => Ok(value),
                        _ => Err(TableAttribute::conversion_failed::<$ty>()),
                    }
                }
            }
        )*
    };
}

// Vec<String>, Vec<number> and Vec<Vec<u8>> go through the Vec<T> impls below
impl_number_attr!(i16, i32, i64, i128, u16, u32, u64, u128, usize, isize, f32, f64);
impl_simple_attr!(String => String, Vec<u8> => Bytes, bool => Bool);

impl From<&str> for TableAttribute {
    fn from(value: &str) -> Self {
        TableAttribute::String(value.to_string())
    }
}

impl From<&String> for TableAttribute {
    fn from(value: &String) -> Self {
        TableAttribute::String(value.clone())
    }
}

impl TryFromTableAttr for TableAttribute {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        Ok(value)
    }
}

impl<T> TryFromTableAttr for Option<T>
where
    T: TryFromTableAttr,
{
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_table_attr(value).map(Some)
        }
    }
}

impl<T> From<Option<T>> for TableAttribute
where
    T: Into<TableAttribute>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(TableAttribute::Null)
    }
}

impl<T> TryFromTableAttr for Vec<T>
where
    T: TryFromTableAttr,
{
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            TableAttribute::StringVec(v) => v
                .into_iter()
                .map(|s| T::try_from_table_attr(TableAttribute::String(s)))
                .collect(),
            TableAttribute::NumberVec(v) => v
                .into_iter()
                .map(|n| T::try_from_table_attr(TableAttribute::Number(n)))
                .collect(),
            TableAttribute::ByteVec(v) => v
                .into_iter()
                .map(|b| T::try_from_table_attr(TableAttribute::Bytes(b)))
                .collect(),
            TableAttribute::List(v) => v.into_iter().map(T::try_from_table_attr).collect(),
            _ => Err(TableAttribute::conversion_failed::<Vec<T>>()),
        }
    }
}

impl<T> From<Vec<T>> for TableAttribute
where
    T: Into<TableAttribute>,
{
    /// Homogeneous lists of strings, numbers or bytes become sets (`SS`, `NS`, `BS`);
    /// anything else, including an empty list, becomes a list.
    fn from(value: Vec<T>) -> Self {
        let attributes: Vec<TableAttribute> = value.into_iter().map(Into::into).collect();

        let Some(first) = attributes.first() else {
            return TableAttribute::List(attributes);
        };

        let homogeneous = attributes
            .iter()
            .all(|a| std::mem::discriminant(a) == std::mem::discriminant(first));

        if !homogeneous {
            return TableAttribute::List(attributes);
        }

        match first {
            TableAttribute::String(_) => TableAttribute::StringVec(
                attributes
                    .into_iter()
                    .filter_map(|a| match a {
                        TableAttribute::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            TableAttribute::Number(_) => TableAttribute::NumberVec(
                attributes
                    .into_iter()
                    .filter_map(|a| match a {
                        TableAttribute::Number(n) => Some(n),
                        _ => None,
                    })
                    .collect(),
            ),
            TableAttribute::Bytes(_) => TableAttribute::ByteVec(
                attributes
                    .into_iter()
                    .filter_map(|a| match a {
                        TableAttribute::Bytes(b) => Some(b),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => TableAttribute::List(attributes),
        }
    }
}

impl<K, V> From<HashMap<K, V>> for TableAttribute
where
    K: ToString,
    V: Into<TableAttribute>,
{
    fn from(map: HashMap<K, V>) -> Self {
        TableAttribute::Map(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> From<BTreeMap<K, V>> for TableAttribute
where
    K: ToString,
    V: Into<TableAttribute>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        TableAttribute::Map(
            map.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

fn try_from_map<K, V, M>(value: TableAttribute) -> Result<M, ReadConversionError>
where
    K: FromStr,
    V: TryFromTableAttr,
    M: FromIterator<(K, V)>,
{
    let TableAttribute::Map(map) = value else {
        return Err(TableAttribute::conversion_failed::<M>());
    };

    map.into_iter()
        .map(|(k, v)| {
            let k = k
                .parse::<K>()
                .map_err(|_| TableAttribute::conversion_failed::<K>())?;
            Ok((k, V::try_from_table_attr(v)?))
        })
        .collect()
}

impl<K, V> TryFromTableAttr for HashMap<K, V>
where
    K: FromStr + std::hash::Hash + Eq,
    V: TryFromTableAttr,
{
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        try_from_map::<K, V, Self>(value)
    }
}

impl<K, V> TryFromTableAttr for BTreeMap<K, V>
where
    K: FromStr + Ord,
    V: TryFromTableAttr,
{
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        try_from_map::<K, V, Self>(value)
    }
}

impl From<TableAttribute> for AttributeValue {
    fn from(attribute: TableAttribute) -> Self {
        match attribute {
            TableAttribute::String(s) => AttributeValue::S(s),
            TableAttribute::StringVec(s) => AttributeValue::Ss(s),
            TableAttribute::Number(n) => AttributeValue::N(n),
            TableAttribute::NumberVec(n) => AttributeValue::Ns(n),
            TableAttribute::Bytes(b) => AttributeValue::B(Blob::new(b)),
            TableAttribute::ByteVec(b) => AttributeValue::Bs(b.into_iter().map(Blob::new).collect()),
            TableAttribute::Bool(b) => AttributeValue::Bool(b),
            TableAttribute::List(l) => AttributeValue::L(l.into_iter().map(Into::into).collect()),
            TableAttribute::Map(m) => {
                AttributeValue::M(m.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            TableAttribute::Null => AttributeValue::Null(true),
        }
    }
}

impl TryFrom<AttributeValue> for TableAttribute {
    type Error = DecodeError;

    fn try_from(attribute: AttributeValue) -> Result<Self, Self::Error> {
        Ok(match attribute {
            AttributeValue::S(s) => TableAttribute::String(s),
            AttributeValue::N(n) => TableAttribute::Number(n),
            AttributeValue::Bool(b) => TableAttribute::Bool(b),
            AttributeValue::B(b) => TableAttribute::Bytes(b.into_inner()),
            AttributeValue::Ss(s) => TableAttribute::StringVec(s),
            AttributeValue::Ns(n) => TableAttribute::NumberVec(n),
            AttributeValue::Bs(b) => {
                TableAttribute::ByteVec(b.into_iter().map(Blob::into_inner).collect())
            }
            AttributeValue::L(l) => TableAttribute::List(
                l.into_iter()
                    .map(TableAttribute::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            AttributeValue::M(m) => TableAttribute::Map(
                m.into_iter()
                    .map(|(k, v)| Ok((k, TableAttribute::try_from(v)?)))
                    .collect::<Result<_, DecodeError>>()?,
            ),
            AttributeValue::Null(_) => TableAttribute::Null,
            other => return Err(DecodeError::Unsupported(format!("{other:?}"))),
        })
    }
}
