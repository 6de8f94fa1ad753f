//! Conversion between plain items and the store's tagged representations.
//!
//! Items come back from the SDK as [`WireItem`]s and from change streams as JSON maps of
//! single-tag envelopes (`{"S": "..."}`, `{"N": "42"}`, ...). Both decode into
//! [`TableAttributes`].
pub mod stream;

use crate::{
    key::{KeyPair, PARTITION_KEY, SORT_KEY},
    table::TableAttribute,
    TableAttributes,
};
use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::error;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

pub use stream::{decode_change_event, ChangeEvent, StreamError, StreamRecord};

/// An item in the tagged form used by the SDK.
pub type WireItem = HashMap<String, AttributeValue>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown type tag '{0}'")]
    UnknownTag(String),
    #[error("Expected exactly one type tag, found {0}")]
    Envelope(usize),
    #[error("Expected a tagged envelope, found {0}")]
    NotAnEnvelope(String),
    #[error("Invalid payload for tag '{tag}': {payload}")]
    InvalidPayload { tag: String, payload: String },
    #[error("Unsupported attribute value: {0}")]
    Unsupported(String),
}

/// Decode a JSON tagged map, as carried by change-stream images, into a plain item.
///
/// Fails on the first malformed attribute; the offending payload is logged.
pub fn decode_wire_item(item: &Map<String, Value>) -> Result<TableAttributes, DecodeError> {
    item.iter()
        .map(|(name, value)| {
            let attribute = decode_value(value).map_err(|err| {
                error!("Failed to decode attribute '{name}' from {value}: {err}");
                err
            })?;
            Ok::<_, DecodeError>((name.clone(), attribute))
        })
        .collect()
}

/// Encode a plain item into the SDK's tagged form.
pub fn encode_wire_item(item: TableAttributes) -> WireItem {
    item.into_wire()
}

/// Merge plain fields with their key pair into a storable item.
pub fn encode_item(fields: TableAttributes, key: KeyPair) -> TableAttributes {
    fields.merge(key.into())
}

/// Split an item into its key strings and the remaining fields.
pub(crate) fn split_keys(mut item: TableAttributes) -> (Option<KeyPair>, TableAttributes) {
    let pk = item.remove(PARTITION_KEY);
    let sk = item.remove(SORT_KEY);

    let key = match (pk, sk) {
        (Some(TableAttribute::String(pk)), Some(TableAttribute::String(sk))) => {
            Some(KeyPair { pk, sk })
        }
        _ => None,
    };

    (key, item)
}

fn decode_value(value: &Value) -> Result<TableAttribute, DecodeError> {
    let Value::Object(envelope) = value else {
        return Err(DecodeError::NotAnEnvelope(value.to_string()));
    };

    let mut tags = envelope.iter();
    let (Some((tag, payload)), None) = (tags.next(), tags.next()) else {
        return Err(DecodeError::Envelope(envelope.len()));
    };

    let invalid = || DecodeError::InvalidPayload {
        tag: tag.clone(),
        payload: payload.to_string(),
    };

    Ok(match tag.as_str() {
        "S" => TableAttribute::String(payload.as_str().ok_or_else(invalid)?.to_string()),
        "N" => TableAttribute::Number(number(payload).ok_or_else(invalid)?),
        "B" => TableAttribute::Bytes(bytes(payload).ok_or_else(invalid)?),
        "BOOL" => TableAttribute::Bool(payload.as_bool().ok_or_else(invalid)?),
        "NULL" => match payload {
            Value::Bool(true) => TableAttribute::Null,
            _ => return Err(invalid()),
        },
        "SS" => TableAttribute::StringVec(
            array(payload, |v| v.as_str().map(str::to_string)).ok_or_else(invalid)?,
        ),
        "NS" => TableAttribute::NumberVec(array(payload, number).ok_or_else(invalid)?),
        "BS" => TableAttribute::ByteVec(array(payload, bytes).ok_or_else(invalid)?),
        "M" => {
            let map = payload.as_object().ok_or_else(invalid)?;
            TableAttribute::Map(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
                    .collect::<Result<_, DecodeError>>()?,
            )
        }
        "L" => {
            let list = payload.as_array().ok_or_else(invalid)?;
            TableAttribute::List(list.iter().map(decode_value).collect::<Result<_, _>>()?)
        }
        other => return Err(DecodeError::UnknownTag(other.to_string())),
    })
}

fn number(value: &Value) -> Option<String> {
    let text = value.as_str()?;
    let finite = text.trim().parse::<f64>().map_or(false, f64::is_finite);
    finite.then(|| text.to_string())
}

fn bytes(value: &Value) -> Option<Vec<u8>> {
    STANDARD.decode(value.as_str()?).ok()
}

fn array<T>(value: &Value, f: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    value.as_array()?.iter().map(f).collect()
}
