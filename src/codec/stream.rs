use super::{decode_wire_item, DecodeError};
use crate::{
    key::{key_strings, PARTITION_KEY, SORT_KEY},
    pattern::TemplateError,
    traits::ReadConversionError,
    TableAttributes,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StreamError {
    #[error("DecodeError: {0}")]
    Decode(#[from] DecodeError),
    #[error("Malformed stream record: {0}")]
    MalformedRecord(String),
    #[error("Stream record holds no attributes besides its keys")]
    EmptyRecord,
    #[error("Keys {pk} / {sk} do not match the access patterns of {type_name}")]
    PatternMismatch {
        pk: String,
        sk: String,
        type_name: String,
    },
    #[error("TemplateError: {0}")]
    Template(#[from] TemplateError),
    #[error("ReadConversionError: {0}")]
    ReadConversion(#[from] ReadConversionError),
}

/// A single change-stream event. Only the fields this crate reads are modelled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub dynamodb: Option<StreamRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamRecord {
    #[serde(default)]
    pub keys: Option<Map<String, Value>>,
    #[serde(default)]
    pub new_image: Option<Map<String, Value>>,
    #[serde(default)]
    pub old_image: Option<Map<String, Value>>,
    #[serde(default)]
    pub sequence_number: Option<String>,
    #[serde(default)]
    pub stream_view_type: Option<String>,
}

impl ChangeEvent {
    pub fn record(&self) -> Result<&StreamRecord, StreamError> {
        self.dynamodb
            .as_ref()
            .ok_or_else(|| StreamError::MalformedRecord("missing 'dynamodb' envelope".into()))
    }

    /// Decode the image after the change, if the stream carries one.
    pub fn new_image(&self) -> Result<Option<TableAttributes>, StreamError> {
        decode_image(self.record()?.new_image.as_ref())
    }

    /// Decode the image before the change, if the stream carries one.
    pub fn old_image(&self) -> Result<Option<TableAttributes>, StreamError> {
        decode_image(self.record()?.old_image.as_ref())
    }

    pub fn keys(&self) -> Result<Option<TableAttributes>, StreamError> {
        decode_image(self.record()?.keys.as_ref())
    }
}

fn decode_image(image: Option<&Map<String, Value>>) -> Result<Option<TableAttributes>, StreamError> {
    image
        .map(decode_wire_item)
        .transpose()
        .map_err(StreamError::from)
}

/// Extract and validate the new image of a change-stream event.
///
/// The returned item keeps `PK` and `SK`. It must hold at least one other attribute.
pub fn decode_change_event(event: &Value) -> Result<TableAttributes, StreamError> {
    let event = ChangeEvent::deserialize(event)
        .map_err(|err| StreamError::MalformedRecord(err.to_string()))?;

    let image = event
        .new_image()?
        .ok_or_else(|| StreamError::MalformedRecord("missing 'NewImage'".into()))?;

    for key in [PARTITION_KEY, SORT_KEY] {
        if !image.contains(key) {
            return Err(StreamError::MalformedRecord(format!("missing key '{key}'")));
        }
    }

    if key_strings(&image).is_none() {
        return Err(StreamError::MalformedRecord(format!(
            "'{PARTITION_KEY}' and '{SORT_KEY}' must be strings"
        )));
    }

    if image.len() <= 2 {
        return Err(StreamError::EmptyRecord);
    }

    Ok(image)
}
