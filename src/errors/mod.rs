use thiserror::Error;

pub use crate::{
    adapter::AdapterError,
    codec::{DecodeError, StreamError},
    key::{KeyError, KeyPair, RegistryError},
    pattern::TemplateError,
    traits::ReadConversionError,
};

/// Error returned when turning a stored item back into a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    #[error("Item not found")]
    NotFound,
    #[error("Item is missing its key attributes")]
    MissingKeys,
    #[error("DecodeError: {0}")]
    Decode(#[from] DecodeError),
    #[error("Read Conversion Error: {0}")]
    ReadConversion(#[from] ReadConversionError),
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
}

/// Error returned by [`crate::Table::save`] when building and writing a record
#[derive(Error, Debug)]
pub enum PutError {
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
    #[error("AdapterError: {0}")]
    Transport(#[from] AdapterError),
}

/// Error returned by [`crate::Table::read`] when retrieving a single record
#[derive(Error, Debug)]
pub enum GetError {
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
    #[error("No item found for key: {0}")]
    NotFound(KeyPair),
    #[error("ReadError: {0}")]
    Read(#[from] ReadError),
    #[error("AdapterError: {0}")]
    Transport(#[from] AdapterError),
}

/// Error returned by [`crate::Table::list_by_prefix`] and [`crate::Table::count_by_prefix`]
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
    #[error("AdapterError: {0}")]
    Transport(#[from] AdapterError),
    #[error("Adapter returned {0} where {1} was expected")]
    UnexpectedOutput(&'static str, &'static str),
}

/// Error abstracting all errors returned by `dynawrap`.
///
/// If you use this error you can use `?` to convert from other `dynawrap` errors to
/// this one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("TemplateError: {0}")]
    Template(#[from] TemplateError),
    #[error("KeyError: {0}")]
    Key(#[from] KeyError),
    #[error("RegistryError: {0}")]
    Registry(#[from] RegistryError),
    #[error("StreamError: {0}")]
    Stream(#[from] StreamError),
    #[error("ReadError: {0}")]
    Read(#[from] ReadError),
    #[error("PutError: {0}")]
    Put(#[from] PutError),
    #[error("GetError: {0}")]
    Get(#[from] GetError),
    #[error("QueryError: {0}")]
    Query(#[from] QueryError),
}
