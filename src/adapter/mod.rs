//! The minimal get/put/query contract the table layer needs from a store.
mod dynamo;
mod memory;

pub use dynamo::DynamoAdapter;
pub use memory::MemoryAdapter;

use crate::{codec::WireItem, key::KeyPair, TableAttributes};
use async_trait::async_trait;
use aws_sdk_dynamodb::error::BuildError;
use thiserror::Error;

/// Condition that only lets a put through when no item exists under the key.
pub const IF_NOT_EXISTS: &str = "attribute_not_exists(PK)";
/// Condition that only lets a put through when an item already exists under the key.
pub const IF_EXISTS: &str = "attribute_exists(PK)";

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Condition failed for item {pk} / {sk}")]
    ConditionFailed { pk: String, sk: String },
    #[error("AwsError: {0}")]
    Transport(String),
    #[error("AwsBuildError: {0}")]
    Build(#[from] BuildError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Items(Vec<WireItem>),
    Count(usize),
}

impl QueryOutput {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Items(_) => "items",
            Self::Count(_) => "a count",
        }
    }
}

#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Write `item`, which must carry `PK` and `SK`. When `condition` is given and does
    /// not hold, fails with [`AdapterError::ConditionFailed`].
    async fn put(&self, item: TableAttributes, condition: Option<&str>) -> Result<(), AdapterError>;

    async fn get(&self, key: &KeyPair) -> Result<Option<WireItem>, AdapterError>;

    /// Items under `pk` whose sort key starts with `sk_prefix`, in sort key order.
    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        count_only: bool,
    ) -> Result<QueryOutput, AdapterError>;
}
