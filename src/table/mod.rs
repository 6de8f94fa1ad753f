mod query;
mod spec;
mod table_attribute;
mod table_attributes;

pub use self::{
    query::Records,
    spec::{KeyAttributeType, KeyRole, TableSpec, GSI_PARTITION_KEY, GSI_SORT_KEY},
    table_attribute::{TableAttribute, TryFromTableAttr},
    table_attributes::TableAttributes,
};

use crate::{
    adapter::{AdapterError, QueryOutput, StoreAdapter},
    errors::{GetError, PutError, QueryError},
    traits::Record,
};
use log::{error, warn};

/// Drives records through a [`StoreAdapter`].
pub struct Table<A> {
    adapter: A,
}

impl<A: StoreAdapter> Table<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Write a record, replacing any item under the same key.
    pub async fn save<R: Record>(&self, record: &R) -> Result<(), PutError> {
        self.put(record, None).await.map(|_| ())
    }

    /// Write a record only if `condition` holds. Returns `false` when the store rejected
    /// the write because of the condition.
    pub async fn save_if<R: Record>(&self, record: &R, condition: &str) -> Result<bool, PutError> {
        self.put(record, Some(condition)).await
    }

    async fn put<R: Record>(&self, record: &R, condition: Option<&str>) -> Result<bool, PutError> {
        let item = record.to_store_item()?;

        match self.adapter.put(item, condition).await {
            Ok(()) => Ok(true),
            Err(AdapterError::ConditionFailed { pk, sk }) => {
                warn!("Item with PK: {pk} and SK: {sk} was not written, condition failed");
                Ok(false)
            }
            Err(err) => {
                error!("Error inserting item: {err}");
                Err(err.into())
            }
        }
    }

    /// Fetch the record whose key is built from `values`, if it exists.
    ///
    /// The key is built the same way as [`Record::create_item_key`], so missing sort key
    /// fields shorten the sort key instead of failing. Such a key usually names no item.
    pub async fn get<R: Record>(&self, values: &TableAttributes) -> Result<Option<R>, GetError> {
        let key = R::create_item_key(values)?;

        match self.adapter.get(&key).await? {
            Some(item) => Ok(Some(R::from_wire_item(Some(item))?)),
            None => Ok(None),
        }
    }

    /// Like [`Table::get`], but a missing item is [`GetError::NotFound`].
    pub async fn read<R: Record>(&self, values: &TableAttributes) -> Result<R, GetError> {
        let key = R::create_item_key(values)?;

        let Some(item) = self.adapter.get(&key).await? else {
            error!("Item '{key}' not found");
            return Err(GetError::NotFound(key));
        };

        Ok(R::from_wire_item(Some(item))?)
    }

    /// Records under the partition key built from `values` whose sort key starts with the
    /// (possibly partial) sort key built from `values`.
    pub async fn list_by_prefix<R: Record>(
        &self,
        values: &TableAttributes,
    ) -> Result<Records<R>, QueryError> {
        let key = R::create_item_key(values)?;

        match self.adapter.query_prefix(&key.pk, &key.sk, false).await? {
            QueryOutput::Items(items) => Ok(Records::new(items)),
            other => Err(QueryError::UnexpectedOutput(other.kind(), "items")),
        }
    }

    /// Number of items [`Table::list_by_prefix`] would return, without fetching them.
    pub async fn count_by_prefix<R: Record>(
        &self,
        values: &TableAttributes,
    ) -> Result<usize, QueryError> {
        let key = R::create_item_key(values)?;

        match self.adapter.query_prefix(&key.pk, &key.sk, true).await? {
            QueryOutput::Count(count) => Ok(count),
            other => Err(QueryError::UnexpectedOutput(other.kind(), "a count")),
        }
    }
}
