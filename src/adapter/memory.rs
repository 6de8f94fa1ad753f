use super::{AdapterError, QueryOutput, StoreAdapter, IF_EXISTS, IF_NOT_EXISTS};
use crate::{
    codec::WireItem,
    key::{key_strings, KeyPair, PARTITION_KEY, SORT_KEY},
    TableAttributes,
};
use async_trait::async_trait;
use log::debug;
use std::{collections::BTreeMap, ops::Bound, sync::Arc};
use tokio::sync::RwLock;

type Items = BTreeMap<(String, String), WireItem>;

/// In-memory store adapter. Clones share the same underlying items.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    items: Arc<RwLock<Items>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    fn prefix_range<'a>(
        items: &'a Items,
        pk: &'a str,
        sk_prefix: &'a str,
    ) -> impl Iterator<Item = &'a WireItem> + 'a {
        let start = (pk.to_string(), sk_prefix.to_string());

        items
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(move |((item_pk, item_sk), _)| {
                item_pk == pk && item_sk.starts_with(sk_prefix)
            })
            .map(|(_, item)| item)
    }
}

#[async_trait]
impl StoreAdapter for MemoryAdapter {
    async fn put(&self, item: TableAttributes, condition: Option<&str>) -> Result<(), AdapterError> {
        let (pk, sk) = key_strings(&item)
            .map(|(pk, sk)| (pk.to_string(), sk.to_string()))
            .ok_or_else(|| {
                AdapterError::Transport(format!(
                    "Item is missing string '{PARTITION_KEY}' or '{SORT_KEY}'"
                ))
            })?;

        debug!("PUT {pk} / {sk} into memory");

        let mut items = self.items.write().await;
        let key = (pk, sk);
        let exists = items.contains_key(&key);

        let allowed = match condition.map(str::trim) {
            None => true,
            Some(IF_NOT_EXISTS) => !exists,
            Some(IF_EXISTS) => exists,
            Some(other) => {
                return Err(AdapterError::Transport(format!(
                    "Unsupported condition expression: {other}"
                )))
            }
        };

        if !allowed {
            let (pk, sk) = key;
            return Err(AdapterError::ConditionFailed { pk, sk });
        }

        items.insert(key, item.into_wire());

        Ok(())
    }

    async fn get(&self, key: &KeyPair) -> Result<Option<WireItem>, AdapterError> {
        debug!("GET {key} from memory");

        Ok(self
            .items
            .read()
            .await
            .get(&(key.pk.clone(), key.sk.clone()))
            .cloned())
    }

    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        count_only: bool,
    ) -> Result<QueryOutput, AdapterError> {
        debug!("QUERY {PARTITION_KEY}={pk} {SORT_KEY} begins with '{sk_prefix}' in memory");

        let items = self.items.read().await;
        let matching = Self::prefix_range(&items, pk, sk_prefix);

        Ok(if count_only {
            QueryOutput::Count(matching.count())
        } else {
            QueryOutput::Items(matching.cloned().collect())
        })
    }
}
