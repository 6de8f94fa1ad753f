use super::{AdapterError, QueryOutput, StoreAdapter};
use crate::{
    codec::WireItem,
    key::{key_strings, KeyPair, PARTITION_KEY, SORT_KEY},
    table::TableSpec,
    TableAttributes,
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::SdkError,
    operation::put_item::PutItemError,
    types::{
        AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, Projection,
        ProjectionType, ProvisionedThroughput, Select,
    },
    Client,
};
use log::{debug, info};

/// Store adapter backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoAdapter {
    db: Client,
    table_name: String,
}

impl DynamoAdapter {
    pub fn new(db: Client, table_name: impl Into<String>) -> Self {
        Self {
            db,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn client(&self) -> &Client {
        &self.db
    }

    /// Provision the table described by `spec`.
    pub async fn create_table(&self, spec: &TableSpec) -> Result<(), AdapterError> {
        info!(
            "Creating table {} with index {}",
            spec.table_name(),
            spec.index_name()
        );

        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(spec.read_capacity())
            .write_capacity_units(spec.write_capacity())
            .build()?;

        let attribute_definitions = spec
            .attribute_definitions()
            .into_iter()
            .map(|(name, ty)| {
                AttributeDefinition::builder()
                    .attribute_name(name)
                    .attribute_type(ty.into())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let key_schema = spec
            .key_schema()
            .into_iter()
            .map(|(name, role)| {
                KeySchemaElement::builder()
                    .attribute_name(name)
                    .key_type(role.into())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index_key_schema = spec
            .index_key_schema()
            .into_iter()
            .map(|(name, role)| {
                KeySchemaElement::builder()
                    .attribute_name(name)
                    .key_type(role.into())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let index = GlobalSecondaryIndex::builder()
            .index_name(spec.index_name())
            .set_key_schema(Some(index_key_schema))
            .projection(
                Projection::builder()
                    .projection_type(ProjectionType::KeysOnly)
                    .build(),
            )
            .provisioned_throughput(throughput.clone())
            .build()?;

        self.db
            .create_table()
            .table_name(spec.table_name())
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .global_secondary_indexes(index)
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;

        info!("Created table {}", spec.table_name());

        Ok(())
    }
}

#[async_trait]
impl StoreAdapter for DynamoAdapter {
    async fn put(&self, item: TableAttributes, condition: Option<&str>) -> Result<(), AdapterError> {
        let (pk, sk) = key_strings(&item)
            .map(|(pk, sk)| (pk.to_string(), sk.to_string()))
            .unwrap_or_default();

        debug!("PUT {pk} / {sk} into {}", self.table_name);

        let result = self
            .db
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item.into_wire()))
            .set_condition_expression(condition.map(str::to_string))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(SdkError::ServiceError(err))
                if matches!(err.err(), PutItemError::ConditionalCheckFailedException(_)) =>
            {
                Err(AdapterError::ConditionFailed { pk, sk })
            }
            Err(e) => Err(AdapterError::Transport(e.to_string())),
        }
    }

    async fn get(&self, key: &KeyPair) -> Result<Option<WireItem>, AdapterError> {
        debug!("GET {key} from {}", self.table_name);

        let result = self
            .db
            .get_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(key.pk.clone()))
            .key(SORT_KEY, AttributeValue::S(key.sk.clone()))
            .send()
            .await
            .map_err(|e| AdapterError::Transport(e.to_string()))?;

        Ok(result.item)
    }

    async fn query_prefix(
        &self,
        pk: &str,
        sk_prefix: &str,
        count_only: bool,
    ) -> Result<QueryOutput, AdapterError> {
        debug!(
            "QUERY {PARTITION_KEY}={pk} {SORT_KEY} begins with '{sk_prefix}' in {}",
            self.table_name
        );

        let mut items = vec![];
        let mut count = 0;
        let mut start_key: Option<WireItem> = None;

        loop {
            let mut query = self
                .db
                .query()
                .table_name(&self.table_name)
                .expression_attribute_names("#pk", PARTITION_KEY)
                .expression_attribute_values(":pk", AttributeValue::S(pk.to_string()))
                .set_exclusive_start_key(start_key.take());

            query = if sk_prefix.is_empty() {
                query.key_condition_expression("#pk = :pk")
            } else {
                query
                    .key_condition_expression("#pk = :pk AND begins_with(#sk, :sk)")
                    .expression_attribute_names("#sk", SORT_KEY)
                    .expression_attribute_values(":sk", AttributeValue::S(sk_prefix.to_string()))
            };

            if count_only {
                query = query.select(Select::Count);
            }

            let result = query
                .send()
                .await
                .map_err(|e| AdapterError::Transport(e.to_string()))?;

            count += usize::try_from(result.count()).unwrap_or_default();

            if let Some(page) = result.items {
                items.extend(page);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        if count_only {
            Ok(QueryOutput::Count(count))
        } else {
            Ok(QueryOutput::Items(items))
        }
    }
}
