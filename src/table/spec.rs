use crate::key::{PARTITION_KEY, SORT_KEY};
use aws_sdk_dynamodb::types::{KeyType, ScalarAttributeType};

/// Partition key of the secondary index.
pub const GSI_PARTITION_KEY: &str = "GSIPK";
/// Sort key of the secondary index.
pub const GSI_SORT_KEY: &str = "GSISK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAttributeType {
    String,
    Number,
}

impl From<KeyAttributeType> for ScalarAttributeType {
    fn from(value: KeyAttributeType) -> Self {
        match value {
            KeyAttributeType::String => ScalarAttributeType::S,
            KeyAttributeType::Number => ScalarAttributeType::N,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Hash,
    Range,
}

impl From<KeyRole> for KeyType {
    fn from(value: KeyRole) -> Self {
        match value {
            KeyRole::Hash => KeyType::Hash,
            KeyRole::Range => KeyType::Range,
        }
    }
}

/// Describes the single table every record lives in: `PK`/`SK` primary key plus one
/// keys-only secondary index on `GSIPK`/`GSISK`.
///
/// This is metadata only. [`crate::DynamoAdapter::create_table`] provisions it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    table_name: String,
    index_name: String,
    read_capacity: i64,
    write_capacity: i64,
}

impl TableSpec {
    pub fn new(table_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: index_name.into(),
            read_capacity: 1,
            write_capacity: 1,
        }
    }

    /// Override the provisioned throughput for both the table and its index.
    pub fn with_throughput(mut self, read_capacity: i64, write_capacity: i64) -> Self {
        self.read_capacity = read_capacity;
        self.write_capacity = write_capacity;
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn read_capacity(&self) -> i64 {
        self.read_capacity
    }

    pub fn write_capacity(&self) -> i64 {
        self.write_capacity
    }

    pub fn attribute_definitions(&self) -> [(&'static str, KeyAttributeType); 4] {
        [
            (PARTITION_KEY, KeyAttributeType::String),
            (SORT_KEY, KeyAttributeType::String),
            (GSI_PARTITION_KEY, KeyAttributeType::String),
            (GSI_SORT_KEY, KeyAttributeType::Number),
        ]
    }

    pub fn key_schema(&self) -> [(&'static str, KeyRole); 2] {
        [(PARTITION_KEY, KeyRole::Hash), (SORT_KEY, KeyRole::Range)]
    }

    pub fn index_key_schema(&self) -> [(&'static str, KeyRole); 2] {
        [(GSI_PARTITION_KEY, KeyRole::Hash), (GSI_SORT_KEY, KeyRole::Range)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let spec = TableSpec::new("stories", "stories-gsi");

        assert_eq!(spec.table_name(), "stories");
        assert_eq!(spec.index_name(), "stories-gsi");
        assert_eq!((spec.read_capacity(), spec.write_capacity()), (1, 1));
        assert_eq!(spec.key_schema()[0], ("PK", KeyRole::Hash));
        assert_eq!(spec.index_key_schema()[1], ("GSISK", KeyRole::Range));
        assert_eq!(spec.attribute_definitions()[3], ("GSISK", KeyAttributeType::Number));
    }

    #[test]
    fn test_with_throughput() {
        let spec = TableSpec::new("stories", "stories-gsi").with_throughput(5, 10);

        assert_eq!((spec.read_capacity(), spec.write_capacity()), (5, 10));
    }
}
