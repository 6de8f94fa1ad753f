//! Access-pattern keys and item marshalling for single-table DynamoDB designs.
//!
//! ```ignore
//! #[derive(Debug, Record)]
//! #[dynawrap(pk = "USER#{owner}#STORY#{story_id}", sk = "STORY#{story_id}")]
//! struct Story {
//!     owner: String,
//!     story_id: String,
//!     title: String,
//! }
//!
//! let table = Table::new(MemoryAdapter::new());
//! table.save(&story).await?;
//!
//! let values = [("owner", "johndoe"), ("story_id", "1234")].into_iter().collect();
//! let story: Story = table.read(&values).await?;
//! ```
extern crate self as dynawrap;

pub mod adapter;
pub mod codec;
pub mod errors;
pub mod key;
pub mod pattern;
pub mod table;
pub mod traits;

pub use adapter::{DynamoAdapter, MemoryAdapter, QueryOutput, StoreAdapter};
pub use codec::{decode_change_event, decode_wire_item, encode_item, ChangeEvent, WireItem};
pub use dynawrap_derive::Record;
pub use errors::Error;
pub use key::{build_key_pair, derive_prefix, is_match, KeyPair, PatternRegistry};
pub use pattern::Pattern;
pub use table::{Records, Table, TableAttribute, TableAttributes, TableSpec};
pub use traits::Record;
