use dynawrap::Record;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Record)]
#[dynawrap(
    pk = "ACCOUNT#{account_id:08d}",
    sk = "{{v1}}#KIND#{kind}#AT#{at:>12}",
    type_name = "Various"
)]
struct Crazy {
    account_id: u64,
    #[dynawrap(rename = "kind")]
    record_kind: String,
    at: String,

    ct_str: Option<String>,

    ct_a: i64,
    ct_b: i32,
    ct_c: i16,
    ct_d: f64,
    ct_e: bool,
    ct_f: u32,
    ct_g: usize,

    ct_option_a: Option<i64>,
    ct_option_b: Option<f32>,
    ct_option_c: Option<bool>,

    ct_bytes: Vec<u8>,
    ct_byte_set: Vec<Vec<u8>>,
    ct_string_set: Vec<String>,
    ct_number_set: Vec<u16>,
    ct_hash_map: HashMap<String, String>,
    ct_btree_map: BTreeMap<String, Vec<i64>>,

    #[dynawrap(skip)]
    ct_skipped: Option<HashMap<u8, std::time::Duration>>,
}

#[derive(Debug, Record)]
#[dynawrap(pk = "USER#SIGNUP", sk = "SIGNUP")]
struct LiteralKeys {}

fn main() {}
