use dynawrap::{DynamoAdapter, TableSpec};

#[allow(dead_code)]
pub async fn create_table(adapter: &DynamoAdapter, index_name: &str) {
    let _ = adapter
        .client()
        .delete_table()
        .table_name(adapter.table_name())
        .send()
        .await;

    adapter
        .create_table(&TableSpec::new(adapter.table_name(), index_name).with_throughput(5, 5))
        .await
        .expect("Failed to create table");
}

#[macro_export]
macro_rules! assert_err {
    ($cond:expr,) => {
        $crate::assert_err!($cond);
    };
    ($cond:expr) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?})", t);
            },
            Err(e) => e,
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?}): {}", t, format_args!($($arg)+));
            },
            Err(e) => e,
        }
    };
}
