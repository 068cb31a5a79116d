pub mod clickhouse_sales;

pub use clickhouse_sales::*;
