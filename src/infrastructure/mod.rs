pub mod http_catalog;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
