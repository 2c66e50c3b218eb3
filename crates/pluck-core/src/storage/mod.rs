//! Persistent row store on sled.
//!
//! Rows are encoded with [`codec`], wrapped in an rkyv [`Record`] and stored
//! under `entity \0 key` so that one entity's rows form a contiguous range.

mod codec;
mod config;
mod engine;
mod record;

pub mod key;

pub use codec::{decode_row, decode_row_projected, encode_row};
pub use config::StorageConfig;
pub use engine::SledStore;
pub use record::Record;
