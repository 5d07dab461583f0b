//! Offline ingestion: FAQ records in, a built `VectorIndex` out

pub mod builder;
pub mod faq;

pub use builder::IndexBuilder;
pub use faq::{clean_records, load_records, FaqRecord};
