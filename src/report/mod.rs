// src/report/mod.rs
pub mod models;

#[allow(unused_imports)]
pub use models::{Category, CategoryTotal, GrandTotal, Record, RecordSet};
