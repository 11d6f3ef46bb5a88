//! Structured output: where-entry datasets and JSON writing.

pub mod dataset;
pub mod json;

pub use dataset::{
    build_where_entries, export_dataset, remove_nested_traces, select_nodes, DatasetEntry,
    DatasetMetadata, DatasetOptions, FrameRecord, WhereDataset, WhereEntry,
};
pub use json::{to_json_value, write_dataset, write_grouped_trace};
