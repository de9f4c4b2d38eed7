//! Infrastructure adapters

mod completion_adapter;

pub use completion_adapter::HttpCompletionAdapter;
