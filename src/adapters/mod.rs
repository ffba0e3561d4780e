// Adapters: concrete record sources behind the RecordSource port.

pub mod file_source;
pub mod http_source;
pub mod mapping;
pub mod sample;

pub use file_source::FileRecordSource;
pub use http_source::HttpRecordSource;
