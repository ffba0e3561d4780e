pub mod etl;
pub mod pipeline;

pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
