pub mod etl;
pub mod fetch;
pub mod resolver;

pub use crate::domain::model::{RawSource, Records};
pub use crate::domain::ports::{ConfigProvider, Fetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
