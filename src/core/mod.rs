pub mod assets;
pub mod etl;
pub mod filter;
pub mod normalize;
pub mod pagination;
pub mod persist;

pub use crate::domain::model::{MtgSet, PageResponse, RunSummary, TransformResult};
pub use crate::domain::ports::{ConfigProvider, PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
