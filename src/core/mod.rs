pub mod delivery;
pub mod etl;
pub mod naming;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{ProcessedRow, RowOutcome, RunReport, Sheet, SourceRow, TransformResult};
pub use crate::domain::ports::{ImageSource, MediaHost, Pipeline, Storage};
pub use crate::utils::error::Result;
