/// Chart builders: pure functions from a dataset and a set of parameters to
/// a chart description the UI can draw (or export as JSON).
pub mod bar;
pub mod heatmap;
pub mod radar;
pub mod scatter;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),
    #[error("no tracks match the current selection")]
    EmptySelection,
    #[error("no track named '{0}' in the current selection")]
    SongNotFound(String),
}

pub type ChartResult<T> = Result<T, ChartError>;
