pub mod batch;
pub mod config;
pub mod error;
pub mod filters;
pub mod recursive;
pub mod selection;
pub mod wildcard;

pub use batch::{
    BatchRunner, BatchSummary, DocumentHost, ExecutionError, ItemOutcome, ItemReport, LogProgress,
    ProgressSink, parse_commands,
};
pub use config::{Config, GeneralConfig};
pub use error::{AppError, Result};
pub use filters::{FileFilter, HierarchyFilter};
pub use recursive::{BreadthFirst, RecursiveExt, flatten, try_flatten};
pub use selection::{ProjectNode, Selection, SelectionPipeline, SubProjectDescent};
pub use wildcard::{Wildcard, WildcardOptions};
