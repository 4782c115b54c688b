//! Database access for processors, areas and operations

pub mod import;
pub mod operations;
pub mod processors;

pub use import::SqliteOperationStore;
pub use operations::{list_area_names, load_snapshot};
pub use processors::{ProcessorSummary, ensure_processor, get_processor_id, list_processors};
