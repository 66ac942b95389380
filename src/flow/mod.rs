pub mod conversion;
pub mod definition;
pub mod editor;
pub mod graph;

pub use conversion::*;
pub use definition::*;
pub use editor::{EditorFlowchart, EditorId};
pub use graph::{BlockIdx, ThreadGraph};
