use super::definition::Flowchart;
use crate::error::FlowConversionError;

/// A trait for data models that can be converted into a Douki `Flowchart`.
///
/// The editor's own JSON format implements this through
/// [`EditorFlowchart`](super::EditorFlowchart). Other front ends provide their
/// own translation layer the same way.
///
/// # Example
///
/// ```rust,no_run
/// use douki::error::FlowConversionError;
/// use douki::flow::{Block, BlockKind, Connection, Flowchart, IntoFlowchart, Thread};
///
/// struct Script {
///     steps: Vec<String>,
/// }
///
/// impl IntoFlowchart for Script {
///     fn into_flowchart(self) -> Result<Flowchart, FlowConversionError> {
///         let mut blocks = vec![Block::new("start", BlockKind::Start)];
///         let mut connections = Vec::new();
///         let mut previous = "start".to_string();
///         for (i, variable) in self.steps.iter().enumerate() {
///             let id = format!("out{}", i);
///             blocks.push(Block::new(&id, BlockKind::Output { variable: variable.clone() }));
///             connections.push(Connection::sequential(&previous, &id));
///             previous = id;
///         }
///         let thread = Thread::new("main", blocks, connections)?;
///         Ok(Flowchart::new(vec![thread], self.steps))
///     }
/// }
/// ```
pub trait IntoFlowchart {
    /// Consumes the object and converts it into a flowchart snapshot.
    fn into_flowchart(self) -> Result<Flowchart, FlowConversionError>;
}

impl IntoFlowchart for Flowchart {
    fn into_flowchart(self) -> Result<Flowchart, FlowConversionError> {
        Ok(self)
    }
}
