//! The JSON format written by the flowchart editor.
//!
//! Only the fields that influence generation are interpreted. Layout fields
//! (`text`, `left`, `top`, `targetEndpoint`) are carried so that documents can
//! be written back for the editor, but they never affect the IR.

use super::conversion::IntoFlowchart;
use super::definition::{
    Assignment, Block, BlockKind, Comparator, Connection, Decision, EndpointTag, Flowchart,
    Operand, Thread,
};
use crate::error::FlowConversionError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anchor name the editor uses for a decision's "yes" edge.
pub const YES_ANCHOR: &str = "Right";
/// Anchor name the editor uses for a decision's "no" edge.
pub const NO_ANCHOR: &str = "Bottom";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EditorFlowchart {
    pub threads: Vec<EditorThread>,
    #[serde(default)]
    pub variables: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EditorThread {
    pub id: EditorId,
    #[serde(default)]
    pub blocks: Vec<EditorBlock>,
    #[serde(default)]
    pub connections: Vec<EditorConnection>,
}

/// Thread ids are numbers in the editor, but older documents use strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum EditorId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorId::Number(n) => write!(f, "{}", n),
            EditorId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EditorBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    #[serde(default)]
    pub properties: EditorProperties,
}

/// The untyped property bag attached to every block by the editor.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EditorProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// For assignments: `"variable"` or `"constant"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EditorConnection {
    pub source: String,
    pub target: String,
    #[serde(rename = "sourceEndpoint", default)]
    pub source_endpoint: String,
    #[serde(rename = "targetEndpoint", default, skip_serializing_if = "Option::is_none")]
    pub target_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EditorFlowchart {
    pub fn from_json(json: &str) -> Result<Self, FlowConversionError> {
        serde_json::from_str(json).map_err(|e| FlowConversionError::JsonParseError(e.to_string()))
    }
}

impl Flowchart {
    /// Parses an editor JSON document straight into a validated flowchart.
    pub fn from_editor_json(json: &str) -> Result<Self, FlowConversionError> {
        EditorFlowchart::from_json(json)?.into_flowchart()
    }
}

impl IntoFlowchart for EditorFlowchart {
    fn into_flowchart(self) -> Result<Flowchart, FlowConversionError> {
        let threads = self
            .threads
            .into_iter()
            .map(EditorThread::into_thread)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = AHashSet::new();
        if let Some(duplicate) = threads.iter().find(|t| !seen.insert(t.id())) {
            return Err(FlowConversionError::ValidationError(format!(
                "thread id '{}' appears more than once",
                duplicate.id()
            )));
        }
        Ok(Flowchart::new(threads, self.variables))
    }
}

impl EditorThread {
    fn into_thread(self) -> Result<Thread, FlowConversionError> {
        let blocks = self
            .blocks
            .into_iter()
            .map(EditorBlock::into_block)
            .collect::<Result<Vec<_>, _>>()?;
        let decisions: AHashSet<&str> = blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Decision(_)))
            .map(|b| b.id.as_str())
            .collect();
        let connections = self
            .connections
            .into_iter()
            .map(|c| {
                let from_decision = decisions.contains(c.source.as_str());
                c.into_connection(from_decision)
            })
            .collect();
        Thread::new(self.id.to_string(), blocks, connections)
    }
}

impl EditorBlock {
    fn into_block(self) -> Result<Block, FlowConversionError> {
        let props = self.properties;
        let kind = match self.block_type.as_str() {
            "start" => BlockKind::Start,
            "end" => BlockKind::End,
            "assignment" => {
                let target = require(props.variable, &self.id, "assignment", "variable")?;
                let value = if props.value_type.as_deref() == Some("variable") {
                    Operand::Variable(require(props.source, &self.id, "assignment", "source")?)
                } else {
                    Operand::Literal(props.value.unwrap_or(0))
                };
                BlockKind::Assignment(Assignment { target, value })
            }
            "input" => BlockKind::Input {
                variable: require(props.variable, &self.id, "input", "variable")?,
            },
            "output" => BlockKind::Output {
                variable: require(props.variable, &self.id, "output", "variable")?,
            },
            "decision" => {
                let comparator = match props.comparison.as_deref() {
                    Some("equal") => Comparator::Equal,
                    _ => Comparator::Less,
                };
                BlockKind::Decision(Decision {
                    variable: require(props.variable, &self.id, "decision", "variable")?,
                    comparator,
                    value: props.value.unwrap_or(0),
                })
            }
            other => {
                return Err(FlowConversionError::UnknownBlockType {
                    block_id: self.id,
                    type_name: other.to_string(),
                });
            }
        };
        Ok(Block::new(self.id, kind))
    }
}

impl EditorConnection {
    /// The editor draws plain edges from the bottom anchor too, so anchors
    /// only carry meaning on edges leaving a decision.
    fn into_connection(self, from_decision: bool) -> Connection {
        let tag = match self.source_endpoint.as_str() {
            YES_ANCHOR if from_decision => EndpointTag::Yes,
            NO_ANCHOR if from_decision => EndpointTag::No,
            _ => EndpointTag::Sequential,
        };
        Connection {
            source: self.source,
            tag,
            target: self.target,
            label: self.label.filter(|l| !l.is_empty()),
        }
    }
}

fn require(
    value: Option<String>,
    block_id: &str,
    block_type: &str,
    property: &'static str,
) -> Result<String, FlowConversionError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FlowConversionError::MissingProperty {
            block_id: block_id.to_string(),
            block_type: block_type.to_string(),
            property,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_thread_ids_are_accepted() {
        let json = r#"{"threads":[{"id":1,"blocks":[],"connections":[]},{"id":"worker","blocks":[],"connections":[]}],"variables":[]}"#;
        let flow = Flowchart::from_editor_json(json).unwrap();
        assert_eq!(flow.threads[0].id(), "1");
        assert_eq!(flow.threads[1].id(), "worker");
    }

    #[test]
    fn anchors_map_to_endpoint_tags() {
        let connection = |anchor: &str| EditorConnection {
            source: "a".to_string(),
            target: "b".to_string(),
            source_endpoint: anchor.to_string(),
            target_endpoint: None,
            label: Some(String::new()),
        };
        assert_eq!(connection("Right").into_connection(true).tag, EndpointTag::Yes);
        assert_eq!(connection("Bottom").into_connection(true).tag, EndpointTag::No);
        assert_eq!(
            connection("Bottom").into_connection(false).tag,
            EndpointTag::Sequential
        );
        let plain = connection("Left").into_connection(true);
        assert_eq!(plain.tag, EndpointTag::Sequential);
        assert_eq!(plain.label, None);
    }
}
