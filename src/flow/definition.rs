use crate::error::FlowConversionError;
use ahash::AHashSet;

/// The complete input to generation and analysis: every thread of a
/// flowchart plus the integer variables they all share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flowchart {
    pub threads: Vec<Thread>,
    pub variables: Vec<String>,
}

impl Flowchart {
    pub fn new(threads: Vec<Thread>, variables: Vec<String>) -> Self {
        Self { threads, variables }
    }

    /// Total number of blocks across all threads.
    pub fn block_count(&self) -> usize {
        self.threads.iter().map(|t| t.blocks().len()).sum()
    }
}

/// A single thread of execution, described as a directed (possibly cyclic) graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    id: String,
    blocks: Vec<Block>,
    connections: Vec<Connection>,
}

impl Thread {
    /// Builds a thread, rejecting duplicate block ids.
    ///
    /// Connections are not checked against the block set: a connection to an
    /// unknown block is tolerated and simply never followed.
    pub fn new(
        id: impl Into<String>,
        blocks: Vec<Block>,
        connections: Vec<Connection>,
    ) -> Result<Self, FlowConversionError> {
        let id = id.into();
        let mut seen = AHashSet::new();
        for block in &blocks {
            if !seen.insert(block.id.as_str()) {
                return Err(FlowConversionError::DuplicateBlockId {
                    thread_id: id,
                    block_id: block.id.clone(),
                });
            }
        }
        Ok(Self {
            id,
            blocks,
            connections,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

/// One typed node of a thread's control-flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Every shared-variable access this block performs, in evaluation order.
    pub fn accesses(&self) -> Vec<Access<'_>> {
        match &self.kind {
            BlockKind::Start | BlockKind::End => Vec::new(),
            BlockKind::Assignment(assignment) => {
                let mut accesses = vec![Access::Write(assignment.target.as_str())];
                if let Operand::Variable(source) = &assignment.value {
                    accesses.push(Access::Read(source.as_str()));
                }
                accesses
            }
            BlockKind::Input { variable } => vec![Access::Write(variable.as_str())],
            BlockKind::Output { variable } => vec![Access::Read(variable.as_str())],
            BlockKind::Decision(decision) => vec![Access::Read(decision.variable.as_str())],
        }
    }
}

/// The block kinds, each carrying its own payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Start,
    End,
    Assignment(Assignment),
    Input { variable: String },
    Output { variable: String },
    Decision(Decision),
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Start => "start",
            BlockKind::End => "end",
            BlockKind::Assignment(_) => "assignment",
            BlockKind::Input { .. } => "input",
            BlockKind::Output { .. } => "output",
            BlockKind::Decision(_) => "decision",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: String,
    pub value: Operand,
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(i64),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub variable: String,
    pub comparator: Comparator,
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,
    Less,
}

impl Comparator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::Less => "<",
        }
    }
}

/// A single read or write of a shared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    Read(&'a str),
    Write(&'a str),
}

impl<'a> Access<'a> {
    pub fn variable(&self) -> &'a str {
        match self {
            Access::Read(name) | Access::Write(name) => name,
        }
    }
}

/// Distinguishes a decision's "yes" and "no" edges from the plain sequential edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointTag {
    Yes,
    No,
    Sequential,
}

/// A directed edge between two blocks of the same thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub source: String,
    pub tag: EndpointTag,
    pub target: String,
    pub label: Option<String>,
}

impl Connection {
    pub fn new(source: impl Into<String>, tag: EndpointTag, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            tag,
            target: target.into(),
            label: None,
        }
    }

    pub fn sequential(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, EndpointTag::Sequential, target)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
