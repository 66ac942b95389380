use super::statement::{Arm, Condition, Statement, ThreadBody};
use crate::error::RenderError;
use crate::flow::{Block, BlockIdx, BlockKind, Decision, EndpointTag, Thread, ThreadGraph};
use ahash::AHashSet;
use tracing::debug;

/// Blocks already consumed on the current path from the `start` block.
type PathSet = AHashSet<BlockIdx>;

/// Statements rendered for a block and its successors, together with the
/// blocks further up the path they jump back to.
#[derive(Default)]
struct Emitted {
    statements: Vec<Statement>,
    back_edges: AHashSet<BlockIdx>,
}

impl Emitted {
    fn back_edge(target: BlockIdx, target_id: &str) -> Self {
        Self {
            statements: vec![Statement::Continue {
                target: target_id.to_string(),
            }],
            back_edges: AHashSet::from_iter([target]),
        }
    }

    fn prepend(mut self, statement: Option<Statement>) -> Self {
        if let Some(statement) = statement {
            self.statements.insert(0, statement);
        }
        self
    }
}

/// Walks one thread's graph from its `start` block and produces the
/// language-neutral statement tree, inserting lock scopes around every
/// shared-variable access.
///
/// Branches of a decision are walked with their own copy of the path set, so
/// a block reachable from both branches is rendered in each of them. The
/// decision's untagged continuation is rendered once, after the conditional.
/// An edge back to a block on the current path turns that block into a loop
/// header and the edge into a `continue`.
pub struct Emitter<'a> {
    graph: ThreadGraph<'a>,
    declared: AHashSet<&'a str>,
}

impl<'a> Emitter<'a> {
    pub fn new(thread: &'a Thread, variables: &'a [String]) -> Self {
        Self {
            graph: ThreadGraph::new(thread),
            declared: variables.iter().map(String::as_str).collect(),
        }
    }

    pub fn emit(&self) -> Result<ThreadBody, RenderError> {
        let Some(start) = self.graph.start() else {
            debug!(thread = self.graph.thread_id(), "Thread has no start block");
            return Ok(ThreadBody::MissingStart);
        };
        let emitted = self.walk(start, PathSet::default(), false)?;
        Ok(ThreadBody::Statements(emitted.statements))
    }

    fn walk(
        &self,
        idx: BlockIdx,
        mut path: PathSet,
        inside_lock: bool,
    ) -> Result<Emitted, RenderError> {
        let block = self.graph.block(idx);
        if path.contains(&idx) {
            debug!(
                thread = self.graph.thread_id(),
                block = %block.id,
                "Back-edge to a block on the current path"
            );
            return Ok(Emitted::back_edge(idx, &block.id));
        }
        path.insert(idx);
        self.check_declared(block)?;

        let emitted = match &block.kind {
            BlockKind::Decision(decision) => {
                self.walk_decision(idx, decision, path, inside_lock)?
            }
            kind => {
                let rest = match self.graph.next(idx) {
                    Some(next) => self.walk(next, path, inside_lock)?,
                    None => Emitted::default(),
                };
                rest.prepend(simple_statement(kind, inside_lock))
            }
        };
        self.close_loop(idx, block, emitted)
    }

    fn walk_decision(
        &self,
        idx: BlockIdx,
        decision: &Decision,
        path: PathSet,
        inside_lock: bool,
    ) -> Result<Emitted, RenderError> {
        let mut back_edges = AHashSet::new();
        // The lock taken for the condition stays held across both arms.
        let then_arm = self.arm(idx, EndpointTag::Yes, &path, &mut back_edges)?;
        let else_arm = self.arm(idx, EndpointTag::No, &path, &mut back_edges)?;

        let branch = Statement::Branch {
            condition: Condition {
                variable: decision.variable.clone(),
                comparator: decision.comparator,
                value: decision.value,
            },
            then_arm,
            else_arm,
        };
        let mut statements = vec![guard(branch, inside_lock)];

        if let Some(next) = self.graph.branch(idx, EndpointTag::Sequential) {
            let rest = self.walk(next, path, inside_lock)?;
            statements.extend(rest.statements);
            back_edges.extend(rest.back_edges);
        }
        Ok(Emitted {
            statements,
            back_edges,
        })
    }

    fn arm(
        &self,
        idx: BlockIdx,
        tag: EndpointTag,
        path: &PathSet,
        back_edges: &mut AHashSet<BlockIdx>,
    ) -> Result<Arm, RenderError> {
        match self.graph.branch(idx, tag) {
            Some(target) => {
                let emitted = self.walk(target, path.clone(), true)?;
                back_edges.extend(emitted.back_edges);
                Ok(Arm::Connected(emitted.statements))
            }
            None => Ok(Arm::Missing),
        }
    }

    /// Wraps the block's rendering in a loop if something below jumps back to it.
    fn close_loop(
        &self,
        idx: BlockIdx,
        block: &Block,
        mut emitted: Emitted,
    ) -> Result<Emitted, RenderError> {
        if !emitted.back_edges.remove(&idx) {
            return Ok(emitted);
        }
        // A `continue` aimed past this loop would restart this loop instead.
        if let Some(&outer) = emitted.back_edges.iter().min() {
            return Err(RenderError::UnstructuredLoop {
                thread_id: self.graph.thread_id().to_string(),
                loop_id: block.id.clone(),
                target_id: self.graph.block(outer).id.clone(),
            });
        }
        Ok(Emitted {
            statements: vec![Statement::Loop {
                header: block.id.clone(),
                body: emitted.statements,
            }],
            back_edges: emitted.back_edges,
        })
    }

    fn check_declared(&self, block: &Block) -> Result<(), RenderError> {
        match block
            .accesses()
            .into_iter()
            .find(|access| !self.declared.contains(access.variable()))
        {
            Some(access) => Err(RenderError::UndeclaredVariable {
                thread_id: self.graph.thread_id().to_string(),
                block_id: block.id.clone(),
                variable: access.variable().to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// The statement for any block kind except `Decision`, if it has one.
fn simple_statement(kind: &BlockKind, inside_lock: bool) -> Option<Statement> {
    match kind {
        BlockKind::Assignment(assignment) => Some(guard(
            Statement::Assign {
                target: assignment.target.clone(),
                value: assignment.value.clone(),
            },
            inside_lock,
        )),
        // Input is treated as thread-local and never locked.
        BlockKind::Input { variable } => Some(Statement::Input {
            variable: variable.clone(),
        }),
        BlockKind::Output { variable } => Some(guard(
            Statement::Output {
                variable: variable.clone(),
            },
            inside_lock,
        )),
        BlockKind::Start | BlockKind::End | BlockKind::Decision(_) => None,
    }
}

fn guard(statement: Statement, inside_lock: bool) -> Statement {
    if inside_lock {
        statement
    } else {
        Statement::Locked(vec![statement])
    }
}
