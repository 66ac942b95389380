//! The language-neutral program shape produced by the emitter.

use crate::flow::{Comparator, Operand};

/// One statement of a thread procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        target: String,
        value: Operand,
    },
    Input {
        variable: String,
    },
    Output {
        variable: String,
    },
    /// Statements executed while holding the shared lock.
    Locked(Vec<Statement>),
    Branch {
        condition: Condition,
        then_arm: Arm,
        else_arm: Arm,
    },
    /// A loop entered at block `header`, left by falling off the end of `body`.
    Loop {
        header: String,
        body: Vec<Statement>,
    },
    /// Jump back to the header of the innermost enclosing loop.
    Continue {
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub variable: String,
    pub comparator: Comparator,
    pub value: i64,
}

/// One side of a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Arm {
    Connected(Vec<Statement>),
    /// The decision has no edge for this side.
    Missing,
}

/// The rendered body of a single thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadBody {
    Statements(Vec<Statement>),
    /// The thread has no `start` block.
    MissingStart,
}

/// A thread ready for a backend: its id, an identifier-safe form of the id,
/// and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadProgram {
    pub thread_id: String,
    pub ident: String,
    pub body: ThreadBody,
}

/// Everything a backend needs to print a complete program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub variables: Vec<String>,
    pub threads: Vec<ThreadProgram>,
}

/// Replaces every character that cannot appear in an identifier with `_`.
pub fn sanitize_ident(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
