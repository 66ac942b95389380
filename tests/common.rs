//! Common test utilities for building flowcharts and test fixtures.
use douki::flow::{
    Assignment, Block, BlockKind, Comparator, Connection, Decision, EndpointTag, Flowchart,
    Operand, Thread,
};

#[allow(dead_code)]
pub fn vars(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[allow(dead_code)]
pub fn start(id: &str) -> Block {
    Block::new(id, BlockKind::Start)
}

#[allow(dead_code)]
pub fn end(id: &str) -> Block {
    Block::new(id, BlockKind::End)
}

#[allow(dead_code)]
pub fn assign(id: &str, target: &str, value: i64) -> Block {
    Block::new(
        id,
        BlockKind::Assignment(Assignment {
            target: target.to_string(),
            value: Operand::Literal(value),
        }),
    )
}

#[allow(dead_code)]
pub fn copy(id: &str, target: &str, source: &str) -> Block {
    Block::new(
        id,
        BlockKind::Assignment(Assignment {
            target: target.to_string(),
            value: Operand::Variable(source.to_string()),
        }),
    )
}

#[allow(dead_code)]
pub fn input(id: &str, variable: &str) -> Block {
    Block::new(
        id,
        BlockKind::Input {
            variable: variable.to_string(),
        },
    )
}

#[allow(dead_code)]
pub fn output(id: &str, variable: &str) -> Block {
    Block::new(
        id,
        BlockKind::Output {
            variable: variable.to_string(),
        },
    )
}

#[allow(dead_code)]
pub fn decision(id: &str, variable: &str, comparator: Comparator, value: i64) -> Block {
    Block::new(
        id,
        BlockKind::Decision(Decision {
            variable: variable.to_string(),
            comparator,
            value,
        }),
    )
}

/// A thread whose blocks are connected sequentially in the given order.
#[allow(dead_code)]
pub fn chain(id: &str, blocks: Vec<Block>) -> Thread {
    let connections = blocks
        .windows(2)
        .map(|pair| Connection::sequential(pair[0].id.as_str(), pair[1].id.as_str()))
        .collect();
    Thread::new(id, blocks, connections).expect("chain has unique block ids")
}

#[allow(dead_code)]
pub fn yes(source: &str, target: &str) -> Connection {
    Connection::new(source, EndpointTag::Yes, target)
}

#[allow(dead_code)]
pub fn no(source: &str, target: &str) -> Connection {
    Connection::new(source, EndpointTag::No, target)
}

#[allow(dead_code)]
pub fn seq(source: &str, target: &str) -> Connection {
    Connection::sequential(source, target)
}

/// `start -> x = 5 -> output x -> end` in a single thread `"1"`.
#[allow(dead_code)]
pub fn create_assign_then_print() -> Flowchart {
    Flowchart::new(
        vec![chain(
            "1",
            vec![start("s"), assign("a", "x", 5), output("o", "x"), end("e")],
        )],
        vars(&["x"]),
    )
}

/// Thread 1 writes `x`, thread 2 prints it.
#[allow(dead_code)]
pub fn create_writer_reader() -> Flowchart {
    Flowchart::new(
        vec![
            chain("1", vec![start("s1"), assign("a1", "x", 1), end("e1")]),
            chain("2", vec![start("s2"), output("o2", "x"), end("e2")]),
        ],
        vars(&["x"]),
    )
}

/// One thread: read `x`, print 1 if `x < 3` else print `x`, then print `y`.
#[allow(dead_code)]
pub fn create_branching() -> Flowchart {
    let thread = Thread::new(
        "main",
        vec![
            start("s"),
            input("in", "x"),
            decision("d", "x", Comparator::Less, 3),
            assign("lo", "y", 1),
            copy("hi", "y", "x"),
            output("after", "y"),
            end("e"),
        ],
        vec![
            seq("s", "in"),
            seq("in", "d"),
            yes("d", "lo"),
            no("d", "hi"),
            seq("d", "after"),
            seq("after", "e"),
        ],
    )
    .expect("unique block ids");
    Flowchart::new(vec![thread], vars(&["x", "y"]))
}

/// Editor JSON for `create_assign_then_print`.
#[allow(dead_code)]
pub const ASSIGN_THEN_PRINT_JSON: &str = r#"{
  "threads": [
    {
      "id": 1,
      "blocks": [
        {"id": "s", "type": "start", "text": "Start", "left": 10, "top": 10, "properties": {}},
        {"id": "a", "type": "assignment", "text": "x = 5", "left": 10, "top": 80,
         "properties": {"variable": "x", "type": "constant", "value": 5}},
        {"id": "o", "type": "output", "text": "PRINT x", "left": 10, "top": 150,
         "properties": {"variable": "x"}},
        {"id": "e", "type": "end", "text": "End", "left": 10, "top": 220, "properties": {}}
      ],
      "connections": [
        {"source": "s", "target": "a", "sourceEndpoint": "Bottom", "targetEndpoint": "Top"},
        {"source": "a", "target": "o", "sourceEndpoint": "Bottom", "targetEndpoint": "Top"},
        {"source": "o", "target": "e", "sourceEndpoint": "Bottom", "targetEndpoint": "Top"}
      ]
    }
  ],
  "variables": ["x"]
}"#;

#[allow(dead_code)]
pub const ASSIGN_THEN_PRINT_PY: &str = "#!/usr/bin/env python3
# Generated from a flowchart
import threading

# Shared variables
lock = threading.Lock()
x = 0

def thread_1():
    global x

    with lock:
        x = 5
    with lock:
        print(x)

# Create threads
t1 = threading.Thread(target=thread_1)

# Start threads
t1.start()

# Wait for threads to finish
t1.join()
";
