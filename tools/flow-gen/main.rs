use clap::Parser;
use douki::flow::editor::{
    EditorBlock, EditorConnection, EditorFlowchart, EditorId, EditorProperties, EditorThread,
    NO_ANCHOR, YES_ANCHOR,
};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;

/// A CLI tool to generate random editor flowcharts for douki
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flowchart.json")]
    output: String,

    /// Number of threads
    #[arg(short, long, default_value_t = 2)]
    threads: usize,

    /// Number of shared variables
    #[arg(short, long, default_value_t = 2)]
    variables: usize,

    /// The minimum number of operation blocks per thread
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of operation blocks per thread
    #[arg(long, default_value_t = 6)]
    max: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }
    if cli.variables == 0 {
        eprintln!("Error: at least one variable is required");
        std::process::exit(1);
    }

    println!(
        "Generating flowchart with {} thread(s), {} variable(s), {} to {} operations per thread...",
        cli.threads, cli.variables, cli.min, cli.max
    );

    let variables: Vec<String> = (0..cli.variables).map(variable_name).collect();
    let threads = (0..cli.threads)
        .map(|i| {
            let count = rng.random_range(cli.min..=cli.max);
            let thread = generate_thread(&mut rng, i as i64 + 1, &variables, count);
            println!("-> Thread {}: {} block(s).", i + 1, thread.blocks.len());
            thread
        })
        .collect();

    let flowchart = EditorFlowchart { threads, variables };
    let json_output = serde_json::to_string_pretty(&flowchart)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated and saved flowchart to '{}'",
        cli.output
    );

    Ok(())
}

/// `a`, `b`, ... `z`, then `v26`, `v27`, ...
fn variable_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
        _ => format!("v{}", index),
    }
}

/// A chain `start -> op* -> end`. A decision's yes-edge passes through an
/// extra output block before rejoining the chain; its no-edge skips it.
fn generate_thread(
    rng: &mut ThreadRng,
    thread_id: i64,
    variables: &[String],
    operations: usize,
) -> EditorThread {
    let mut blocks = Vec::new();
    let mut connections = Vec::new();
    let mut next_id = 0usize;
    let mut fresh_id = || {
        next_id += 1;
        format!("t{}_b{}", thread_id, next_id)
    };

    let start = fresh_id();
    blocks.push(block(&start, "start", EditorProperties::default()));
    // Edges waiting for the next block in the chain: (source, endpoint).
    let mut pending = vec![(start, String::from("Bottom"))];

    for _ in 0..operations {
        let id = fresh_id();
        let variable = pick(rng, variables).clone();
        let kind = rng.random_range(0..5);

        let properties = match kind {
            0 => EditorProperties {
                variable: Some(variable),
                value_type: Some("constant".to_string()),
                value: Some(rng.random_range(0..10)),
                ..Default::default()
            },
            1 => EditorProperties {
                variable: Some(variable),
                value_type: Some("variable".to_string()),
                source: Some(pick(rng, variables).clone()),
                ..Default::default()
            },
            2 => EditorProperties {
                variable: Some(variable),
                ..Default::default()
            },
            3 => EditorProperties {
                variable: Some(variable),
                ..Default::default()
            },
            _ => EditorProperties {
                variable: Some(variable),
                comparison: Some(
                    (if rng.random_bool(0.5) { "equal" } else { "less" }).to_string(),
                ),
                value: Some(rng.random_range(0..10)),
                ..Default::default()
            },
        };
        let block_type = ["assignment", "assignment", "input", "output", "decision"][kind];
        blocks.push(block(&id, block_type, properties));
        for (source, endpoint) in pending.drain(..) {
            connections.push(connect(&source, &id, &endpoint));
        }

        if block_type == "decision" {
            let yes_id = fresh_id();
            blocks.push(block(
                &yes_id,
                "output",
                EditorProperties {
                    variable: Some(pick(rng, variables).clone()),
                    ..Default::default()
                },
            ));
            connections.push(connect(&id, &yes_id, YES_ANCHOR));
            pending.push((yes_id, String::from("Bottom")));
            pending.push((id, NO_ANCHOR.to_string()));
        } else {
            pending.push((id, String::from("Bottom")));
        }
    }

    let end = fresh_id();
    blocks.push(block(&end, "end", EditorProperties::default()));
    for (source, endpoint) in pending.drain(..) {
        connections.push(connect(&source, &end, &endpoint));
    }

    EditorThread {
        id: EditorId::Number(thread_id),
        blocks,
        connections,
    }
}

fn pick<'a>(rng: &mut ThreadRng, items: &'a [String]) -> &'a String {
    &items[rng.random_range(0..items.len())]
}

fn block(id: &str, block_type: &str, properties: EditorProperties) -> EditorBlock {
    EditorBlock {
        id: id.to_string(),
        block_type: block_type.to_string(),
        text: None,
        left: None,
        top: None,
        properties,
    }
}

fn connect(source: &str, target: &str, endpoint: &str) -> EditorConnection {
    EditorConnection {
        source: source.to_string(),
        target: target.to_string(),
        source_endpoint: endpoint.to_string(),
        target_endpoint: Some("Top".to_string()),
        label: None,
    }
}
