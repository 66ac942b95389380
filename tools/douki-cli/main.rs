use clap::{Parser, Subcommand, ValueEnum};
use douki::analysis;
use douki::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Generate, analyze and test concurrent programs drawn as flowcharts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional JSON settings file
    #[arg(short, long, global = true)]
    settings: Option<String>,

    /// Directory holding `<name>.json` test cases
    #[arg(long, global = true)]
    tests_dir: Option<PathBuf>,

    /// Interpreter used to run generated Python programs
    #[arg(long, global = true)]
    interpreter: Option<String>,

    /// Kill a test program after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate source code from an editor flowchart
    Generate {
        /// Path to the flowchart JSON file
        flowchart: String,
        #[arg(short, long, value_enum, default_value_t = LanguageCli::Python)]
        language: LanguageCli,
        /// Write the code here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not save a copy in the artifact directory
        #[arg(long)]
        no_artifact: bool,
        /// Allow the incomplete C, C++ and Java generators
        #[arg(long)]
        allow_partial: bool,
    },
    /// Report shared-variable accesses and whether the program may be non-deterministic
    Analyze {
        flowchart: String,
    },
    /// Run a stored test case against a flowchart
    Test {
        flowchart: String,
        /// Name of the test case
        name: String,
        /// Upper bound used for the coverage estimate (1-20)
        #[arg(long, default_value_t = 5)]
        max_operations: u32,
        /// Override the number of samples for non-deterministic programs
        #[arg(long)]
        samples: Option<usize>,
    },
    /// Store a test case
    SaveTest {
        name: String,
        #[arg(long, default_value = "")]
        input: String,
        #[arg(long)]
        expected: String,
    },
    /// List stored test cases
    ListTests,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LanguageCli {
    Python,
    Csharp,
    C,
    Cpp,
    Java,
}

impl LanguageCli {
    fn id(self) -> &'static str {
        match self {
            LanguageCli::Python => Language::Python.id(),
            LanguageCli::Csharp => Language::CSharp.id(),
            LanguageCli::C => Language::C.id(),
            LanguageCli::Cpp => Language::Cpp.id(),
            LanguageCli::Java => Language::Java.id(),
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli);

    match cli.command {
        Command::Generate {
            flowchart,
            language,
            output,
            no_artifact,
            allow_partial,
        } => run_generate(
            settings,
            &flowchart,
            language,
            output,
            no_artifact,
            allow_partial,
        ),
        Command::Analyze { flowchart } => run_analyze(&flowchart),
        Command::Test {
            flowchart,
            name,
            max_operations,
            samples,
        } => {
            let mut settings = settings;
            if let Some(samples) = samples {
                settings.sample_count = samples;
            }
            run_test(&settings, &flowchart, &name, max_operations)
        }
        Command::SaveTest {
            name,
            input,
            expected,
        } => {
            let path = settings
                .test_store()
                .save(&name, &TestCase::new(input, expected))
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to save test: {}", e)));
            println!("Saved test '{}' to '{}'", name, path.display());
        }
        Command::ListTests => {
            let names = settings
                .test_store()
                .list()
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to list tests: {}", e)));
            if names.is_empty() {
                println!("No tests stored in '{}'", settings.tests_dir.display());
            }
            for name in names {
                println!("{}", name);
            }
        }
    }
}

fn load_settings(cli: &Cli) -> Settings {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load settings from '{}': {}", path, e))
        }),
        None => Settings::default(),
    };
    if let Some(dir) = &cli.tests_dir {
        settings.tests_dir = dir.clone();
    }
    if let Some(interpreter) = &cli.interpreter {
        settings.interpreter = interpreter.clone();
    }
    if cli.timeout_ms.is_some() {
        settings.timeout_ms = cli.timeout_ms;
    }
    settings
}

fn load_flowchart(path: &str) -> Flowchart {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read flowchart file '{}': {}", path, e))
    });
    Flowchart::from_editor_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flowchart: {}", e)))
}

fn run_generate(
    mut settings: Settings,
    path: &str,
    language: LanguageCli,
    output: Option<PathBuf>,
    no_artifact: bool,
    allow_partial: bool,
) {
    let flowchart = load_flowchart(path);
    if no_artifact {
        settings.artifact_dir = None;
    }
    settings.allow_partial_backends |= allow_partial;

    let start = Instant::now();
    let code = settings
        .generator()
        .generate(&flowchart, language.id())
        .unwrap_or_else(|e| exit_with_error(&format!("Code generation failed: {}", e)));
    tracing::info!(elapsed = ?start.elapsed(), threads = flowchart.threads.len(), "Generated code");

    match output {
        Some(out) => {
            fs::write(&out, code).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", out.display(), e))
            });
            println!("Wrote generated code to '{}'", out.display());
        }
        None => print!("{}", code),
    }
}

fn run_analyze(path: &str) {
    let flowchart = load_flowchart(path);
    let report = analysis::analyze(&flowchart);

    println!("Threads: {}", report.thread_count);
    println!("\n--- Variable Accesses ---");
    for (variable, count) in &report.accesses {
        let marker = if count.is_racy() { "  (racy)" } else { "" };
        println!(
            "{:<12} reads: {:<3} writes: {:<3}{}",
            variable, count.reads, count.writes, marker
        );
    }
    println!(
        "\nPotentially non-deterministic: {}",
        if report.is_potentially_non_deterministic() {
            "yes"
        } else {
            "no"
        }
    );
}

fn run_test(settings: &Settings, path: &str, name: &str, max_operations: u32) {
    let flowchart = load_flowchart(path);
    let tester = settings.tester();

    let outcome = tester
        .run_test(&flowchart, name)
        .unwrap_or_else(|e| exit_with_error(&format!("{}", e)));
    println!("{}", outcome.result_text);

    if let Some(report) = outcome.sampling {
        println!("\n--- Samples ---");
        for (i, sample) in report.samples.iter().enumerate() {
            let verdict = if sample.success { "PASSED" } else { "FAILED" };
            println!("#{:<3} {} -> {}", i + 1, verdict, sample.output.trim());
        }
        let coverage = report
            .coverage(max_operations)
            .unwrap_or_else(|e| exit_with_error(&format!("{}", e)));
        println!("\n--- Coverage ---");
        println!("Tested combinations: {}", coverage.tested_combinations);
        println!("Total possible:      {}", coverage.total_possible);
        println!("Coverage:            {}%", coverage.percentage);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
