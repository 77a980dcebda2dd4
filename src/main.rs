use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt};

mod dsl;
mod error;
mod scorer;
mod search;
mod task;

use dsl::{Grammar, GrammarConfig, Value};
use error::TaskError;
use scorer::ScorerKind;
use search::batch::{BatchConfig, TaskOutcome, run_batch};
use search::{BeamSearch, CancellationToken, SearchAlgorithm, SearchConfig, Watchdog};
use task::{Task, parse_value};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "flexcoder")]
#[command(about = "flexcoder - neural-guided synthesis of list-processing programs")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// CLI scorer selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliScorer {
    /// Equal weight for every choice
    Uniform,
    /// Seeded pseudo-random weights
    Random,
}

impl From<CliScorer> for ScorerKind {
    fn from(cli: CliScorer) -> Self {
        match cli {
            CliScorer::Uniform => ScorerKind::Uniform,
            CliScorer::Random => ScorerKind::Random,
        }
    }
}

/// Options shared by every command that runs a search
#[derive(clap::Args, Debug)]
struct SearchOptions {
    /// Frontier capacity of the first iteration
    #[arg(long, default_value = "100")]
    beam_size: usize,
    /// Maximum number of combinator applications
    #[arg(long, default_value = "6")]
    max_length: usize,
    /// Number of widening restarts
    #[arg(long, default_value = "3")]
    iterations: u32,
    /// Beam width multiplier between iterations
    #[arg(long, default_value = "2")]
    widening_factor: usize,
    /// Scorer used to rank candidates
    #[arg(long, value_enum, default_value = "uniform")]
    scorer: CliScorer,
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
    /// Timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Grammar alphabets as JSON (defaults to the built-in grammar)
    #[arg(long)]
    grammar: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl SearchOptions {
    fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_beam_size(self.beam_size)
            .with_max_length(self.max_length)
            .with_iterations(self.iterations)
            .with_widening_factor(self.widening_factor)
            .with_scorer(self.scorer.into())
            .with_seed_option(self.seed)
            .with_timeout_option(self.timeout.map(Duration::from_secs))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a program mapping the inputs onto the target
    Synth {
        /// Input value as JSON, e.g. '[1, 2, 3]' (repeat for several inputs)
        #[arg(long = "input", required = true, allow_hyphen_values = true)]
        inputs: Vec<String>,
        /// Target output as JSON
        #[arg(long, allow_hyphen_values = true)]
        target: String,
        #[command(flatten)]
        options: SearchOptions,
    },
    /// Run every task of a JSON task file
    Batch {
        /// JSON array of {"input": [...], "target": ...} objects
        tasks: PathBuf,
        /// Number of worker threads
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        #[command(flatten)]
        options: SearchOptions,
    },
    /// List the combinator grammar in enumeration order
    Grammar {
        /// Grammar alphabets as JSON
        #[arg(long)]
        grammar: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "flexcoder=warn",
        1 => "flexcoder=info",
        2 => "flexcoder=debug",
        _ => "flexcoder=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_grammar(path: Option<&Path>) -> Result<Grammar, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(Grammar::default());
    };
    let text = fs::read_to_string(path).map_err(|source| TaskError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GrammarConfig = serde_json::from_str(&text).map_err(|source| TaskError::Json {
        context: path.display().to_string(),
        source,
    })?;
    Ok(Grammar::new(config)?)
}

// --- Commands ---

fn synthesize(
    inputs: &[String],
    target: &str,
    options: &SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = inputs
        .iter()
        .map(|text| parse_value(text))
        .collect::<Result<Vec<Value>, _>>()?;
    let task = Task::new(input, parse_value(target)?);
    let grammar = load_grammar(options.grammar.as_deref())?;
    let config = options.search_config();

    let cancel = CancellationToken::new();
    let _watchdog = Watchdog::maybe_spawn(&cancel, config.timeout);
    let scorer = config.scorer.build(config.seed);
    let mut search = BeamSearch::new(grammar, config, scorer);
    let result = search.search(&task, &cancel)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result.report())?);
        return Ok(());
    }

    let inputs: Vec<String> = task.input.iter().map(Value::to_string).collect();
    println!("Inputs: {}", inputs.join(", "));
    println!("Target: {}", task.target);
    print!("{}", result);
    println!("\nStatistics:");
    print!("{}", search.statistics().format_summary());
    Ok(())
}

fn run_task_file(
    path: &Path,
    workers: Option<usize>,
    options: &SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = Task::load_all(path)?;
    let grammar = load_grammar(options.grammar.as_deref())?;
    let search_config = options.search_config();
    search_config.validate()?;

    let mut batch_config = BatchConfig::default()
        .with_timeout_option(search_config.timeout)
        .with_seed_option(search_config.seed);
    if let Some(workers) = workers {
        batch_config = batch_config.with_workers(workers);
    }

    let result = run_batch(&tasks, &grammar, &search_config, &batch_config);

    if options.json {
        let reports = result
            .outcomes
            .iter()
            .enumerate()
            .map(|(i, outcome)| match outcome {
                TaskOutcome::Completed(r) => {
                    let mut report = serde_json::to_value(r.report())?;
                    report["task"] = serde_json::json!(i);
                    Ok(report)
                }
                TaskOutcome::Failed(message) => Ok(serde_json::json!({
                    "task": i,
                    "outcome": "failed",
                    "error": message,
                })),
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        let document = serde_json::json!({
            "tasks": reports,
            "summary": result.summary,
            "statistics": result.total_statistics,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    for (i, outcome) in result.outcomes.iter().enumerate() {
        match outcome {
            TaskOutcome::Completed(r) => match r.composition() {
                Some(composition) => println!(
                    "task {}: {} (depth {}) {}",
                    i,
                    outcome.label(),
                    r.depth().unwrap_or_default(),
                    composition
                ),
                None => println!("task {}: {}", i, outcome.label()),
            },
            TaskOutcome::Failed(message) => println!("task {}: failed: {}", i, message),
        }
    }
    println!();
    print!("{}", result.summary.format_summary());
    println!("\nSearch totals:");
    print!("{}", result.total_statistics.format_summary());
    println!("Wall time: {:.2?}", result.elapsed_time);
    Ok(())
}

fn list_grammar(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let grammar = load_grammar(path)?;
    for (i, combinator) in grammar.combinators().iter().enumerate() {
        println!("{:3}  {}", i, combinator);
    }
    println!("\n{} combinators", grammar.combinators().len());
    Ok(())
}

// --- Main Function ---
fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let outcome = match &args.command {
        Commands::Synth {
            inputs,
            target,
            options,
        } => synthesize(inputs, target, options),
        Commands::Batch {
            tasks,
            workers,
            options,
        } => run_task_file(tasks, *workers, options),
        Commands::Grammar { grammar } => list_grammar(grammar.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
