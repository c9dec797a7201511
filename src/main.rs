//! taskrun CLI - run a group of marker tasks and wait for all of them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use taskrun::{Config, EventJournal, MarkerTask, TaskRunner};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "taskrun")]
#[command(version)]
#[command(about = "Launch concurrent tasks and block until every one completes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a group of marker tasks
    Run {
        /// Number of tasks to launch
        #[arg(short, long)]
        tasks: Option<usize>,

        /// Maximum tasks executing at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Delay between start and finish markers, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Label printed before each task index
        #[arg(long)]
        label: Option<String>,

        /// Write the event journal as JSONL to this path
        #[arg(long)]
        events: Option<PathBuf>,

        /// Do not echo markers to stdout
        #[arg(short, long)]
        quiet: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

fn print_example_config() {
    let example = r#"# taskrun configuration file

[runner]
tasks = 3
# concurrency = 2   # omit for unbounded
progress = false

[task]
label = "Worker"
delay_ms = 0
# delays_ms = [2000, 1000]   # per-task delays, cycled by index

[output]
echo = true
# events = "output/events.jsonl"
"#;
    println!("{example}");
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}")),
        None => Ok(Config::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let path = cli
                .config
                .as_ref()
                .context("validate needs --config <PATH>")?;
            let config = load_config(Some(path))?;
            config.validate().context("Configuration is invalid")?;

            info!("Configuration is valid");
            info!("  Tasks: {}", config.runner.tasks);
            match config.runner.concurrency {
                Some(limit) => info!("  Concurrency: {limit}"),
                None => info!("  Concurrency: unbounded"),
            }
            info!("  Label: {}", config.task.label);
        }

        Commands::Run {
            tasks,
            concurrency,
            delay_ms,
            label,
            events,
            quiet,
            progress,
        } => {
            let mut config = load_config(cli.config.as_ref())?;

            // CLI flags override config
            if let Some(tasks) = tasks {
                config.runner.tasks = tasks;
            }
            if concurrency.is_some() {
                config.runner.concurrency = concurrency;
            }
            if let Some(delay_ms) = delay_ms {
                config.task.delay_ms = delay_ms;
                config.task.delays_ms.clear();
            }
            if let Some(label) = label {
                config.task.label = label;
            }
            if events.is_some() {
                config.output.events = events;
            }
            if quiet {
                config.output.echo = false;
            }
            if progress {
                config.runner.progress = true;
            }

            config.validate().context("Configuration is invalid")?;

            let runner = TaskRunner::from_config(&config.runner)?;
            let journal = Arc::new(EventJournal::with_echo(config.output.echo));
            let task = Arc::new(MarkerTask::new(config.task.clone(), journal));

            println!("Launching {} tasks", config.runner.tasks);
            let stats = runner.run_all(config.runner.tasks, Arc::clone(&task)).await;
            println!("All tasks ended");

            if let Some(path) = &config.output.events {
                task.journal()
                    .write_jsonl(path)
                    .with_context(|| format!("Failed to write events to {path:?}"))?;
            }

            println!("\n=== Run Complete ===");
            println!("Run:         {}", stats.run_id);
            println!("Tasks:       {}", stats.total_tasks);
            println!("Completed:   {}", stats.completed);
            println!("Panicked:    {}", stats.panicked);
            println!("Throughput:  {:.0}/s", stats.throughput_per_sec);
            println!("Runtime:     {:.3}s", stats.runtime_secs);
            if let Some(path) = &config.output.events {
                println!("Events:      {path:?}");
            }
        }
    }

    Ok(())
}
