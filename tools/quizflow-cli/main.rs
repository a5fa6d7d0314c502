use clap::{Parser, Subcommand};
use quizflow::navigation::stages_without_navigation;
use quizflow::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, arrange and analyze quiz flow graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canvas nodes and edges of a quiz snapshot as JSON
    Graph {
        /// Path to the quiz snapshot JSON file
        snapshot_path: String,
        /// Render the read-only analytics overlay instead of the editable canvas
        #[arg(short, long)]
        analytics: bool,
        /// Stage id to mark as selected
        #[arg(short, long)]
        selected: Option<String>,
    },
    /// Print the conversion funnel of a quiz snapshot
    Funnel {
        /// Path to the quiz snapshot JSON file
        snapshot_path: String,
        /// Length of the recent-activity window in minutes
        #[arg(short, long, default_value_t = 5)]
        window_minutes: i64,
    },
    /// Lay every stage out on the default grid, in stage order
    Arrange {
        /// Path to the quiz snapshot JSON file
        snapshot_path: String,
        /// Where to write the arranged snapshot (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Convert raw stage records and report stages without outgoing navigation
    Stages {
        /// Path to a JSON array of stored stage records
        records_path: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Graph {
            snapshot_path,
            analytics,
            selected,
        } => run_graph(&snapshot_path, analytics, selected.as_deref()).await,
        Command::Funnel {
            snapshot_path,
            window_minutes,
        } => run_funnel(&snapshot_path, window_minutes).await,
        Command::Arrange {
            snapshot_path,
            output,
        } => run_arrange(&snapshot_path, output.as_deref()).await,
        Command::Stages { records_path } => run_stages(&records_path),
    };

    if let Err(e) = result {
        exit_with_error(&e.to_string());
    }
}

async fn aggregate(
    snapshot: &QuizSnapshot,
    backend: Arc<MemoryBackend>,
    window_minutes: i64,
) -> Result<Arc<StageAnalyticsMap>> {
    let aggregator = AnalyticsAggregator::builder(snapshot.quiz_id.clone(), backend)
        .with_activity_window(chrono::Duration::minutes(window_minutes))
        .build();
    match aggregator.refresh().await {
        RefreshOutcome::Failed(e) => Err(e.into()),
        _ => aggregator
            .analytics()
            .ok_or_else(|| "No analytics were computed".into()),
    }
}

async fn run_graph(snapshot_path: &str, analytics: bool, selected: Option<&str>) -> Result<()> {
    let snapshot = QuizSnapshot::from_file(snapshot_path)?;
    let view = if analytics {
        let backend = Arc::new(MemoryBackend::from_snapshot(&snapshot));
        let map = aggregate(&snapshot, backend, 5).await?;
        recompute(&snapshot.stages, ViewMode::Analytics(&map), selected)
    } else {
        recompute(&snapshot.stages, ViewMode::Editable, selected)
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn run_funnel(snapshot_path: &str, window_minutes: i64) -> Result<()> {
    let start = Instant::now();
    let snapshot = QuizSnapshot::from_file(snapshot_path)?;
    let backend = Arc::new(MemoryBackend::from_snapshot(&snapshot));
    let map = aggregate(&snapshot, backend, window_minutes).await?;

    println!("Funnel for quiz '{}':\n", snapshot.quiz_id);
    println!("{}", FunnelFormatter::format_funnel(&snapshot.stages, &map));
    println!("\nComputed in {:?}", start.elapsed());
    Ok(())
}

async fn run_arrange(snapshot_path: &str, output: Option<&str>) -> Result<()> {
    let mut snapshot = QuizSnapshot::from_file(snapshot_path)?;
    let backend = Arc::new(MemoryBackend::from_snapshot(&snapshot));
    let mut editor = FlowEditor::load(snapshot.quiz_id.clone(), backend).await?;

    let order: Vec<String> = editor.stages().iter().map(|s| s.id.clone()).collect();
    editor.auto_arrange(&order).await?;
    snapshot.stages = editor.stages().to_vec();

    let target = output.unwrap_or(snapshot_path);
    snapshot.save(target)?;
    println!("Arranged {} stages into '{}'", snapshot.stages.len(), target);
    Ok(())
}

fn run_stages(records_path: &str) -> Result<()> {
    let json = fs::read_to_string(records_path)
        .map_err(|e| format!("Failed to read stage records '{}': {}", records_path, e))?;
    let stages = StageLoader::new().from_json(&json)?;

    for stage in &stages {
        let navigation = resolve_stage(stage);
        let handles: usize = navigation
            .components
            .iter()
            .map(|c| c.handle_ids().count())
            .sum();
        println!(
            "{:>2}. {} ({}): {} components, {} handles, {} connections",
            stage.order,
            stage.name,
            stage.id,
            stage.components.len(),
            handles,
            stage.connections.len()
        );
    }

    let silent = stages_without_navigation(&stages);
    if !silent.is_empty() {
        println!("\nStages without outgoing navigation: {}", silent.join(", "));
    }
    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
