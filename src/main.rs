use analytics::{
    CorrelationMatrix, RankingEngine, ReturnsEngine, RiskAdjustedRanker, RollingCorrelationEngine,
    SharpeConvention,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{DataSettings, LoggingSettings, OutputFormat, Settings};
use core_types::{MetadataMap, PriceTable, RankedList, ReturnTable};
use network::{NetworkBuilder, RelationshipGraph};
use serde_json::json;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the stockgraph command-line tool.
fn main() -> Result<()> {
    // A missing .env file is fine; settings then come from the TOML file and defaults.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;
    cli.apply_overrides(&mut settings);

    let _guard = init_tracing(&settings.logging)?;

    match &cli.command {
        Commands::Leaders(args) => handle_leaders(args, &settings),
        Commands::Sharpe(args) => handle_sharpe(args, &settings),
        Commands::Periods(args) => handle_periods(args, &settings),
        Commands::Similar(args) => handle_similar(args, &settings),
        Commands::Network(args) => handle_network(args, &settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Momentum rankings and correlation networks for an equity universe.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./stockgraph.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Price history CSV: a `date` column followed by one column per ticker.
    #[arg(long, global = true)]
    prices: Option<PathBuf>,

    /// Company metadata CSV: `ticker,market_cap,sector,industry,name`.
    #[arg(long, global = true)]
    metadata: Option<PathBuf>,

    /// Print tables or JSON.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(prices) = &self.prices {
            settings.data.prices_path = prices.clone();
        }
        if let Some(metadata) = &self.metadata {
            settings.data.metadata_path = Some(metadata.clone());
        }
        if let Some(format) = self.format {
            settings.output = format;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Best and worst cumulative returns over a trailing window.
    Leaders(LeadersArgs),
    /// Highest annualized Sharpe ratios over a trailing window.
    Sharpe(SharpeArgs),
    /// Cumulative return of one ticker over several windows.
    Periods(PeriodsArgs),
    /// Most and least correlated tickers for one ticker.
    Similar(SimilarArgs),
    /// Build the thresholded correlation network.
    Network(NetworkArgs),
}

#[derive(Args)]
struct LeadersArgs {
    /// Trailing number of return periods.
    #[arg(long)]
    window: Option<usize>,
    /// Number of tickers at each end.
    #[arg(long)]
    k: Option<usize>,
}

#[derive(Args)]
struct SharpeArgs {
    #[arg(long)]
    window: Option<usize>,
    #[arg(long)]
    k: Option<usize>,
    /// Annual risk-free rate as a decimal (0.04 for 4%).
    #[arg(long)]
    risk_free_rate: Option<f64>,
}

#[derive(Args)]
struct PeriodsArgs {
    #[arg(long)]
    ticker: String,
    /// Comma-separated windows, e.g. "7,30,90".
    #[arg(long, value_delimiter = ',')]
    windows: Vec<usize>,
}

#[derive(Args)]
struct SimilarArgs {
    #[arg(long)]
    ticker: String,
    /// Correlation window.
    #[arg(long)]
    window: Option<usize>,
    #[arg(long)]
    k: Option<usize>,
}

#[derive(Args)]
struct NetworkArgs {
    /// Correlation window.
    #[arg(long)]
    window: Option<usize>,
    /// Minimum absolute correlation for an edge, in [0, 1].
    #[arg(long)]
    threshold: Option<f64>,
    /// Degree at which a ticker is listed as highly connected.
    #[arg(long)]
    min_connections: Option<usize>,
    /// Comma-separated tickers whose graph neighbours should be listed.
    #[arg(long, value_delimiter = ',')]
    focus: Vec<String>,
    /// Write the graph as JSON for a visualizer.
    #[arg(long)]
    output: Option<PathBuf>,
}

// ==============================================================================
// Setup
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over `logging.level`.
///
/// The returned guard flushes the log file and must live until exit.
fn init_tracing(logging: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "stockgraph.log");
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = builder
                .with_ansi(false)
                .with_writer(std::io::stderr.and(file_writer))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(Some(guard))
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(None)
        }
    }
}

fn load_prices(data: &DataSettings) -> Result<PriceTable> {
    let prices = snapshot::load_prices(&data.prices_path)
        .with_context(|| format!("Failed to load prices from {}", data.prices_path.display()))?;
    tracing::info!(
        "Price history covers {} tickers from {}.",
        prices.num_tickers(),
        span(prices.dates())
    );
    Ok(prices)
}

fn load_metadata(data: &DataSettings) -> Result<MetadataMap> {
    match &data.metadata_path {
        Some(path) => snapshot::load_metadata(path)
            .with_context(|| format!("Failed to load metadata from {}", path.display())),
        None => {
            tracing::warn!("No metadata file configured; graph nodes will carry no attributes.");
            Ok(MetadataMap::new())
        }
    }
}

fn load_returns(data: &DataSettings) -> Result<ReturnTable> {
    let prices = load_prices(data)?;
    ReturnsEngine::new()
        .compute_returns(&prices)
        .context("Failed to compute returns")
}

fn correlations(returns: &ReturnTable, window: usize) -> Result<CorrelationMatrix> {
    RollingCorrelationEngine::new()
        .correlation_matrix(returns, window)
        .with_context(|| format!("Failed to compute correlations over {window} periods"))
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_leaders(args: &LeadersArgs, settings: &Settings) -> Result<()> {
    let window = args.window.unwrap_or(settings.ranking.window);
    let k = args.k.unwrap_or(settings.ranking.k);

    let returns = load_returns(&settings.data)?;
    let engine = RankingEngine::new(&returns);
    let top = engine.top_k(window, k)?;
    let bottom = engine.bottom_k(window, k)?;

    match settings.output {
        OutputFormat::Json => print_json(&json!({ "window": window, "top": top, "bottom": bottom })),
        OutputFormat::Table => {
            println!("Top {} over the last {} periods", top.len(), window);
            println!("{}", ranked_table(&top, "Return", percent));
            println!("Bottom {} over the last {} periods", bottom.len(), window);
            println!("{}", ranked_table(&bottom, "Return", percent));
            Ok(())
        }
    }
}

fn handle_sharpe(args: &SharpeArgs, settings: &Settings) -> Result<()> {
    let window = args.window.unwrap_or(settings.ranking.window);
    let k = args.k.unwrap_or(settings.ranking.k);
    let risk_free_rate = args
        .risk_free_rate
        .unwrap_or(settings.risk_adjusted.risk_free_rate);
    let convention =
        SharpeConvention::new(risk_free_rate, settings.risk_adjusted.annualization_factor)?;

    let returns = load_returns(&settings.data)?;
    let top = RiskAdjustedRanker::new(&returns, convention).top_sharpe(window, k)?;

    match settings.output {
        OutputFormat::Json => print_json(&json!({
            "window": window,
            "risk_free_rate": risk_free_rate,
            "annualization_factor": convention.annualization_factor,
            "top": top,
        })),
        OutputFormat::Table => {
            println!(
                "Top {} by Sharpe ratio over the last {} periods (risk-free rate {:.2}%)",
                top.len(),
                window,
                risk_free_rate * 100.0
            );
            println!("{}", ranked_table(&top, "Sharpe", |v| format!("{v:.3}")));
            Ok(())
        }
    }
}

fn handle_periods(args: &PeriodsArgs, settings: &Settings) -> Result<()> {
    let windows = if args.windows.is_empty() {
        settings.ranking.periods.clone()
    } else {
        args.windows.clone()
    };

    let prices = load_prices(&settings.data)?;
    let returns = ReturnsEngine::new()
        .compute_returns(&prices)
        .context("Failed to compute returns")?;
    let periods = RankingEngine::new(&returns).analyze_multiple_periods(&args.ticker, &windows)?;
    let latest = prices.latest_price(&args.ticker);

    match settings.output {
        OutputFormat::Json => {
            let by_window: serde_json::Map<String, serde_json::Value> = periods
                .iter()
                .map(|(window, outcome)| {
                    let value = match outcome {
                        Ok(total) => json!(total),
                        Err(e) => json!({ "error": e.to_string() }),
                    };
                    (window.to_string(), value)
                })
                .collect();
            print_json(&json!({ "ticker": args.ticker, "latest_price": latest, "periods": by_window }))
        }
        OutputFormat::Table => {
            match latest {
                Some(price) => println!("{} last close: {:.2}", args.ticker, price),
                None => println!("{} has no price on the last date", args.ticker),
            }
            let mut table = new_table(vec!["Window", "Cumulative return"]);
            for (window, outcome) in &periods {
                let cell = match outcome {
                    Ok(total) => percent(*total),
                    Err(e) => format!("n/a ({e})"),
                };
                table.add_row(vec![window.to_string(), cell]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

fn handle_similar(args: &SimilarArgs, settings: &Settings) -> Result<()> {
    let window = args.window.unwrap_or(settings.network.correlation_window);
    let k = args.k.unwrap_or(settings.network.similar_count);

    let returns = load_returns(&settings.data)?;
    let matrix = correlations(&returns, window)?;
    let most = matrix.most_similar(&args.ticker, k)?;
    let least = matrix.least_similar(&args.ticker, k)?;

    match settings.output {
        OutputFormat::Json => print_json(&json!({
            "ticker": args.ticker,
            "window": window,
            "most_similar": most,
            "least_similar": least,
        })),
        OutputFormat::Table => {
            let correlation = |v: f64| format!("{v:.3}");
            println!("Most correlated with {} over {} periods", args.ticker, window);
            println!("{}", ranked_table(&most, "Correlation", correlation));
            println!("Least correlated with {} over {} periods", args.ticker, window);
            println!("{}", ranked_table(&least, "Correlation", correlation));
            Ok(())
        }
    }
}

fn handle_network(args: &NetworkArgs, settings: &Settings) -> Result<()> {
    let window = args.window.unwrap_or(settings.network.correlation_window);
    let threshold = args.threshold.unwrap_or(settings.network.threshold);
    let min_connections = args.min_connections.unwrap_or(settings.network.min_connections);

    let returns = load_returns(&settings.data)?;
    let metadata = load_metadata(&settings.data)?;
    let matrix = correlations(&returns, window)?;
    let graph = NetworkBuilder::new().build_graph(&matrix, &metadata, threshold)?;

    if let Some(path) = &args.output {
        write_graph(&graph, path)?;
    }

    let stats = graph.network_stats();
    let hubs = graph.highly_connected(min_connections);
    let focus: Vec<&str> = args.focus.iter().map(String::as_str).collect();
    let similar = graph.similar_stocks(&focus, settings.network.similar_count)?;
    let common = if focus.len() > 1 {
        Some(graph.common_similar_stocks(&focus, settings.network.similar_count)?)
    } else {
        None
    };

    match settings.output {
        OutputFormat::Json => print_json(&json!({
            "info": graph.info(),
            "stats": stats,
            "highly_connected": hubs,
            "similar": similar,
            "common": common,
        })),
        OutputFormat::Table => {
            let mut summary = new_table(vec!["Nodes", "Connected", "Edges", "Threshold", "Avg degree"]);
            summary.add_row(vec![
                stats.total_nodes.to_string(),
                stats.connected_nodes.to_string(),
                stats.edges.to_string(),
                format!("{:.2}", stats.threshold),
                format!("{:.2}", stats.average_degree),
            ]);
            println!("{summary}");

            println!("Tickers with at least {min_connections} connections");
            let mut table = new_table(vec!["Ticker", "Connections", "Sector"]);
            for (ticker, degree) in &hubs {
                let sector = graph
                    .node(ticker)
                    .and_then(|n| n.sector.clone())
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![ticker.clone(), degree.to_string(), sector]);
            }
            println!("{table}");

            let sectors = metadata.sector_tickers();
            if !sectors.is_empty() {
                let mut table = new_table(vec!["Sector", "Tickers"]);
                for (sector, tickers) in &sectors {
                    table.add_row(vec![sector.clone(), tickers.len().to_string()]);
                }
                println!("{table}");
            }

            let strength = |v: f64| format!("{v:.3}");
            for (ticker, neighbours) in &similar {
                println!("Strongest links of {ticker}");
                println!("{}", ranked_table(neighbours, "|Correlation|", strength));
            }
            if let Some(common) = &common {
                println!("Shared neighbours of {}", focus.join(", "));
                println!("{}", ranked_table(common, "Mean |correlation|", strength));
            }
            Ok(())
        }
    }
}

// ==============================================================================
// Output Helpers
// ==============================================================================

fn write_graph(graph: &RelationshipGraph, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), graph)
        .with_context(|| format!("Failed to write graph to {}", path.display()))?;
    tracing::info!(path = %path.display(), edges = graph.edges().len(), "Graph written.");
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn ranked_table(list: &RankedList, metric: &str, fmt: impl Fn(f64) -> String) -> Table {
    let mut table = new_table(vec!["#", "Ticker", metric]);
    for (i, entry) in list.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), entry.ticker.clone(), fmt(entry.value)]);
    }
    table
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn span(dates: &[NaiveDate]) -> String {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => format!(
            "{} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        _ => "no dates".to_string(),
    }
}
