use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use sokoban_search::{
    CodecLimits, Grid, MapFormat, SearchConfig, SearchOutcome, SearchReport, Solver, Strategy,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// X wall, . passage, J box, G goal, F filled goal, M agent
    Legacy,
    /// # wall, space passage, $ box, . goal, * box on goal, @ agent, + agent on goal
    Xsb,
}

impl From<FormatArg> for MapFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Legacy => MapFormat::Legacy,
            FormatArg::Xsb => MapFormat::Xsb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Bfs,
    Dfs,
    BestFirst,
    /// Run all three side by side
    All,
}

impl StrategyArg {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyArg::Bfs => vec![Strategy::BreadthFirst],
            StrategyArg::Dfs => vec![Strategy::DepthFirst],
            StrategyArg::BestFirst => vec![Strategy::BestFirst],
            StrategyArg::All => Strategy::ALL.to_vec(),
        }
    }
}

#[derive(Parser)]
#[command(name = "sokoban-search")]
#[command(about = "Exhaustive and heuristic Sokoban search", long_about = None)]
struct Args {
    /// Path to the map file
    #[arg(value_name = "MAP")]
    map: PathBuf,

    /// Map symbol set
    #[arg(short, long, value_enum, default_value = "legacy")]
    format: FormatArg,

    /// Search strategy
    #[arg(short, long, value_enum, default_value = "bfs")]
    strategy: StrategyArg,

    /// Give up after expanding this many nodes
    #[arg(short = 'n', long)]
    max_expansions: Option<usize>,

    /// Weight of the depth term in the best-first cost
    #[arg(long, default_value_t = 2.0)]
    depth_weight: f64,

    /// Upper bound on entries in the box placement table
    #[arg(long, default_value_t = CodecLimits::default().max_entries)]
    max_entries: u64,
}

fn print_report(report: &SearchReport) {
    match &report.outcome {
        SearchOutcome::Solved(solution) => {
            println!("{}: {}", report.strategy, solution.moves);
        }
        SearchOutcome::Exhausted => println!("{}: no solution", report.strategy),
        SearchOutcome::Aborted(reason) => {
            println!("{}: aborted ({:?})", report.strategy, reason)
        }
    }
    println!(
        "  {}  elapsed: {} ms",
        report.stats,
        report.elapsed.as_millis()
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.map)
        .with_context(|| format!("failed to read map {}", args.map.display()))?;
    let grid = Grid::parse(&text, args.format.into())
        .with_context(|| format!("failed to load map {}", args.map.display()))?;
    info!(
        "loaded {}x{} map with {} boxes",
        grid.rows(),
        grid.cols(),
        grid.num_boxes()
    );

    let limits = CodecLimits {
        max_entries: args.max_entries,
    };
    let solver = Solver::with_limits(&grid, limits).context("failed to build state codecs")?;

    let config = SearchConfig {
        max_expansions: args.max_expansions,
        depth_weight: args.depth_weight,
    };
    let reports = solver
        .compare(&args.strategy.strategies(), &config, None)
        .context("search failed")?;

    for report in &reports {
        print_report(report);
    }
    Ok(())
}
