//! pathomap — Demo CLI
//!
//! Loads a condition dataset (the bundled sample by default), builds the
//! indexes and pathogen graph, and runs one query against them.
//!
//! Usage:
//!   cargo run -p demo -- stats
//!   cargo run -p demo -- pathogens --gram negative --sort condition-count
//!   cargo run -p demo -- antibiotics --class cephalosporins
//!   cargo run -p demo -- similarity "S. aureus" "Streptococcus pyogenes"
//!   cargo run -p demo -- paths "E. coli" "Staphylococcus aureus" --max-depth 3
//!   cargo run -p demo -- recommend "Klebsiella pneumoniae" --systematic
//!   cargo run -p demo -- --data my-conditions.json diagnostics

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pathomap_contracts::{
    entity::{GramStatus, PathogenType},
    error::PathomapResult,
    query::{AntibioticQuery, AntibioticSort, PathogenQuery, PathogenSort},
};
use pathomap_core::{load_conditions_from_file, sample_conditions, ExplorerSession, GraphConfig};
use pathomap_graph::{PathStrategy, Preferences};

// ── CLI definition ────────────────────────────────────────────────────────────

/// pathomap: explore pathogens, antibiotics and how they relate.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Pathogen and antibiotic knowledge graph explorer",
    long_about = "Builds normalized pathogen and antibiotic indexes from a condition dataset,\n\
                  links pathogens by similarity, and answers search, path and\n\
                  recommendation queries."
)]
struct Cli {
    /// Condition dataset (JSON array). Defaults to the bundled sample.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Graph configuration (TOML). Defaults to built-in thresholds and weights.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dataset, index and graph summary counts.
    Stats,
    /// Search pathogens.
    Pathogens {
        /// Substring over name, short name and details.
        #[arg(long)]
        query: Option<String>,
        /// positive, negative, atypical, acid-fast or unknown.
        #[arg(long)]
        gram: Option<GramStatus>,
        /// bacteria, virus, fungus, mycobacteria or "atypical bacteria".
        #[arg(long = "type")]
        pathogen_type: Option<PathogenType>,
        #[arg(long, default_value_t = 0)]
        min_conditions: usize,
        #[arg(long, value_enum, default_value_t = PathogenSortArg::Name)]
        sort: PathogenSortArg,
    },
    /// Search antibiotics.
    Antibiotics {
        #[arg(long)]
        query: Option<String>,
        /// Drug class, e.g. "Cephalosporins".
        #[arg(long = "class")]
        drug_class: Option<String>,
        #[arg(long, default_value_t = 0)]
        min_conditions: usize,
        #[arg(long, value_enum, default_value_t = AntibioticSortArg::Name)]
        sort: AntibioticSortArg,
    },
    /// Similarity breakdown between two pathogens.
    Similarity { a: String, b: String },
    /// Simple paths between two pathogens in the similarity graph.
    Paths {
        start: String,
        end: String,
        #[arg(long, default_value_t = 4)]
        max_depth: usize,
        #[arg(long, value_enum, default_value_t = StrategyArg::HighestScore)]
        strategy: StrategyArg,
        /// Number of paths to print.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// What to study after the given pathogen.
    Recommend {
        current: String,
        /// Recently viewed pathogens (repeatable).
        #[arg(long = "recent")]
        recent: Vec<String>,
        /// Also suggest pathogens with the same gram status.
        #[arg(long)]
        systematic: bool,
        /// Allow recently viewed pathogens back into the results.
        #[arg(long)]
        include_recent: bool,
    },
    /// Fragments dropped while extracting entities.
    Diagnostics,
}

#[derive(Clone, Copy, ValueEnum)]
enum PathogenSortArg {
    Name,
    ConditionCount,
    Relevance,
}

impl From<PathogenSortArg> for PathogenSort {
    fn from(arg: PathogenSortArg) -> Self {
        match arg {
            PathogenSortArg::Name => PathogenSort::Name,
            PathogenSortArg::ConditionCount => PathogenSort::ConditionCount,
            PathogenSortArg::Relevance => PathogenSort::Relevance,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AntibioticSortArg {
    Name,
    ConditionCount,
    DrugClass,
    SpectrumBreadth,
}

impl From<AntibioticSortArg> for AntibioticSort {
    fn from(arg: AntibioticSortArg) -> Self {
        match arg {
            AntibioticSortArg::Name => AntibioticSort::Name,
            AntibioticSortArg::ConditionCount => AntibioticSort::ConditionCount,
            AntibioticSortArg::DrugClass => AntibioticSort::DrugClass,
            AntibioticSortArg::SpectrumBreadth => AntibioticSort::SpectrumBreadth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    HighestScore,
    Shortest,
    MostDiverse,
}

impl From<StrategyArg> for PathStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::HighestScore => PathStrategy::HighestScore,
            StrategyArg::Shortest => PathStrategy::Shortest,
            StrategyArg::MostDiverse => PathStrategy::MostDiverse,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> PathomapResult<()> {
    let config = match &cli.config {
        Some(path) => GraphConfig::from_file(path)?,
        None => GraphConfig::default(),
    };
    let conditions = match &cli.data {
        Some(path) => load_conditions_from_file(path)?,
        None => sample_conditions()?,
    };
    info!(conditions = conditions.len(), "building session");
    let session = ExplorerSession::new(&conditions, config);

    match cli.command {
        Command::Stats => print_stats(&session, cli.json),
        Command::Pathogens { query, gram, pathogen_type, min_conditions, sort } => {
            let query = PathogenQuery {
                query,
                gram_status: gram,
                pathogen_type,
                min_conditions,
                sort_by: sort.into(),
            };
            print_pathogens(&session, &query, cli.json);
        }
        Command::Antibiotics { query, drug_class, min_conditions, sort } => {
            let query = AntibioticQuery {
                query,
                drug_class,
                min_conditions,
                sort_by: sort.into(),
            };
            print_antibiotics(&session, &query, cli.json);
        }
        Command::Similarity { a, b } => print_similarity(&session, &a, &b, cli.json)?,
        Command::Paths { start, end, max_depth, strategy, limit } => {
            print_paths(&session, &start, &end, max_depth, strategy.into(), limit, cli.json)?
        }
        Command::Recommend { current, recent, systematic, include_recent } => {
            let preferences = Preferences {
                systematic_learning: systematic,
                include_recently_viewed: include_recent,
            };
            print_recommendations(&session, &current, &recent, &preferences, cli.json);
        }
        Command::Diagnostics => print_diagnostics(&session, cli.json),
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to encode output: {}", e),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn print_stats(session: &ExplorerSession, as_json: bool) {
    let stats = session.statistics();
    let graph = session.graph().stats();
    let snapshot = session.snapshot();

    if as_json {
        print_json(&json!({
            "fingerprint": snapshot.fingerprint(),
            "index": stats,
            "graph": graph,
        }));
        return;
    }

    println!();
    println!("Snapshot {}", &snapshot.fingerprint()[..12]);
    println!("==================");
    println!("  Conditions:          {}", stats.condition_count);
    println!("  Pathogens:           {}", stats.pathogen_count);
    println!("  Antibiotics:         {}", stats.antibiotic_count);
    println!("  Drug classes:        {}", stats.drug_class_count);
    println!("  Skipped fragments:   {}", stats.skipped_fragments);
    if let Some((name, count)) = &stats.most_referenced_pathogen {
        println!("  Most referenced:     {} ({} conditions)", name, count);
    }
    if let Some((id, total)) = &stats.most_complex_condition {
        println!(
            "  Most complex:        {} (complexity {})",
            session.indexes().condition_name(id),
            total
        );
    }
    println!();
    println!("  Gram distribution:");
    for (gram, count) in &stats.gram_distribution {
        println!("    {:<12} {}", gram.label(), count);
    }
    println!();
    println!("  Graph: {} nodes, {} edges", graph.node_count, graph.edge_count);
    for (tier, count) in &graph.tier_counts {
        println!("    {:<12} {}", tier.label(), count);
    }
    println!("    density      {:.3}", graph.density);
    println!("    isolated     {}", graph.isolated_nodes);
    if let Some((name, score)) = &graph.most_central {
        println!("    most central {} ({:.2})", name, score);
    }
    println!();
}

fn print_pathogens(session: &ExplorerSession, query: &PathogenQuery, as_json: bool) {
    let hits = session.search_pathogens(query);
    if as_json {
        print_json(&json!(hits));
        return;
    }
    println!();
    for p in &hits {
        let details = p.details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default();
        println!(
            "  {:<40} {:<10} {:<18} {} condition(s)",
            format!("{}{}", p.name, details),
            p.gram_status.label(),
            p.pathogen_type.label(),
            p.conditions.len()
        );
    }
    println!();
    println!("  {} pathogen(s)", hits.len());
    println!();
}

fn print_antibiotics(session: &ExplorerSession, query: &AntibioticQuery, as_json: bool) {
    let hits = session.search_antibiotics(query);
    if as_json {
        print_json(&json!(hits));
        return;
    }
    println!();
    for a in &hits {
        println!(
            "  {:<32} {:<40} {} condition(s)",
            a.name,
            a.drug_class,
            a.conditions.len()
        );
    }
    println!();
    println!("  {} antibiotic(s)", hits.len());
    println!();
}

fn print_similarity(session: &ExplorerSession, a: &str, b: &str, as_json: bool) -> PathomapResult<()> {
    let result = session.similarity_by_name(a, b)?;
    if as_json {
        print_json(&json!(result));
        return Ok(());
    }
    let f = &result.factors;
    println!();
    println!("  {} ~ {}", result.pathogen_a, result.pathogen_b);
    println!("  Total:               {:.3}", result.total);
    println!("  Gram status:         {:.3}", f.gram_status);
    println!("  Organism type:       {:.3}", f.pathogen_type);
    println!("  Shared conditions:   {:.3}", f.shared_conditions);
    println!("  Shared antibiotics:  {:.3}", f.shared_antibiotics);
    println!("  Complexity:          {:.3}", f.complexity);
    println!("  Resistance:          {:.3}", f.resistance);
    let d = &result.details;
    if !d.shared_conditions.is_empty() {
        println!("  Both appear in:      {}", d.shared_conditions.join(", "));
    }
    if !d.shared_antibiotics.is_empty() {
        println!("  Common antibiotics:  {}", d.shared_antibiotics.join(", "));
    }
    println!();
    Ok(())
}

fn print_paths(
    session: &ExplorerSession,
    start: &str,
    end: &str,
    max_depth: usize,
    strategy: PathStrategy,
    limit: usize,
    as_json: bool,
) -> PathomapResult<()> {
    let paths = session.ranked_paths(start, end, max_depth, strategy)?;
    let shown: Vec<_> = paths.iter().take(limit).collect();
    if as_json {
        print_json(&json!(shown));
        return Ok(());
    }
    println!();
    if shown.is_empty() {
        println!("  No path within {} hop(s).", max_depth);
    }
    for (rank, path) in shown.iter().enumerate() {
        println!(
            "  {}. score {:.3}, {} hop(s): {}",
            rank + 1,
            path.score,
            path.hops,
            path.nodes.join(" -> ")
        );
    }
    println!();
    println!("  {} path(s) found", paths.len());
    println!();
    Ok(())
}

fn print_recommendations(
    session: &ExplorerSession,
    current: &str,
    recent: &[String],
    preferences: &Preferences,
    as_json: bool,
) {
    let recs = session.recommend(current, recent, preferences);
    if as_json {
        print_json(&json!(recs));
        return;
    }
    println!();
    if recs.is_empty() {
        println!("  No recommendations for '{}'.", current);
    }
    for rec in &recs {
        println!("  {:<36} {:.2}  {}", rec.pathogen, rec.score, rec.reasoning);
    }
    println!();
}

fn print_diagnostics(session: &ExplorerSession, as_json: bool) {
    let diagnostics = &session.indexes().diagnostics;
    if as_json {
        print_json(&json!(diagnostics.skipped()));
        return;
    }
    println!();
    for (reason, count) in diagnostics.count_by_reason() {
        println!("  {:<18} {}", reason.label(), count);
    }
    println!();
    for fragment in diagnostics.skipped() {
        println!(
            "  [{}] {}: {}",
            fragment.reason,
            fragment.condition_id.as_deref().unwrap_or("-"),
            fragment.text
        );
    }
    println!();
}
