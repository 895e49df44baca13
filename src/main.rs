use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use fiae_prestations::config::DEFAULT_CONFIG_FILE;
use fiae_prestations::{
    compute_score, impact, load_file, logger, write_exports, AppConfig, Quadrant, ScoreBand,
    Session,
};

#[derive(Debug, Parser)]
#[command(name = "fiae")]
#[command(about = "FIAE Module 1 - prioritise your service offerings", version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[arg(long, short, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session (default)
    Tui {
        /// Resume from a previous CSV or JSON export
        #[arg(long)]
        input: Option<PathBuf>,

        /// Recommend the best overall score instead of a light first item
        #[arg(long)]
        experienced: bool,
    },

    /// Score one prestation and show its quadrant
    Score {
        #[arg(long)]
        recurrence: String,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        chronophage: u8,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        rentabilite: u8,

        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        satisfaction: u8,
    },

    /// Print the analysis of a previous export
    Analyze {
        input: PathBuf,

        #[arg(long)]
        experienced: bool,
    },

    /// Re-write a previous export as fresh CSV + JSON files
    Export {
        input: PathBuf,

        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;

    match cli.command {
        None => run_ui_mode(&config, cli.verbose, None, false),
        Some(Command::Tui { input, experienced }) => {
            run_ui_mode(&config, cli.verbose, input.as_deref(), experienced)
        }
        Some(Command::Score {
            recurrence,
            chronophage,
            rentabilite,
            satisfaction,
        }) => {
            logger::init_cli_logger(cli.verbose);
            run_score(&recurrence, chronophage, rentabilite, satisfaction)
        }
        Some(Command::Analyze { input, experienced }) => {
            logger::init_cli_logger(cli.verbose);
            run_analyze(&config, &input, experienced)
        }
        Some(Command::Export { input, output_dir }) => {
            logger::init_cli_logger(cli.verbose);
            let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            run_export(&input, &dir)
        }
    }
}

fn load_session(config: &AppConfig, input: Option<&Path>, experienced: bool) -> Result<Session> {
    let mut session = match input {
        Some(path) => {
            let items = load_file(path).with_context(|| format!("Failed to load {:?}", path))?;
            Session::with_items(items)
        }
        None => Session::new(),
    };
    session.set_first_time(config.first_time && !experienced);
    Ok(session)
}

fn run_score(recurrence: &str, chronophage: u8, rentabilite: u8, satisfaction: u8) -> Result<()> {
    let score = compute_score(recurrence, chronophage, rentabilite, satisfaction)
        .context("Failed to compute score")?;
    let quadrant = fiae_prestations::classify(chronophage, rentabilite, satisfaction);

    println!("🎯 Score   : {:.2}/10 ({:?})", score, ScoreBand::of(score));
    println!("📊 Impact  : {:.1}/10", impact(rentabilite, satisfaction));
    println!("🧭 Quadrant: {}", quadrant.title());

    Ok(())
}

fn run_analyze(config: &AppConfig, input: &Path, experienced: bool) -> Result<()> {
    let session = load_session(config, Some(input), experienced)?;

    let Some(analysis) = session.analysis() else {
        println!("ℹ️  Aucune prestation dans {:?}", input);
        return Ok(());
    };

    println!("📊 Matrice Effort vs Impact");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for quadrant in Quadrant::ALL {
        println!("\n{}", quadrant.title());
        let items = analysis.matrix.cell(quadrant);
        if items.is_empty() {
            println!("   Aucune prestation dans cette catégorie");
        }
        for p in items {
            println!("   • {} - Score: {}", p.name, p.score);
        }
    }

    println!("\n📋 Tableau d'analyse détaillé");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for row in &analysis.table {
        println!(
            "   {:<30} {:<13} chrono {:>2}  rentab. {:>2}  satisf. {:>2}  impact {:>4.1}  score {:>5.2}",
            row.name,
            row.recurrence.label(),
            row.time_consumption,
            row.profitability,
            row.satisfaction,
            row.impact,
            row.score
        );
    }

    println!("\n🤖 Recommandation");
    match &analysis.recommendation {
        Some(rec) => println!("   {:?}: {} (score {})", rec.kind, rec.prestation.name, rec.prestation.score),
        None => println!("   Aucune prestation peu chronophage à recommander"),
    }

    let agg = &analysis.aggregate;
    println!("\n📈 Total: {}  Charge moyenne: {:.1}/10  Rentabilité moy.: {:.1}/10  Quick Wins: {}",
        agg.count, agg.mean_time_consumption, agg.mean_profitability, agg.quick_win_count);

    Ok(())
}

fn run_export(input: &Path, output_dir: &Path) -> Result<()> {
    let items = load_file(input).with_context(|| format!("Failed to load {:?}", input))?;

    let now = Local::now().naive_local();
    let paths = write_exports(output_dir, &items, &now).context("Failed to write exports")?;

    println!("✅ {} prestations exported", items.len());
    println!("📄 CSV : {}", paths.csv.display());
    println!("🔗 JSON: {}", paths.json.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig, verbose: bool, input: Option<&Path>, experienced: bool) -> Result<()> {
    logger::init_file_logger(&config.log_file, verbose)
        .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;

    let session = load_session(config, input, experienced)?;
    tracing::info!(items = session.items().len(), "starting interactive session");

    let mut app = fiae_prestations::ui::App::new(session, config.output_dir.clone());
    fiae_prestations::ui::run_ui(&mut app)?;

    println!("\n✅ Session terminée ({} prestations)", app.session.items().len());

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig, _verbose: bool, _input: Option<&Path>, _experienced: bool) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: fiae score | fiae analyze | fiae export");
    std::process::exit(1);
}
