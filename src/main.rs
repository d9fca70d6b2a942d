//! Command-line interface for the flexio inflection engine.
//!
//! Provides a `compile` command turning the linguistic source files into
//! the dataset artifact, plus `decline` and `roots` query commands over a
//! compiled artifact.

use clap::{Parser, Subcommand};
use colored::*;
use flexio_rs::{Decliner, error::Result};
use log::{LevelFilter, error, info};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Latin inflection engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the compiled dataset artifact
    #[arg(long, global = true, default_value = "collected.json")]
    data: PathBuf,

    /// Set verbosity level (use -v, -vv, or -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the linguistic source files into the dataset artifact
    Compile {
        /// Paradigm definition file
        #[arg(long, default_value = "data/modeles.la")]
        models: PathBuf,
        /// Lemma file
        #[arg(long, default_value = "data/lemmes.la")]
        lemmas: PathBuf,
        /// Morphological tag-name file
        #[arg(long, default_value = "data/morphos.la")]
        morphos: PathBuf,
    },
    /// Produce every inflected form of a lemma
    Decline {
        /// The lemma to inflect (ASCII spelling)
        lemma: String,
        /// Print one flat list instead of per-tag lines
        #[arg(long, default_value_t = false)]
        flat: bool,
    },
    /// Show the root strings a lemma's forms are built on
    Roots {
        /// The lemma to resolve
        lemma: String,
    },
}

/// Sets up logging based on verbosity level.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let outcome = match cli.command {
        Commands::Compile {
            models,
            lemmas,
            morphos,
        } => handle_compile(&models, &lemmas, &morphos, &cli.data),
        Commands::Decline { lemma, flat } => handle_decline(&cli.data, &lemma, flat),
        Commands::Roots { lemma } => handle_roots(&cli.data, &lemma),
    };

    if let Err(e) = outcome {
        error!("{e}");
        eprintln!("{}", format!("Error: {e}").red());
        std::process::exit(1);
    }
}

fn handle_compile(
    models: &PathBuf,
    lemmas: &PathBuf,
    morphos: &PathBuf,
    out: &PathBuf,
) -> Result<()> {
    info!("Compiling {models:?} + {lemmas:?} + {morphos:?} -> {out:?}");
    let models_source = std::fs::read_to_string(models)?;
    let lemmas_source = std::fs::read_to_string(lemmas)?;
    let morphos_source = std::fs::read_to_string(morphos)?;

    let dataset = flexio_rs::data::build_dataset(&models_source, &lemmas_source, &morphos_source)?;
    flexio_rs::data::write_dataset(&dataset, out)?;
    println!(
        "Compiled {} paradigms and {} lemmas into {}",
        dataset.models.len().to_string().bold(),
        dataset.lemmas.len().to_string().bold(),
        out.display().to_string().green()
    );
    Ok(())
}

fn handle_decline(data: &PathBuf, lemma: &str, flat: bool) -> Result<()> {
    let decliner = Decliner::from_path(data)?;

    if flat {
        for form in decliner.decline_flat(lemma)? {
            println!("{form}");
        }
        return Ok(());
    }

    let forms = decliner.decline(lemma)?;
    if forms.is_empty() {
        println!("No forms for '{}'.", lemma.yellow());
        return Ok(());
    }
    println!("{}", lemma.bold().cyan());
    for (tag, variants) in &forms {
        let name = decliner.tag_name(*tag).unwrap_or("?");
        println!(
            "  {:>4}  {}  {}",
            tag.to_string().bold(),
            variants.join(", ").green(),
            name.italic().dimmed()
        );
    }
    Ok(())
}

fn handle_roots(data: &PathBuf, lemma: &str) -> Result<()> {
    let decliner = Decliner::from_path(data)?;
    let roots = decliner.roots(lemma, None)?;
    println!("{}", lemma.bold().cyan());
    for (root_id, strings) in &roots {
        println!("  {}: {}", root_id.bold(), strings.join(", ").green());
    }
    Ok(())
}
