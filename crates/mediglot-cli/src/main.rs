use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use owo_colors::OwoColorize;

use mediglot_core::MatchConfig;
use mediglot_vocab::MedicalVocabulary;

/// Check clinical text against the medical vocabulary and suggest
/// corrections for unrecognized terms.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Text to check; read from stdin when omitted
    text: Vec<String>,

    /// Path to a vocabulary file (.json array or one term per line);
    /// the embedded term list is used when unset
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Maximum suggestions per unrecognized word
    #[arg(long, default_value_t = 3)]
    max_results: usize,

    /// Minimum similarity score in [0,1]
    #[arg(long, default_value_t = 0.6)]
    min_similarity: f64,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let text = if args.text.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.text.join(" ")
    };

    let vocab = match args.vocab {
        Some(ref path) => MedicalVocabulary::from_file(path)?,
        None => MedicalVocabulary::embedded(),
    };

    let config = MatchConfig {
        max_results: args.max_results,
        min_similarity: args.min_similarity,
    };

    let suggestions = mediglot_core::suggest_detailed(&text, &vocab, &config);
    if suggestions.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }

    println!("Possible medical terms:");
    for s in suggestions {
        if args.no_color {
            println!("  {}  ({:.2})", s.term, s.score);
        } else {
            println!("  {}  ({:.2})", s.term.green(), s.score.dimmed());
        }
    }

    Ok(())
}
