//! marktree CLI - render Markdown through the rule pipeline

use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use marktree::{JsonEngine, KeySequence, MarkupEngine, Options, PulldownEngine};

#[derive(Parser)]
#[command(name = "marktree")]
#[command(version, about = "Render Markdown through a rule-driven tree pipeline", long_about = None)]
#[command(after_help = "EXAMPLES:
    marktree README.md              Render to HTML
    marktree --ast README.md        Dump the AST as JSON
    cat doc.md | marktree --tokens  Dump the cleaned token stream")]
struct Cli {
    /// Input file; reads stdin when absent or `-`
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Input is a markdown-it token dump (JSON) instead of Markdown
    #[arg(long)]
    json: bool,

    /// Print the cleaned token stream as JSON
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the AST as JSON
    #[arg(long)]
    ast: bool,

    /// Trace visited node types to stderr
    #[arg(long)]
    debug_tree: bool,

    /// Truncate containers to N children
    #[arg(long, value_name = "N")]
    max_top_level: Option<usize>,

    /// Cut text leaves at N characters
    #[arg(long, value_name = "N")]
    text_limit: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug_tree { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(input: Option<&str>) -> io::Result<String> {
    match input {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = read_input(cli.input.as_deref()).map_err(|e| e.to_string())?;
    let pulldown = PulldownEngine::new();
    let engine: &dyn MarkupEngine = if cli.json { &JsonEngine } else { &pulldown };

    let output = if cli.tokens {
        let tokens = marktree::parse_tokens(&source, engine);
        serde_json::to_string_pretty(&tokens).map_err(|e| e.to_string())?
    } else if cli.ast {
        let nodes = marktree::parse_to_ast(&source, engine, &KeySequence::new());
        serde_json::to_string_pretty(&nodes).map_err(|e| e.to_string())?
    } else {
        let options = Options {
            max_top_level_children: cli.max_top_level,
            debug_print_tree: cli.debug_tree,
            text_limit: cli.text_limit,
            ..Options::default()
        };
        marktree::to_html_with_options(&source, engine, options).map_err(|e| e.to_string())?
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).map_err(|e| e.to_string())?;
    stdout.write_all(b"\n").map_err(|e| e.to_string())?;
    Ok(())
}
