//! Report Composer CLI
//!
//! Usage:
//!   report-composer [OPTIONS] [MASTER]
//!
//! Options:
//!   -t, --templates <DIR>  Directory holding sub-report templates
//!   -c, --config <FILE>    Composer configuration (TOML format)
//!   --nested               Compose placeholders inside sub-templates too
//!   --emit-design          Print the rewritten master design
//!   -v, --verbose          Log composition progress
//!   -h, --help             Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use report_composer::{
    parse, CompiledReport, ComposedReport, Composer, ComposerConfig, DirectoryStore,
    StandardCompiler,
};

#[derive(Parser)]
#[command(name = "report-composer")]
#[command(about = "Compose report designs with their embedded sub-reports")]
struct Cli {
    /// Master design file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Directory holding sub-report templates
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Composer configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compose placeholders inside sub-templates too
    #[arg(long)]
    nested: bool,

    /// Print the rewritten master design instead of a summary
    #[arg(long)]
    emit_design: bool,

    /// Log composition progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match ComposerConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ComposerConfig::default(),
    };
    if let Some(dir) = &cli.templates {
        config = config.with_template_dir(dir);
    }
    if cli.nested {
        config = config.with_nested(true);
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut master = match parse(&source) {
        Ok(design) => design,
        Err(errors) => {
            for error in &errors {
                eprint!("{}", error.format(&source, &filename));
            }
            std::process::exit(1);
        }
    };

    let template_dir = config
        .template_dir
        .clone()
        .unwrap_or_else(|| default_template_dir(cli.input.as_deref()));
    let store = DirectoryStore::new(template_dir).with_extension(config.extension.clone());
    let composer = Composer::new(store, StandardCompiler).with_nested(config.nested);

    match composer.compose_in_place(&mut master) {
        Ok(package) => {
            if cli.emit_design {
                print!("{}", master);
            } else {
                print_summary(&package);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

/// Templates live next to the master unless configured otherwise
fn default_template_dir(input: Option<&Path>) -> PathBuf {
    input
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_summary(package: &ComposedReport<CompiledReport>) {
    let report = package.report();
    println!("report {}", report.name());

    println!("parameters:");
    for parameter in report.parameters() {
        println!("  {}: {}", parameter.name, parameter.value_type);
    }

    println!("subreports:");
    for (name, subreport) in package.bindings() {
        println!(
            "  $P{{{}}} -> {} ({} sections)",
            name,
            subreport.name(),
            subreport.sections().len()
        );
    }
}
