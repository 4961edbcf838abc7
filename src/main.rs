//! `phpreflect` command line: describe PHP declarations without running them.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use phpreflect::config::Config;
use phpreflect::{Error, IdentifierKind, Reflector};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `phpreflect=debug`.
const LOG_ENV: &str = "PHPREFLECT_LOG";

/// Static reflection for PHP source.
#[derive(Parser)]
#[command(name = "phpreflect", version, about = "Static reflection for PHP source")]
struct Cli {
    /// What to describe.
    #[command(subcommand)]
    command: Commands,

    /// PHP file searched before the configured locators (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Project root containing .phpreflect.toml
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Describe a class, interface, trait or enum and its members
    Class {
        /// Fully qualified name, e.g. App\\Kernel
        name: String,
    },
    /// Describe a function: signature, flags, doc comment and body
    Function {
        /// Fully qualified name, e.g. App\\Support\\helper
        name: String,
    },
    /// List declarations in the source served for the wildcard identifier
    List {
        /// Which declarations to list
        #[arg(value_enum)]
        kind: ListKind,
    },
}

/// Argument of `list`.
#[derive(Clone, Copy, ValueEnum)]
enum ListKind {
    /// Classes, interfaces, traits and enums
    Classes,
    /// Free functions
    Functions,
}

/// Exit 0 on success, 1 when the identifier is not found, 2 on any other error.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_not_found() => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        },
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        },
    }
}

/// Log to stderr, filtered by `PHPREFLECT_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the reflector from config plus `--file` arguments and run the command.
///
/// # Errors
///
/// Returns errors from config loading, locator construction, or reflection.
fn run(cli: &Cli) -> Result<(), Error> {
    let mut config = Config::load(&cli.root)?;
    let files = cli
        .files
        .iter()
        .map(|f| std::path::absolute(f).map_err(|e| Error::io(f, e)))
        .collect::<Result<Vec<_>, _>>()?;
    config.prepend_files(files);

    let reflector = Reflector::with_resolver(Box::new(config.build_locator()?), config.resolver());

    match &cli.command {
        Commands::Class { name } => {
            let class = reflector.reflect_class(name)?;
            let summary = report::class_report(&class);
            if cli.json {
                report::print_json(&summary)
            } else {
                print!("{}", report::render_class(&summary));
                Ok(())
            }
        },
        Commands::Function { name } => {
            let function = reflector.reflect_function(name)?;
            let summary = report::function_report(&function);
            if cli.json {
                report::print_json(&summary)
            } else {
                print!("{}", report::render_function(&summary));
                Ok(())
            }
        },
        Commands::List { kind } => {
            let kind = match kind {
                ListKind::Classes => IdentifierKind::Class,
                ListKind::Functions => IdentifierKind::Function,
            };
            let reflections = reflector.reflect_all(kind)?;
            report::print_names(&reflections, cli.json)
        },
    }
}
