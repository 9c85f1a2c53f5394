use attr_search::{
    AttributeRegistry,
    cli::{self, CheckOptions, CheckResult, CliError, CompileCommand},
};
use clap::{Parser as ClapParser, Subcommand};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "attr-search")]
#[command(about = "Compile search queries into parameterized SQL filters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate query syntax and print the parsed tree
    Check {
        /// The query (reads from stdin if not provided)
        query: Option<String>,

        /// Treat the query as a JSON mapping
        #[arg(short, long)]
        mapping: bool,
    },

    /// Compile a query against a registry and print SQL and parameters
    Compile {
        /// The query (reads from stdin if not provided)
        query: Option<String>,

        /// JSON file declaring the searchable attributes
        #[arg(short, long)]
        registry: PathBuf,

        /// Treat the query as a JSON mapping
        #[arg(short, long)]
        mapping: bool,

        /// Use $1-style placeholders
        #[arg(short, long)]
        numbered: bool,

        /// Turn query errors into a filter matching no rows
        #[arg(long)]
        safe: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { query, mapping } => run_check(query, mapping),
        Commands::Compile {
            query,
            registry,
            mapping,
            numbered,
            safe,
        } => run_compile(query, registry, mapping, numbered, safe),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn read_query(query: Option<String>) -> Result<String, CliError> {
    match query {
        Some(q) => Ok(q),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end().to_string())
        }
        None => Err(CliError::NoQuery),
    }
}

fn run_check(query: Option<String>, mapping: bool) -> Result<(), CliError> {
    let options = CheckOptions {
        query: read_query(query)?,
        mapping,
    };

    match cli::execute_check(&options)? {
        CheckResult::Blank => println!("Blank query (matches everything)"),
        CheckResult::Parsed(node) => println!("{:#?}", node),
    }
    Ok(())
}

fn run_compile(
    query: Option<String>,
    registry: PathBuf,
    mapping: bool,
    numbered: bool,
    safe: bool,
) -> Result<(), CliError> {
    let registry = AttributeRegistry::from_json_str(&fs::read_to_string(registry)?)?;
    let command = CompileCommand {
        check: CheckOptions {
            query: read_query(query)?,
            mapping,
        },
        numbered,
        safe,
    };

    let filter = cli::execute_compile(&command, &registry)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&cli::filter_to_json(&filter))?
    );
    Ok(())
}
