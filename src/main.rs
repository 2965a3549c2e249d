use std::io::Read;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dtotree::{OutputFormat, Request};

#[derive(Parser)]
#[command(name = "dtotree", about = "Pick the fields of an entity (and its relations) for a DTO")]
struct Cli {
    /// Schema file (reads from stdin if not provided or `-`)
    file: Option<std::path::PathBuf>,

    /// Entity to build the DTO from
    #[arg(long, short = 'e')]
    entity: String,

    /// Name of the generated DTO (defaults to <entity>DTO)
    #[arg(long)]
    dto_name: Option<String>,

    /// Existing `dto` block whose fields seed the selection
    #[arg(long)]
    existing: Option<String>,

    /// How many relations deep to offer fields
    #[arg(long, short = 'd', default_value_t = dtotree::session::DEFAULT_DEPTH)]
    depth: usize,

    /// Select a property by dotted path (repeatable)
    #[arg(long, value_name = "PATH")]
    select: Vec<String>,

    /// Deselect a property by dotted path (repeatable)
    #[arg(long, value_name = "PATH")]
    deselect: Vec<String>,

    /// Reuse the base DTO's mapper for inherited fields
    #[arg(long, conflicts_with = "no_reuse_base")]
    reuse_base: bool,

    /// Map inherited fields in this DTO instead of reusing the base mapper
    #[arg(long)]
    no_reuse_base: bool,

    /// Skip mapper generation
    #[arg(long)]
    no_mapper: bool,

    /// Mark the DTO with [DataContract]
    #[arg(long)]
    data_contract: bool,

    #[arg(long, short = 'f', value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Log relation resolution to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Tree,
    Json,
    Paths,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Tree => OutputFormat::Tree,
            Format::Json => OutputFormat::Json,
            Format::Paths => OutputFormat::Paths,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let input = match cli.file.as_deref().filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("ERROR: failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let request = Request {
        dto_name: cli.dto_name,
        existing_dto: cli.existing,
        depth: cli.depth,
        select: cli.select,
        deselect: cli.deselect,
        reuse_base_mapper: match (cli.reuse_base, cli.no_reuse_base) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        generate_mapper: !cli.no_mapper,
        add_data_contract: cli.data_contract,
        format: cli.format.into(),
        ..Request::new(cli.entity)
    };

    match dtotree::run(&input, &request) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}
