use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};

use struct2msg::{
    compile, schemas_to_json,
    traits::{ClangJsonFrontend, Frontend, HeaderFrontend},
    EmissionFilter, GeneratorConfig, WalkReport,
};
use struct2msg_compiler::error::Struct2MsgError;

#[derive(Parser)]
#[command(name = "struct2msg")]
#[command(about = "Turn C/C++ struct declarations into numbered message schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every record visited (to stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read C/C++ headers with the built-in declaration parser
    Header {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Read JSON dumps from `clang -Xclang -ast-dump=json -fsyntax-only`
    ClangAst {
        #[command(flatten)]
        args: GenerateArgs,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Input files, processed in order
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Only emit messages whose name contains this substring
    #[arg(short, long)]
    filter: Option<String>,

    /// Only emit messages whose name matches this regular expression
    #[arg(long, conflicts_with = "filter")]
    filter_regex: Option<String>,

    /// Output file (if omitted, prints to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fail if any anonymous record could not be named
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl GenerateArgs {
    fn config(&self) -> Result<GeneratorConfig, Struct2MsgError> {
        let filter = match (&self.filter, &self.filter_regex) {
            (Some(substring), _) => EmissionFilter::contains(substring.as_str()),
            (None, Some(pattern)) => EmissionFilter::regex(pattern)?,
            (None, None) => EmissionFilter::All,
        };
        Ok(GeneratorConfig::with_filter(filter))
    }
}

fn main() -> Result<(), Struct2MsgError> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match &cli.command {
        Commands::Header { args } => run(args, &HeaderFrontend),
        Commands::ClangAst { args } => run(args, &ClangJsonFrontend),
    }
}

fn run(args: &GenerateArgs, frontend: &dyn Frontend) -> Result<(), Struct2MsgError> {
    let config = args.config()?;

    let mut report = WalkReport::default();
    for input in &args.input {
        let text = fs::read_to_string(input)?;
        let part = compile(frontend, &text, &config)?;
        info!(
            input = %input.display(),
            messages = part.schemas.len(),
            filtered = part.filtered,
            unresolved = part.failures.len(),
            "processed"
        );
        report.merge(part);
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    match args.format {
        Format::Text => report.write_to(&mut out)?,
        Format::Json => writeln!(out, "{}", schemas_to_json(&report.schemas)?)?,
    }
    out.flush()?;
    if let Some(path) = &args.output {
        info!(output = %path.display(), messages = report.schemas.len(), "written");
    }

    if args.strict && !report.failures.is_empty() {
        return Err(Struct2MsgError::Unresolved { count: report.failures.len() });
    }
    Ok(())
}
