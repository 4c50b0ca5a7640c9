//! folio - render a JSON document model into XHTML section files

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use folio::{RootElement, WriterConfig, XhtmlWriter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Render document sections as XHTML files", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio book.json OEBPS/text                      Write one .xhtml per section
    folio book.json OEBPS/text -t page.xhtml        Use a markup template
    folio book.json OEBPS/text --dry-run            Render without writing")]
struct Cli {
    /// Input document (JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Existing output directory
    #[arg(value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// Markup template to render sections into
    #[arg(short, long, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Write compact output instead of indented output
    #[arg(long)]
    no_pretty_print: bool,

    /// Output encoding
    #[arg(long, default_value = "utf-8")]
    encoding: String,

    /// Render and serialize everything but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Log every file written
    #[arg(short, long)]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "folio=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let json = fs::read_to_string(&cli.input)
        .map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let document: RootElement =
        serde_json::from_str(&json).map_err(|e| format!("{}: {e}", cli.input.display()))?;

    let writer = XhtmlWriter::new().with_config(WriterConfig {
        pretty_print: !cli.no_pretty_print,
        encoding: cli.encoding.clone(),
    });

    let written = writer
        .write_as_many_documents(
            &cli.output,
            &document,
            cli.template.as_deref(),
            cli.dry_run,
        )
        .map_err(|e| e.to_string())?;

    if !cli.quiet {
        for path in &written {
            println!("{}", path.display());
        }
        if cli.dry_run {
            println!("(dry run: {} files not written)", written.len());
        }
    }

    Ok(())
}
