//! OxiBin CLI - inspect ZIP archives, raw DEFLATE streams and Protocol Buffers messages.

mod commands;
mod utils;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{ExtractOptions, ListOptions, ProtoOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oxibin")]
#[command(
    author,
    version,
    about = "Pure Rust binary inspector - ZIP, DEFLATE and Protocol Buffers"
)]
#[command(long_about = "
OxiBin reads binary containers entirely in memory: ZIP archives (stored,
deflated and ZIP64), raw DEFLATE streams and Protocol Buffers messages in
both the binary and the text encoding.

Examples:
  oxibin list model.zip
  oxibin list -v --json model.zip -I '*.onnx'
  oxibin extract model.zip -o out/
  oxibin test model.zip
  oxibin info model.zip
  oxibin inflate payload.deflate -o payload.bin
  oxibin proto model.pb --depth 3
  oxibin proto graph.pbtxt --text
  oxibin completions bash
")]
struct Cli {
    /// Increase output detail and log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a ZIP archive
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only entries matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,
    },

    /// Extract files from a ZIP archive
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Entries to extract (all if empty)
        files: Vec<String>,

        /// Include only entries matching pattern (glob syntax: *.txt, src/**/*)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude entries matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Overwrite existing files without asking
        #[arg(short, long)]
        force: bool,

        /// Show progress bar
        #[arg(short = 'P', long, default_value = "true")]
        progress: bool,
    },

    /// Decompress every entry and verify its CRC-32
    #[command(alias = "t")]
    Test {
        /// Archive file to test
        archive: PathBuf,
    },

    /// Show information about a ZIP archive
    #[command(alias = "i")]
    Info {
        /// Archive file to inspect
        archive: PathBuf,
    },

    /// Decompress a raw DEFLATE stream
    Inflate {
        /// Raw DEFLATE input (no zlib or gzip header)
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dump a Protocol Buffers message without a schema
    Proto {
        /// Encoded message
        file: PathBuf,

        /// Input is in the text format
        #[arg(short, long)]
        text: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// How deep to look into length-delimited fields for nested messages
        #[arg(short, long, default_value = "8")]
        depth: usize,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::List {
            archive,
            json,
            include,
            exclude,
        } => commands::cmd_list(
            &archive,
            &ListOptions {
                verbose,
                json,
                include: &include,
                exclude: &exclude,
            },
        ),
        Commands::Extract {
            archive,
            output,
            files,
            include,
            exclude,
            force,
            progress,
        } => commands::cmd_extract(
            &archive,
            &ExtractOptions {
                output: &output,
                files: &files,
                include: &include,
                exclude: &exclude,
                verbose,
                force,
                progress,
            },
        ),
        Commands::Test { archive } => commands::cmd_test(&archive, verbose),
        Commands::Info { archive } => commands::cmd_info(&archive),
        Commands::Inflate { input, output } => commands::cmd_inflate(&input, output.as_deref()),
        Commands::Proto {
            file,
            text,
            json,
            depth,
        } => commands::cmd_proto(
            &file,
            &ProtoOptions {
                text,
                json,
                max_depth: depth,
            },
        ),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "oxibin", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
