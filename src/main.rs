//! CLI entry point for `mimeparse`.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use mimeparse::config::Config;
use mimeparse::export;
use mimeparse::Message;

#[derive(Parser)]
#[command(name = "mimeparse", version, about = "Inspect RFC 822 / MIME messages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum nested multipart depth to flatten (overrides config)
    #[arg(long, value_name = "N", global = true)]
    max_depth: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a message: headers, parts and text body
    Show {
        file: PathBuf,
    },
    /// Print a message as JSON
    Json {
        file: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Save all attachments of a message
    Extract {
        file: PathBuf,
        /// Output directory (defaults to the config's export dir, then ".")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = mimeparse::config::load_config();
    if let Some(depth) = cli.max_depth {
        config.parser.max_nesting_depth = depth;
    }

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Show { file } => cmd_show(&file, &config),
        Commands::Json { file, pretty } => cmd_json(&file, pretty, &config),
        Commands::Extract { file, output } => cmd_extract(&file, output, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_file = mimeparse::config::log_file_path(config);
    let log_dir = log_file.parent().map(Path::to_path_buf).unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mimeparse.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn load(path: &Path, config: &Config) -> anyhow::Result<Message> {
    let message = Message::from_file_with(path, &config.parse_options())?;
    tracing::info!(
        path = %path.display(),
        parts = message.parts().len(),
        "Parsed message"
    );
    Ok(message)
}

/// Print a human-readable summary.
fn cmd_show(path: &Path, config: &Config) -> anyhow::Result<()> {
    let message = load(path, config)?;
    print!("{}", export::text::render_summary(&message));
    Ok(())
}

/// Print the JSON projection.
fn cmd_json(path: &Path, pretty: bool, config: &Config) -> anyhow::Result<()> {
    let message = load(path, config)?;
    let json = export::json::to_json(&message, pretty || config.export.pretty_json)?;
    println!("{json}");
    Ok(())
}

/// Extract attachments to a directory.
fn cmd_extract(path: &Path, output: Option<PathBuf>, config: &Config) -> anyhow::Result<()> {
    let message = load(path, config)?;
    let output = output
        .or_else(|| config.export.default_output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let paths = export::attachment::save_attachments(&message, &output)?;
    if paths.is_empty() {
        println!("  No attachments found");
        return Ok(());
    }

    let total: u64 = paths
        .iter()
        .filter_map(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();
    for p in &paths {
        println!("  {}", p.display());
    }
    println!(
        "  Extracted {} attachment(s), {}",
        paths.len(),
        humansize::format_size(total, humansize::BINARY)
    );
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mimeparse", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}
