use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use precis_common::RenderMode;
use precis_common::observability::{LogFormat, init_logging};
use precis_config::{PrecisConfig, PrecisConfigLoader, default_config_path};
use std::io::Write;
use std::path::PathBuf;

mod form;
mod pipeline;
mod tether;

/// Summarize web pages with a hosted language model
#[derive(Parser, Debug)]
#[command(name = "precis")]
#[command(version)]
#[command(about = "Fetch a web page and summarize it", long_about = None)]
struct Cli {
    /// YAML config file (default: ~/.config/precis/precis.yaml, if present)
    #[arg(long, global = true, env = "PRECIS_CONFIG")]
    config: Option<PathBuf>,

    /// Log encoding; overrides logging.format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Mirror logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize one page and exit
    Summarize {
        url: String,
        /// Render the page in a headless browser first
        #[arg(long)]
        render: bool,
    },
    /// Prompt for pages until EOF or `:q` (the default)
    Interactive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn load_config(cli: &Cli) -> Result<PrecisConfig> {
    let loader = match (&cli.config, default_config_path()) {
        (Some(path), _) => PrecisConfigLoader::new().with_file(path),
        (None, Some(path)) => PrecisConfigLoader::new().with_optional_file(path),
        (None, None) => PrecisConfigLoader::new(),
    };
    let mut cfg = loader.load().context("loading configuration")?;
    if let Some(format) = cli.log_format {
        cfg.logging.format = format.into();
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1) .env first so ${OPENAI_API_KEY} resolves (process env wins)
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // 2) Load config (env wins)
    let cfg = load_config(&cli)?;

    let log_path = init_logging(tether::log_config(&cfg, cli.verbose))?;
    tracing::info!(log = %log_path.display(), model = %cfg.llm.model, "precis.start");

    let pipeline = tether::build_from_config(&cfg).await?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Summarize { url, render } => {
            let mode = RenderMode::from_flag(render);
            let result = pipeline
                .run(&url, mode, |stage| eprintln!("{stage}"))
                .await?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", result.text)?;
        }
        Commands::Interactive => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            form::run(&pipeline, stdin, &mut stdout).await?;
        }
    }
    Ok(())
}
