pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use basketwise_core::config::{ConfigOverrides, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "basketwise",
    about = "Basket history analytics CLI",
    long_about = "Recommend items, compose shopping tips, and report price insights from a basket history snapshot.",
    after_help = "Examples:\n  basketwise recommend --items rice,beans\n  basketwise tips --items bread --user u1\n  basketwise prices --history data/history.json\n  basketwise basket --id bkt_123 --user u1"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a basketwise.toml config file")]
    config: Option<PathBuf>,
    #[arg(long = "history", global = true, help = "History JSON file (overrides history.path)")]
    history_path: Option<PathBuf>,
    #[arg(long, global = true, help = "Only analyze baskets owned by this user")]
    user: Option<String>,
    #[arg(long, global = true, help = "Log level: trace|debug|info|warn|error")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Log format: compact|pretty|json")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank items that co-occur with the current list")]
    Recommend {
        #[arg(long, default_value = "", help = "Comma-separated current list")]
        items: String,
        #[arg(long, help = "Maximum recommendations (1-50)")]
        limit: Option<usize>,
    },
    #[command(about = "Compose complement, seasonal and replenishment tips")]
    Tips {
        #[arg(long, default_value = "", help = "Comma-separated current list")]
        items: String,
    },
    #[command(about = "Report average, last and percent change of recorded item prices")]
    Prices,
    #[command(about = "Rank items by the number of baskets they appear in")]
    Popular {
        #[arg(long, help = "Maximum items (1-100)")]
        limit: Option<usize>,
    },
    #[command(about = "Show one basket by id")]
    Basket {
        #[arg(long, help = "Basket id")]
        id: String,
    },
    #[command(about = "Export every basket in scope as {\"baskets\": [...]}")]
    Export,
    #[command(about = "List baskets newest first")]
    History {
        #[arg(long, help = "Maximum baskets (1-500)")]
        limit: Option<usize>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                history_path: self.history_path.clone(),
                user_id: self.user.clone(),
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();
    logging::init_from(&options);

    let result = match cli.command {
        Command::Recommend { items, limit } => commands::recommend::run(options, &items, limit),
        Command::Tips { items } => commands::tips::run(options, &items),
        Command::Prices => commands::prices::run(options),
        Command::Popular { limit } => commands::popular::run(options, limit),
        Command::History { limit } => commands::history::run(options, limit),
        Command::Basket { id } => commands::basket::run(options, &id),
        Command::Export => commands::export::run(options),
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
