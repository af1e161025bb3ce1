use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use datacat_core::Lang;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod commands;
mod ui;

use commands::{Context, Format};

#[derive(Parser)]
#[command(name = "datacat", version, about = "Rule-driven data catalog toolkit")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only log warnings and errors on the console
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Document store directory (overrides `store_path`)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Read this configuration file instead of searching for `datacat.toml`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format of reports
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load rules.csv into the store (or only validate it with --check)
    Rules {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        check: bool,
    },

    /// Rebuild the reference tables named by the rules
    References {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Import the CSV of one model
    Import {
        #[arg(short, long)]
        model: String,
        #[arg(long)]
        lang: Option<Lang>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Keep columns no rule describes
        #[arg(long, default_value_t = false)]
        keep_unknown: bool,
        /// Add to the collection instead of replacing it
        #[arg(long, default_value_t = false)]
        append: bool,
    },

    /// Export one model to CSV
    Export {
        #[arg(short, long)]
        model: String,
        #[arg(long)]
        lang: Option<Lang>,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a header-only import template
    Template {
        #[arg(short, long)]
        model: String,
        #[arg(long)]
        lang: Option<Lang>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Register the comment fields of a model in the comments collection
    Comments {
        #[arg(short, long)]
        model: String,
    },

    /// Replace the users collection with the configured accounts
    Users,

    /// Rebuild the search indices
    Index {
        /// Models to index; every searchable model when omitted
        #[arg(short, long)]
        model: Vec<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Generate the API sources from the rules
    Codegen {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Rebuild the whole catalog from a data directory
    Init {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        lang: Option<Lang>,
        /// Also rebuild the search indices
        #[arg(long, default_value_t = false)]
        index: bool,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Also generate the API sources
        #[arg(long, default_value_t = false)]
        codegen: bool,
    },

    /// Dump JSON schemas of the reports
    Schema {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// List the collections of the store with their sizes
    Collections,
}

trait Runnable {
    fn run(self, ctx: &Context) -> Result<()>;
}

impl Runnable for Commands {
    fn run(self, ctx: &Context) -> Result<()> {
        let cmd_name = format!("{:?}", self);
        info!(event = "command_started", command = %cmd_name);

        let result = match self {
            Commands::Rules { file, check } => commands::rules::run_rules(ctx, file, check),
            Commands::References { dir } => commands::references::run_references(ctx, dir),
            Commands::Import {
                model,
                lang,
                file,
                keep_unknown,
                append,
            } => commands::import::run_import(ctx, model, lang, file, keep_unknown, append),
            Commands::Export { model, lang, out } => commands::export::run_export(ctx, model, lang, out),
            Commands::Template { model, lang, out_dir } => {
                commands::template::run_template(ctx, model, lang, out_dir)
            }
            Commands::Comments { model } => commands::admin::run_comments(ctx, model),
            Commands::Users => commands::admin::run_users(ctx),
            Commands::Index { model, url, dry_run } => commands::index::run_index(ctx, model, url, dry_run),
            Commands::Codegen { out_dir } => commands::codegen::run_codegen(ctx, out_dir),
            Commands::Init {
                data_dir,
                lang,
                index,
                dry_run,
                codegen,
            } => commands::init::run_init(ctx, data_dir, lang, index, dry_run, codegen),
            Commands::Schema { out_dir } => commands::schema::run_schema(ctx, out_dir.unwrap_or_default()),
            Commands::Collections => commands::admin::run_collections(ctx),
        };

        match &result {
            Ok(_) => info!(event = "command_finished", command = %cmd_name),
            Err(e) => error!(event = "command_failed", command = %cmd_name, error = ?e),
        }

        result
    }
}

fn init_tracing(quiet: bool) -> WorkerGuard {
    let file_appender = rolling::daily("logs", "datacat.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if quiet { "warn" } else { "info" };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _guard = init_tracing(cli.quiet);

    let use_color = !cli.no_color && std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    ui::set_color(use_color);

    let ctx = Context::load(cli.config.as_deref(), cli.store, cli.format)?;
    debug!(event = "context", store = %ctx.store_path().display(), data_dir = %ctx.data_dir().display());
    cli.cmd.run(&ctx)
}
