mod api;
mod cart;
mod checkout;
mod cli;
mod config;
mod error;
mod listeners;
mod models;
mod session;
mod shop;
mod token;
mod views;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shopfront", about = "A terminal storefront client")]
pub struct Args {
    #[arg(short, long, help = "Run one command and exit (e.g. \"/cart\")")]
    pub command: Option<String>,

    #[arg(long, env = "SHOPFRONT_BACKEND_URL", help = "Backend root URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Where the session token is kept")]
    pub token_file: Option<PathBuf>,

    #[arg(long, help = "Verbose output (log requests and store changes)")]
    pub verbose: bool,

    #[arg(long, help = "Debug output (print HTTP details and settings)")]
    pub debug: bool,
}

fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shopfront={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(&args);

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    if let Some(path) = &args.token_file {
        cfg.session.token_path = Some(path.clone());
    }

    if let Err(errors) = cfg.validate() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  {}", e)).collect();
        anyhow::bail!("Invalid configuration:\n{}", lines.join("\n"));
    }

    let api_url = cfg.api_url(args.base_url.as_deref());
    let tokens = cfg.token_file();
    tracing::debug!(api_url = %api_url, token_file = %tokens.path().display(), "settings");

    let client = api::Client::new(&api_url, cfg.timeout());
    let backend_url = client.base_url().to_string();
    let shop = shop::Shop::new(Rc::new(client), tokens);

    let ctx = cli::Context {
        backend_url,
        shop: RefCell::new(shop),
        catalog: RefCell::new(Vec::new()),
        view: RefCell::new(views::View::Loading),
    };

    if let Some(command) = &args.command {
        cli::run_once(&ctx, command)
    } else {
        cli::run_repl(ctx)
    }
}
