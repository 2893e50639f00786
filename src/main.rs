use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use codelink::{config::Config, open, repo::RepoIndex, scheme};

#[derive(Parser)]
#[command(name = "codelink", about = "Open code links in your local editor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a codelink:// URL and launch the configured editor
    Open {
        /// URL like codelink://project/src/file.rs?line=10&column=3
        #[arg(value_name = "URL")]
        url: String,

        /// Print the synthesized command instead of running it
        #[arg(long)]
        print_command: bool,
    },

    /// Read URLs from stdin, one per line, forever
    Stream,

    /// Open the built-in demo file to verify the setup end to end
    Demo,

    /// Rebuild the repository index and persist it to the config file
    Scan,

    /// Manage codelink configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage the codelink:// URL scheme handler
    Scheme {
        #[command(subcommand)]
        action: SchemeAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write the default configuration to disk
    Init,
    /// Set a configuration value (e.g. editor vim:myserver)
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
}

#[derive(Subcommand)]
enum SchemeAction {
    /// Register the codelink:// URL scheme handler
    Install,
    /// Unregister the codelink:// URL scheme handler
    Uninstall,
    /// Check whether the URL scheme handler is registered
    Status,
}

const DEMO_FILE: &str = "demo.txt";
const DEMO_TEXT: &str = "\
Welcome to codelink!

If your editor opened on this line, the codelink:// handler works.
Share links like codelink://project/src/file.rs?line=10&column=3
and they will open in the editor configured in your config file.
";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codelink=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Open { url, print_command } => cmd_open(&url, print_command)?,
        Commands::Stream => cmd_stream()?,
        Commands::Demo => cmd_demo()?,
        Commands::Scan => cmd_scan()?,
        Commands::Config { action } => cmd_config(action)?,
        Commands::Scheme { action } => cmd_scheme(action)?,
    }

    Ok(())
}

/// Load the configuration and build the repository index, seeding it from the
/// persisted root list when present. The first scan's result is written back
/// so later invocations start instantly.
fn init() -> Result<(Config, RepoIndex)> {
    let mut config = Config::load()?;
    let home = dirs::home_dir().context("Could not determine home directory")?;

    let mut index = match &config.repositories {
        Some(roots) if !roots.is_empty() => RepoIndex::seeded(home, roots.clone()),
        _ => RepoIndex::new(home),
    };

    if config.repositories.is_none() {
        config.repositories = Some(index.get().to_vec());
    }
    if let Err(e) = config.save() {
        warn!("could not save config: {e:#}");
    }
    Ok((config, index))
}

fn cmd_open(url: &str, print_command: bool) -> Result<()> {
    let (config, mut index) = init()?;

    if print_command {
        let command = open::command_for_url(&config, &mut index, url)?;
        println!("{command}");
        return Ok(());
    }

    if let Err(e) = open::open_url(&config, &mut index, url) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_stream() -> Result<()> {
    let (config, mut index) = init()?;
    let stdin = std::io::stdin();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        // One bad URL must not take down the stream.
        if let Err(e) = open::open_url(&config, &mut index, url) {
            eprintln!("Error: {e:#}");
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    Ok(())
}

fn cmd_demo() -> Result<()> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let demo = dir.join(DEMO_FILE);
    if !demo.exists() {
        std::fs::write(&demo, DEMO_TEXT)
            .with_context(|| format!("Failed to write {}", demo.display()))?;
    }

    let url = format!(
        "codelink://{}/{DEMO_FILE}?line=3&column=5",
        codelink::repo::DEMO_HINT
    );
    eprintln!("Opening {url}");
    cmd_open(&url, false)
}

fn cmd_scan() -> Result<()> {
    let mut config = Config::load()?;
    let home = dirs::home_dir().context("Could not determine home directory")?;

    let mut index = RepoIndex::new(home);
    index.refresh();
    let roots = index.get().to_vec();
    println!("Indexed {} repositories", roots.len());

    config.repositories = Some(roots);
    config.save()?;
    Ok(())
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            let pretty = toml::to_string_pretty(&config)?;
            print!("{pretty}");
        }
        ConfigAction::Path => {
            let path = Config::path()?;
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let config = Config::default();
            config.save()?;
            println!("Wrote default config to {}", Config::path()?.display());
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set_value(&key, &value)?;
            config.save()?;
            println!("Set {key} = {value}");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get_value(&key)?);
        }
    }
    Ok(())
}

fn cmd_scheme(action: SchemeAction) -> Result<()> {
    match action {
        SchemeAction::Install => scheme::install()?,
        SchemeAction::Uninstall => scheme::uninstall()?,
        SchemeAction::Status => println!("{}", scheme::status()?),
    }
    Ok(())
}
