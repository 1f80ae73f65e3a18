use std::path::PathBuf;

use colored::Colorize;
use simplestore_server::sources::{BASE_PATH_PARAM, BIND_PARAM, STORE_ROOT_PARAM};
use simplestore_server::{ConfigChain, EnvSource, MapSource, ServerConfig, TomlFileSource};
use simplestore_store::{KeyResolver, StoreRoot};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.config),
        Command::Resolve(args) => cmd_resolve(args, cli.config),
    }
}

/// Command line, then environment, then the config file.
pub fn config_chain(explicit: MapSource, config_file: Option<PathBuf>) -> anyhow::Result<ConfigChain> {
    let file = config_file.unwrap_or_else(TomlFileSource::default_path);
    Ok(ConfigChain::new()
        .with(explicit)
        .with(EnvSource)
        .with(TomlFileSource::load(&file)?))
}

fn cmd_serve(args: ServeArgs, config_file: Option<PathBuf>) -> anyhow::Result<()> {
    let explicit = MapSource::new("command line")
        .set_opt(STORE_ROOT_PARAM, args.root)
        .set_opt(BIND_PARAM, args.bind)
        .set_opt(BASE_PATH_PARAM, args.base_path);
    let chain = config_chain(explicit, config_file)?;
    let config = ServerConfig::from_sources(&chain)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let running = simplestore_server::start(config).await?;
        println!(
            "{} simplestore on {} (root: {})",
            "✓".green().bold(),
            format!("http://{}", running.local_addr()).bold(),
            running.root().path().display()
        );
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");
        running.stop().await?;
        anyhow::Ok(())
    })
}

fn cmd_resolve(args: ResolveArgs, config_file: Option<PathBuf>) -> anyhow::Result<()> {
    let explicit = MapSource::new("command line").set_opt(STORE_ROOT_PARAM, args.root);
    let chain = config_chain(explicit, config_file)?;
    let root_dir = chain.require(STORE_ROOT_PARAM)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let resolver = KeyResolver::new(StoreRoot::existing(&root_dir).await?);
        match resolver.resolve(&args.key).await {
            Ok(path) => {
                println!("{} {}", args.key.yellow(), path.display());
                anyhow::Ok(())
            }
            Err(e) => {
                println!("{} {}", "✗".red().bold(), e);
                Err(anyhow::Error::from(e))
            }
        }
    })
}
