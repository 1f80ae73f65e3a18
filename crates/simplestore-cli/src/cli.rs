use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "simplestore",
    about = "Simple idempotent RESTful PUT/GET/DELETE key/value store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./simplestore.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the store over HTTP until Ctrl-C
    Serve(ServeArgs),
    /// Print the file a key is stored in
    Resolve(ResolveArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Storage root directory
    #[arg(long)]
    pub root: Option<String>,
    /// Listen address, host:port
    #[arg(long)]
    pub bind: Option<String>,
    /// Mount prefix, e.g. /store
    #[arg(long)]
    pub base_path: Option<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    pub key: String,
    /// Storage root directory
    #[arg(long)]
    pub root: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["simplestore", "serve", "--root", "/data", "--bind", "0.0.0.0:8080"])
            .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.root, Some("/data".into()));
            assert_eq!(args.bind, Some("0.0.0.0:8080".into()));
            assert!(args.base_path.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["simplestore", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.root.is_none());
            assert!(args.bind.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_resolve() {
        let cli = Cli::try_parse_from(["simplestore", "resolve", "report.md", "--root", "/data"]).unwrap();
        if let Command::Resolve(args) = cli.command {
            assert_eq!(args.key, "report.md");
            assert_eq!(args.root, Some("/data".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["simplestore", "--verbose", "serve", "-c", "/etc/simplestore.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/simplestore.toml")));
    }

    #[test]
    fn subcommand_required() {
        assert!(Cli::try_parse_from(["simplestore"]).is_err());
    }
}
