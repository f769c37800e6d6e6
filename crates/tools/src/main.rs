use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use standard_token_tools::{logging, EnvironmentInput, Manifest, ResolvedConfig};

#[derive(Parser)]
#[command(name = "standard-token")]
#[command(about = "Validate and resolve the deployment configuration for the token contracts")]
struct Cli {
    /// Manifest declaring networks and compilers
    /// (default: $DEPLOY_MANIFEST, ./deploy.toml, built-in)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Env file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration and print a summary
    Check,
    /// Resolve the configuration and write it for the deploy tool
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List declared networks without resolving them
    Networks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let env = EnvironmentInput::from_process(cli.env_file.as_deref())
        .context("failed to read environment")?;
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let (manifest, source) =
        Manifest::load(cli.manifest.as_deref(), &env, &cwd).context("failed to load manifest")?;

    match cli.command {
        Commands::Check => {
            let config = resolve(manifest, &env)?;
            println!("Manifest: {}", source);
            config.print_summary();
            Ok(())
        }
        Commands::Export { output } => {
            let config = resolve(manifest, &env)?;
            let json = config.to_tool_json()?;
            match output {
                Some(path) => std::fs::write(&path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Networks => {
            println!("Manifest: {}", source);
            for network in &manifest.networks {
                let accounts = if network.accounts { "mnemonic" } else { "none" };
                println!(
                    "  {:<20} chain {:<8} {}  accounts: {}",
                    network.name, network.chain_id, network.endpoint, accounts
                );
            }
            let versions: Vec<&str> =
                manifest.compilers.iter().map(|c| c.version.as_str()).collect();
            println!("  compilers: {}", versions.join(", "));
            Ok(())
        }
    }
}

fn resolve(manifest: Manifest, env: &EnvironmentInput) -> Result<ResolvedConfig> {
    manifest
        .into_resolver()
        .resolve(env)
        .context("configuration is invalid")
}
