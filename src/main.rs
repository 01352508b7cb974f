use anyhow::Result;
use clap::{ArgGroup, Parser};
use codesandbox_deploy::{files, CodeSandboxClient, DeployConfig, DeploymentResult, SandboxDeployer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Deploy a project to CodeSandbox and print its preview URL.
///
/// The API token is read from `CODESANDBOX_API_TOKEN` when set.
#[derive(Parser, Debug)]
#[command(name = "codesandbox-deploy", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["dir", "manifest"])))]
struct Cli {
    /// Project directory to upload
    #[arg(long)]
    dir: Option<PathBuf>,

    /// JSON file mapping paths to `{"content": …}` entries
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Sandbox title (default: "<prefix> – <timestamp>")
    #[arg(long)]
    title: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<DeploymentResult> {
    let mut config = DeployConfig::load(cli.config.as_deref())?;
    if let Some(secs) = cli.timeout {
        anyhow::ensure!(secs > 0, "--timeout must be greater than 0");
        config.timeout_secs = secs;
    }
    if config.api_token.is_none() {
        tracing::info!("CODESANDBOX_API_TOKEN not set; deploying anonymously");
    }

    let files = match (&cli.dir, &cli.manifest) {
        (Some(dir), _) => files::collect_dir(dir)?,
        (None, Some(manifest)) => files::load_manifest(manifest)?,
        (None, None) => anyhow::bail!("either --dir or --manifest is required"),
    };
    anyhow::ensure!(!files.is_empty(), "No files to deploy");
    tracing::info!("Deploying {} files to {}", files.len(), config.api_url);

    let client = CodeSandboxClient::new(config)?;
    Ok(client.deploy(&files, cli.title.as_deref()).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(DeploymentResult::Success(deployment)) => {
            tracing::info!("Sandbox {} created", deployment.sandbox_id);
            println!("Title:   {}", deployment.title);
            println!("Preview: {}", deployment.preview_url);
            println!("Embed:   {}", deployment.embed_url);
            ExitCode::SUCCESS
        }
        Ok(DeploymentResult::Failure(e)) => {
            tracing::warn!("Deployment failed: {e}");
            eprintln!("Deployment failed: {e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn requires_a_source() {
        assert!(Cli::try_parse_from(["codesandbox-deploy"]).is_err());
    }

    #[test]
    fn rejects_both_sources() {
        let parsed = Cli::try_parse_from([
            "codesandbox-deploy",
            "--dir",
            "app",
            "--manifest",
            "files.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_dir_and_title() {
        let cli =
            Cli::try_parse_from(["codesandbox-deploy", "--dir", "app", "--title", "Demo"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("app")));
        assert_eq!(cli.title.as_deref(), Some("Demo"));
    }
}
