use clap::{Parser, Subcommand};
use discovery::{run_discovery, DiscoveryConfig, NoDescription};
use octane::{OctaneClient, OctaneConfig};
use std::path::PathBuf;
use tracing::info;

/// Environment pointer to the NUL-separated SCM diff artifact. Absent
/// means empty diff (full-scan-only behavior).
const MODIFIED_FILES_ENV: &str = "MODIFIED_FILES_PATH";

#[derive(Parser)]
#[command(name = "discovery")]
#[command(about = "Discovers UFT tests in a repository and syncs them to ALM Octane")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and reconcile it against the remote inventory
    Discover {
        /// Root of the checked-out repository
        #[arg(short, long)]
        path: PathBuf,
        /// Reconcile the full discovered set against all workspace tests
        #[arg(long)]
        full_scan: bool,
        /// Octane server URL
        #[arg(long)]
        server_url: String,
        /// Octane shared space id
        #[arg(long)]
        shared_space: String,
        /// Octane workspace id
        #[arg(long)]
        workspace: String,
        /// API client id
        #[arg(long)]
        client_id: String,
        /// API client secret
        #[arg(long)]
        client_secret: String,
        /// Source URL of the repository as registered in Octane
        #[arg(long)]
        repository_url: String,
        /// CI pipeline name, used to attach a test runner on creation
        #[arg(long)]
        pipeline: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Discover {
            path,
            full_scan,
            server_url,
            shared_space,
            workspace,
            client_id,
            client_secret,
            repository_url,
            pipeline,
        } => {
            let octane_config =
                OctaneConfig::new(server_url, shared_space, workspace, client_id, client_secret);
            let client = OctaneClient::new(octane_config)?;
            client.sign_in().await?;

            let diff_file = std::env::var(MODIFIED_FILES_ENV).ok().map(PathBuf::from);
            let config = DiscoveryConfig::new(path, repository_url)
                .with_full_scan(full_scan)
                .with_diff_file(diff_file)
                .with_pipeline_name(pipeline);

            let summary = run_discovery(&config, &client, &NoDescription).await?;
            info!(
                "Sync finished: {} test operations dispatched ({} failed, {} skipped), \
                 {} data table operations dispatched ({} failed, {} skipped)",
                summary.tests.dispatched,
                summary.tests.failed,
                summary.tests.skipped,
                summary.data_tables.dispatched,
                summary.data_tables.failed,
                summary.data_tables.skipped
            );
        }
    }

    Ok(())
}
