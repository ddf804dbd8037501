//! # ipget CLI Entry Point

use clap::Parser;
use ipget_gateway::ExportProtocol;
use tracing_subscriber::EnvFilter;

/// Fetch IPFS content from an HTTP gateway, verifying every block.
///
/// Exports the DAG for a CID (or IPFS path) as a CAR, checks each block's
/// bytes against its address, and writes the decoded file or directory
/// tree to the current directory.
#[derive(Parser, Debug)]
#[command(name = "ipget", version, about)]
struct Cli {
    /// CID or IPFS path to download, e.g. `bafy.../photos/cat.jpg`.
    ipfs_path: String,

    /// Gateway to fetch from (scheme optional; localhost gets http).
    #[arg(short, long, default_value = "http://127.0.0.1:5001")]
    gateway: String,

    /// Write the tree here instead of under the CID / path basename.
    #[arg(short, long)]
    output: Option<String>,

    /// Suppress progress output (errors still print).
    #[arg(short, long)]
    quiet: bool,

    /// Which export endpoint the gateway speaks.
    #[arg(long, value_enum, default_value_t = Protocol::Gateway)]
    protocol: Protocol,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum Protocol {
    /// GET /ipfs/<cid> with the CAR Accept header.
    Gateway,
    /// Legacy POST /api/v0/dag/export.
    Api,
}

impl From<Protocol> for ExportProtocol {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Gateway => ExportProtocol::Gateway,
            Protocol::Api => ExportProtocol::Api,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Quiet mode only raises the progress threshold; errors always print.
    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let options = ipget_cli::GetOptions {
        ipfs_path: cli.ipfs_path,
        gateway: cli.gateway,
        output: cli.output,
        protocol: cli.protocol.into(),
    };
    let summary = ipget_cli::ipfs_get(&options).await?;

    let n = summary.blocks_verified;
    println!("verified {n}/{n} block{}", if n == 1 { "" } else { "s" });
    println!("wrote {}", summary.output_path);
    Ok(())
}
