//! Entry point for the Neo N3 blockchain node binary.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use neo_config::NetworkType;
use neo_core::UInt160;
use neo_ledger::Blockchain;
use neo_network::server::{NetworkServer, NetworkServerConfig};
use neo_network::P2PConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "neo-node", version, about = "Neo N3-compatible blockchain node")]
struct Cli {
    /// Network to join
    #[arg(long, value_enum, default_value = "test-net")]
    network: NetworkArg,

    /// Address to listen for peer connections on
    #[arg(long, default_value = "0.0.0.0:20333")]
    listen: SocketAddr,

    /// Directory used for persisted chain state
    #[arg(long, default_value = "./data")]
    data_dir: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum NetworkArg {
    MainNet,
    TestNet,
    Private,
}

impl From<NetworkArg> for NetworkType {
    fn from(value: NetworkArg) -> Self {
        match value {
            NetworkArg::MainNet => NetworkType::MainNet,
            NetworkArg::TestNet => NetworkType::TestNet,
            NetworkArg::Private => NetworkType::Private,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let network: NetworkType = cli.network.into();

    tracing::info!(%network, data_dir = %cli.data_dir, "starting node");

    let blockchain = Arc::new(Blockchain::new(network).await?);
    tracing::info!(height = blockchain.get_height().await, "chain loaded");

    let server_config = NetworkServerConfig {
        node_id: UInt160::zero(),
        magic: network.magic(),
        p2p_config: P2PConfig {
            listen_address: cli.listen,
            ..P2PConfig::default()
        },
        ..NetworkServerConfig::default()
    };
    let server = NetworkServer::new(server_config, blockchain)?;
    server.start().await?;
    tracing::info!(listen = %cli.listen, "network server started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping node");
    server.stop().await;

    Ok(())
}
