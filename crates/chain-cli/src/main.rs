use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chain-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct Node {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    node: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction to the pending pool
    Submit {
        #[command(flatten)]
        node: Node,
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount
        #[arg(long)]
        amount: f64,
    },
    /// Mine a block from the pending pool
    Mine {
        #[command(flatten)]
        node: Node,
    },
    /// Print the node's full chain
    Chain {
        #[command(flatten)]
        node: Node,
    },
    /// Register peer nodes
    Register {
        #[command(flatten)]
        node: Node,
        /// Peer base URLs (e.g. http://192.168.0.5:5000)
        #[arg(required = true)]
        peers: Vec<String>,
    },
    /// Ask the node to adopt the longest valid chain among its peers
    Resolve {
        #[command(flatten)]
        node: Node,
    },
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: f64,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let req = match cli.cmd {
        Command::Submit {
            node,
            sender,
            recipient,
            amount,
        } => {
            let tx = Tx {
                sender,
                recipient,
                amount,
            };
            client.post(endpoint(&node, "transaction/")).json(&tx)
        }
        Command::Mine { node } => client.post(endpoint(&node, "mine/")),
        Command::Chain { node } => client.get(endpoint(&node, "chain/")),
        Command::Register { node, peers } => client
            .post(endpoint(&node, "nodes/"))
            .json(&Nodes { nodes: peers }),
        Command::Resolve { node } => client.post(endpoint(&node, "resolve-conflicts/")),
    };

    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    println!("{}", pretty(&body));
    Ok(())
}

fn endpoint(node: &Node, path: &str) -> String {
    let url = format!("{}/{path}", node.node.trim_end_matches('/'));
    debug!(%url, "request");
    url
}

fn pretty(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| body.to_string())
}
