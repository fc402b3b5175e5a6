// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

use ab_edge::assignment::Assignment;
use ab_edge::cli;
use ab_edge::config::EdgeConfig;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ab-edge",
    about = "AB Edge — sticky A/B variant assignment with streaming HTML rewriting",
    version,
    after_help = "Run 'ab-edge <command> --help' for details on each command."
)]
struct Cli {
    /// Output results and logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve edge requests over HTTP
    Serve {
        /// Address to listen on (default 127.0.0.1:8787, or AB_EDGE_LISTEN)
        #[arg(long)]
        listen: Option<SocketAddr>,
        /// Variant source endpoint (or AB_EDGE_VARIANTS_URL)
        #[arg(long)]
        variants_url: Option<String>,
        /// Seconds to reuse a fetched variant pair; 0 disables caching
        #[arg(long)]
        cache_ttl: Option<u64>,
        /// Upstream timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Retries when fetching the assigned variant
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Show which arm a Cookie header resolves to
    Assign {
        /// Raw Cookie header value, e.g. "user-group=group_one"
        #[arg(long)]
        cookie: Option<String>,
    },
    /// Rewrite a local HTML file for one arm
    Rewrite {
        /// HTML file to rewrite
        file: PathBuf,
        /// Arm to render (group_one or group_two)
        #[arg(long)]
        arm: Assignment,
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose, cli.json);

    let result = match cli.command {
        Commands::Serve {
            listen,
            variants_url,
            cache_ttl,
            timeout,
            max_retries,
        } => {
            let mut config = EdgeConfig::from_env();
            if let Some(listen) = listen {
                config.listen = listen;
            }
            if let Some(url) = variants_url {
                config.variants_url = url;
            }
            if let Some(ttl) = cache_ttl {
                config.cache_ttl_secs = ttl;
            }
            if let Some(ms) = timeout {
                config.timeout_ms = ms;
            }
            if let Some(retries) = max_retries {
                config.max_retries = retries;
            }
            cli::start::run(config).await
        }
        Commands::Assign { cookie } => cli::assign_cmd::run(cookie.as_deref(), cli.json),
        Commands::Rewrite { file, arm, output } => {
            cli::rewrite_cmd::run(&file, arm, output.as_deref())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ab-edge", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "error": true, "message": format!("{e:#}") })
            );
        } else {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
