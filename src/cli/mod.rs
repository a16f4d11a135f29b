pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::interval::parse_interval;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "trendswipe")]
#[command(about = "Trend image aggregator and swipe API", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/trendswipe/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for reading sources
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Snapshot lifetime (e.g., "6h", "30m", "1d")
        #[arg(short, long, value_parser = parse_interval)]
        refresh_interval: Option<u64>,

        /// Don't start a build until the first request
        #[arg(long)]
        no_warm: bool,
    },
    /// Run one build pass and print the result
    Build {
        /// Print the images as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the configured sources
    Sources,
}

impl Cli {
    /// Fold command line overrides into the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.fetch.workers = workers;
        }

        if let Commands::Serve {
            host,
            port,
            refresh_interval,
            no_warm,
        } = &self.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(secs) = refresh_interval {
                config.cache.refresh_interval = *secs;
            }
            if *no_warm {
                config.cache.warm_on_start = false;
            }
        }
    }
}
