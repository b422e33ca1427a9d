//! Command-line flags

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

/// Out-of-process resolution server for test configuration.
#[derive(Debug, Parser)]
#[command(name = "testbed-server", version, about)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8080 (port 0 picks a free port)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Token clients must send in the Access-Token header
    #[arg(long, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Where to write the discovery file clients read
    #[arg(long, value_name = "PATH")]
    pub discovery_file: Option<PathBuf>,
}

/// The flags that override configuration keys. Unset flags leave the lower
/// layers alone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    bind: Option<SocketAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
}

impl Cli {
    /// Configuration overrides carried by the flags.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind,
            access_token: self.access_token.clone(),
        }
    }
}
