//! Command implementations for paddockctl

pub mod capture;
pub mod decode;
pub mod listen;
pub mod replay;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind (overrides config file and PADDOCK_BIND_ADDR)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// UDP port to bind (overrides --bind's port and PADDOCK_UDP_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// YAML listener config file
    #[arg(short, long, env = "PADDOCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration: Option<u64>,

    /// Only print laps confirmed by the session history packet
    #[arg(long)]
    pub no_provisional: bool,
}

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// Directory to write datagrams into (created if missing)
    #[arg(short, long)]
    pub out: PathBuf,

    /// UDP port to bind
    #[arg(short, long, default_value_t = paddock_listener::DEFAULT_PORT)]
    pub port: u16,

    /// Capture duration in seconds
    #[arg(short, long, default_value_t = 60)]
    pub duration: u64,

    /// Stop after this many datagrams
    #[arg(long)]
    pub max_packets: Option<u64>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding exactly one raw datagram
    pub file: PathBuf,

    /// Car index to decode per-car packets for (default: the header's player car)
    #[arg(long)]
    pub car: Option<u8>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Datagram files or capture directories; directory entries are replayed
    /// in file-name order
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only print laps confirmed by the session history packet
    #[arg(long)]
    pub no_provisional: bool,
}
