//! `paddockctl capture`: raw datagrams to disk for later replay.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use paddock_wire::MAX_DATAGRAM_BYTES;
use serde::Serialize;
use tokio::net::UdpSocket;
use tracing::{trace, warn};

use crate::commands::CaptureArgs;
use crate::error::CliError;

/// Pause after a socket error before receiving again.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Serialize)]
struct CaptureSummary {
    listen: String,
    duration_seconds: u64,
    packets_captured: u64,
    bytes_written: u64,
    output: String,
}

/// File name for the `seq`-th datagram; zero-padded so name order is
/// arrival order.
pub fn datagram_file_name(seq: u64) -> String {
    format!("{seq:08}.bin")
}

pub async fn execute(args: &CaptureArgs, json: bool) -> Result<()> {
    if args.max_packets == Some(0) {
        return Err(CliError::InvalidConfiguration("--max-packets must be > 0".to_string()).into());
    }

    let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, args.port));
    let socket = UdpSocket::bind(bind_addr).await.with_context(|| {
        format!(
            "failed to bind UDP capture socket at {bind_addr} \
             (is another process using this port?)"
        )
    })?;
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create capture directory '{}'", args.out.display()))?;

    let start = Instant::now();
    let deadline = start + Duration::from_secs(args.duration.max(1));
    let mut packets_captured = 0u64;
    let mut bytes_written = 0u64;
    let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];

    while Instant::now() < deadline {
        if args.max_packets.is_some_and(|max| packets_captured >= max) {
            break;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout = remaining.min(Duration::from_millis(250));
        let Some(len) = recv_datagram(&socket, &mut buf, timeout).await else {
            continue;
        };

        let datagram = buf.get(..len).unwrap_or_default();
        write_datagram(&args.out, packets_captured, datagram)?;
        packets_captured = packets_captured.saturating_add(1);
        bytes_written = bytes_written.saturating_add(u64::try_from(len).unwrap_or(u64::MAX));
    }

    let summary = CaptureSummary {
        listen: bind_addr.to_string(),
        duration_seconds: args.duration,
        packets_captured,
        bytes_written,
        output: args.out.display().to_string(),
    };

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("Telemetry capture complete");
        println!("  listen: {}", summary.listen);
        println!("  duration_s: {}", summary.duration_seconds);
        println!("  packets: {}", summary.packets_captured);
        println!("  bytes_written: {}", summary.bytes_written);
        println!("  output: {}", summary.output);
    }

    Ok(())
}

/// One receive attempt. Socket errors are logged and followed by a short
/// backoff; like a timeout they yield `None` and capture carries on.
async fn recv_datagram(socket: &UdpSocket, buf: &mut [u8], timeout: Duration) -> Option<usize> {
    match tokio::time::timeout(timeout, socket.recv(buf)).await {
        Ok(Ok(len)) => Some(len),
        Ok(Err(error)) => {
            warn!(error = %error, "capture receive error");
            tokio::time::sleep(RECV_ERROR_BACKOFF).await;
            None
        }
        Err(_elapsed) => {
            trace!("capture receive timeout");
            None
        }
    }
}

fn write_datagram(dir: &Path, seq: u64, datagram: &[u8]) -> Result<()> {
    let path = dir.join(datagram_file_name(seq));
    std::fs::write(&path, datagram)
        .with_context(|| format!("failed to write datagram '{}'", path.display()))
}
