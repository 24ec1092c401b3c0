//! `paddockctl listen`: live lap records from the UDP stream.

use std::time::Duration;

use anyhow::Result;
use paddock_listener::{ListenerConfig, TelemetryListener};
use tracing::info;

use crate::commands::ListenArgs;
use crate::error::CliError;
use crate::output;

/// Defaults, then the config file, then `PADDOCK_*` env, then flags.
pub fn resolve_config(args: &ListenArgs) -> Result<ListenerConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ListenerConfig::load(path)?,
        None => ListenerConfig::default(),
    }
    .apply_env();

    if let Some(bind) = args.bind {
        config = config.with_bind_addr(bind);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    if args.no_provisional {
        config.tracker.provisional_laps = false;
    }
    config.validate()?;
    Ok(config)
}

pub async fn execute(args: &ListenArgs, json: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let mut handle = TelemetryListener::new(config)
        .start()
        .await
        .map_err(CliError::from)?;
    // Lap records also arrive as events; only the event channel is drained.
    handle.laps().close();

    let local_addr = handle.local_addr();
    info!(%local_addr, "Listening for F1 22 telemetry");
    if !json {
        output::print_success(&format!("Listening on {local_addr} (Ctrl-C to stop)"), false);
    }

    let stop_after = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(stop_after);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = handle.events().recv() => match event {
                Some(event) => output::print_event(&event, json),
                None => break,
            },
            result = &mut ctrl_c => {
                result?;
                info!("Interrupted");
                break;
            }
            () = &mut stop_after => break,
        }
    }

    let tracker = handle.shutdown().await.map_err(CliError::from)?;
    output::print_summary(&tracker.summary(), &tracker.stats(), json);
    Ok(())
}
