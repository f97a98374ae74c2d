use std::sync::Arc;

use flagstate_lib::{CancellationToken, LatestFlagsSource, RefreshService};

/// Run the refresh loop in the background and print the snapshot status after
/// every interval until Ctrl-C.
pub async fn run_watch(service: Arc<RefreshService>) {
    let cancel = CancellationToken::new();
    let handle = Arc::clone(&service).spawn(cancel.clone());

    let mut ticker = tokio::time::interval(service.options().refresh_interval);
    // The first tick completes immediately, before the first fetch has landed.
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                println!("Shutting down...");
                break;
            }
            _ = ticker.tick() => print_status(&service),
        }
    }

    cancel.cancel();
    let _ = handle.await;
}

fn print_status(service: &RefreshService) {
    let latest = service.latest_flags();
    let last_refreshed = service
        .last_refreshed()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    match latest.flags() {
        Some(flags) => println!(
            "{} - {} features, {} flights, fingerprint {}, last refreshed {}",
            latest.status(),
            flags.features().len(),
            flags.flights().len(),
            flags.fingerprint(),
            last_refreshed
        ),
        None => println!("{} - last refreshed {}", latest.status(), last_refreshed),
    }
}
