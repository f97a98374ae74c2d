use std::io;
use std::sync::{Arc, Mutex};

use flagstate_lib::storage::MemoryStorage;
use flagstate_lib::{
    FeatureFlagClient, FeatureResult, FeatureStatus, FlagState, FlightClient, FlightResult,
    LatestFlagsResult, RefreshService, User,
};
use tracing::subscriber::DefaultGuard;
use tracing::Level;

/// Collects formatted events so tests can assert on them.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn capture_warnings() -> (Captured, DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::WARN)
        .finish();
    (captured, tracing::subscriber::set_default(subscriber))
}

fn ok(flags: FlagState) -> Arc<LatestFlagsResult> {
    Arc::new(LatestFlagsResult::Ok(Arc::new(flags)))
}

#[test]
fn test_warns_when_flags_not_ok() {
    let (logs, _guard) = capture_warnings();
    let client = FeatureFlagClient::new(Arc::new(LatestFlagsResult::Uninitialized));

    assert_eq!(client.evaluate("Foo"), FeatureResult::Unknown);

    let logs = logs.contents();
    assert!(logs.contains("WARN"));
    assert!(logs.contains("latest flags aren't ok"));
    assert!(logs.contains("status=Uninitialized"));
}

#[test]
fn test_warns_on_unknown_names() {
    let (logs, _guard) = capture_warnings();
    let flags = FlagState::builder().build().unwrap();

    let features = FeatureFlagClient::new(ok(flags.clone()));
    assert_eq!(features.evaluate("Foo"), FeatureResult::Unknown);
    let flights = FlightClient::new(ok(flags));
    assert_eq!(
        flights.evaluate("Bar", &User::new("Bob")),
        FlightResult::Unknown
    );

    let logs = logs.contents();
    assert!(logs.contains("status of feature as it isn't in the latest flags"));
    assert!(logs.contains("status of flight as it isn't in the latest flags"));
}

#[test]
fn test_warns_on_unrecognized_status() {
    let (logs, _guard) = capture_warnings();
    let flags = FlagState::builder()
        .with_feature("Foo", FeatureStatus::Unrecognized("Maybe".to_string()))
        .build()
        .unwrap();
    let client = FeatureFlagClient::new(ok(flags));

    assert_eq!(client.evaluate("Foo"), FeatureResult::Unknown);

    let logs = logs.contents();
    assert!(logs.contains("Unknown feature status"));
    assert!(logs.contains("status=Maybe"));
}

#[test]
fn test_known_feature_logs_nothing() {
    let (logs, _guard) = capture_warnings();
    let flags = FlagState::builder()
        .with_feature("Foo", FeatureStatus::Enabled)
        .build()
        .unwrap();

    assert_eq!(
        FeatureFlagClient::new(ok(flags)).evaluate("Foo"),
        FeatureResult::Enabled
    );
    assert_eq!(logs.contents(), "");
}

#[tokio::test]
async fn test_warns_on_failed_fetch() {
    let (logs, _guard) = capture_warnings();
    let storage = Arc::new(MemoryStorage::new());
    storage.fail_with("blob store offline").await;
    let service = RefreshService::builder().gateway(storage).build().unwrap();

    assert!(service.refresh_once().await.is_err());

    let logs = logs.contents();
    assert!(logs.contains("Failed to refresh feature flags"));
    assert!(logs.contains("source=memory"));
    assert!(logs.contains("blob store offline"));
}
