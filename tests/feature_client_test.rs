use std::sync::Arc;

use flagstate_lib::{
    FeatureFlagClient, FeatureResult, FeatureStatus, FlagState, LatestFlagsResult,
};

fn flags() -> Arc<FlagState> {
    Arc::new(
        FlagState::builder()
            .with_feature("Foo", FeatureStatus::Enabled)
            .with_feature("Bar", FeatureStatus::Disabled)
            .build()
            .unwrap(),
    )
}

fn client(result: LatestFlagsResult) -> FeatureFlagClient {
    FeatureFlagClient::new(Arc::new(result))
}

#[test]
fn test_uninitialized_is_unknown() {
    let client = client(LatestFlagsResult::Uninitialized);
    assert_eq!(client.evaluate("Foo"), FeatureResult::Unknown);
    assert_eq!(client.evaluate("anything"), FeatureResult::Unknown);
}

#[test]
fn test_stale_is_unknown_even_when_present() {
    let client = client(LatestFlagsResult::Stale(flags()));
    assert_eq!(client.evaluate("Foo"), FeatureResult::Unknown);
    assert_eq!(client.evaluate("Bar"), FeatureResult::Unknown);
}

#[test]
fn test_absent_feature_is_unknown() {
    let client = client(LatestFlagsResult::Ok(flags()));
    assert_eq!(client.evaluate("Baz"), FeatureResult::Unknown);
    assert_eq!(client.evaluate("foo"), FeatureResult::Unknown);
}

#[test]
fn test_enabled_and_disabled() {
    let client = client(LatestFlagsResult::Ok(flags()));
    assert_eq!(client.evaluate("Foo"), FeatureResult::Enabled);
    assert_eq!(client.evaluate("Bar"), FeatureResult::Disabled);
}

#[test]
fn test_is_enabled_follows_evaluate() {
    let results = [
        LatestFlagsResult::Uninitialized,
        LatestFlagsResult::Stale(flags()),
        LatestFlagsResult::Ok(flags()),
    ];
    for result in results {
        let client = client(result);
        for name in ["Foo", "Bar", "Baz"] {
            for default in [false, true] {
                let expected = match client.evaluate(name) {
                    FeatureResult::Enabled => true,
                    FeatureResult::Disabled => false,
                    FeatureResult::Unknown => default,
                };
                assert_eq!(client.is_enabled(name, default), expected, "{name} {default}");
            }
        }
    }
}

#[test]
fn test_is_enabled_defaults() {
    for default in [false, true] {
        assert_eq!(
            client(LatestFlagsResult::Uninitialized).is_enabled("Foo", default),
            default
        );
        assert_eq!(
            client(LatestFlagsResult::Stale(flags())).is_enabled("Foo", default),
            default
        );
        assert_eq!(
            client(LatestFlagsResult::Ok(flags())).is_enabled("Baz", default),
            default
        );
        assert!(client(LatestFlagsResult::Ok(flags())).is_enabled("Foo", default));
        assert!(!client(LatestFlagsResult::Ok(flags())).is_enabled("Bar", default));
    }
}
