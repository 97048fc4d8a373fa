use tillpoint_shared::telemetry::get_subscriber;

#[test]
fn subscriber_builds_and_accepts_events() {
    // Scoped instead of global so other tests are unaffected
    let subscriber = get_subscriber("telemetry-test".to_string(), "debug", std::io::sink);
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("emitted inside scoped subscriber");
    });
}
