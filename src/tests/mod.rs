//! In-memory doubles of the chain client and the chart, shared by unit
//! tests and by downstream crates enabling `test-utils`.

pub mod recorder;

/// Set `TEST_TRACING=true` to see logs of a failing test.
#[cfg(test)]
pub fn init_tests_logs() {
    if std::env::var("TEST_TRACING").unwrap_or_default() == "true" {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
