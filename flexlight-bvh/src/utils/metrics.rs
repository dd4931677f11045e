#[cfg(feature = "metrics")]
use std::time::Instant;

/// Runs `f`, logging how long it took when the `metrics` feature is enabled.
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    #[cfg(feature = "metrics")]
    {
        let tt = Instant::now();
        let val = f();

        log::debug!(
            "{label}: {}",
            humantime::format_duration(tt.elapsed())
        );

        val
    }

    #[cfg(not(feature = "metrics"))]
    {
        _ = label;

        f()
    }
}
