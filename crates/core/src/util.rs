/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took to evaluate, then returns its value.
/// Logs at [log::Level::Debug] unless another level is given.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

/// Convert a floating point position into a hashable key. Positions are only
/// ever compared for exact equality, so the raw bits are enough, except
/// that `-0.0` and `0.0` have to land on the same key.
pub fn position_key(position: [f32; 3]) -> [u32; 3] {
    // Adding positive zero turns -0.0 into 0.0 and leaves everything else
    position.map(|component| (component + 0.0).to_bits())
}
