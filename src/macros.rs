/// Logs an `Err` through `tracing` and hands the result back untouched.
///
/// The second argument is the `ScraperConfig` whose webhook for the error's
/// kind, if any, receives the error as well.
#[macro_export]
macro_rules! handle_error {
    ($result:expr, $config:expr) => {{
        let result = $result;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "operation failed");
            e.report($config);
        }

        result
    }};
}
