use crate::config::RetrySettings;
use crate::platform;
use std::io;
use std::thread::sleep;
use tracing::{debug, warn};

/// Runs `operation`, retrying transient IO errors with exponential backoff.
/// Non-transient errors are returned immediately.
pub fn with_retry<T, F>(operation_name: &str, settings: &RetrySettings, mut operation: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut attempts = 0;
    let mut backoff = settings.initial_backoff();

    loop {
        match operation() {
            Ok(value) => {
                if attempts > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempts);
                }
                return Ok(value);
            }
            Err(e) if platform::is_transient(&e) && attempts < settings.max_retries => {
                attempts += 1;
                warn!(
                    "{} attempt {}/{} failed: {}. Retrying in {:?}",
                    operation_name, attempts, settings.max_retries, e, backoff
                );
                sleep(backoff);
                backoff = (backoff * 2).min(settings.max_backoff());
            }
            Err(e) => return Err(e),
        }
    }
}
