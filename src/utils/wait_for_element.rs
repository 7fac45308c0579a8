//! Element polling utility for SPA support
//!
//! Provides wait_for_selector() which polls for DOM elements with exponential backoff.
//! Only `browser_navigate` uses it, for its optional `wait_for_selector`
//! argument; element resolution itself never polls.

use std::time::Duration;

use tokio::time::Instant;

use crate::page::{BrowserPage, CandidateQuery, DriverError, DriverResult, ElementCandidate};

/// Wait for a selector to match at least one element, with exponential backoff
///
/// # Polling Strategy
/// - Starts at 100ms intervals
/// - Doubles each retry (exponential backoff)
/// - Caps at 1 second maximum interval
/// - Total duration limited by timeout parameter
///
/// Each query is bounded by the time left, so a hung page cannot outlast
/// `timeout`. An invalid selector fails immediately instead of waiting out
/// the timeout.
pub async fn wait_for_selector(
    page: &dyn BrowserPage,
    selector: &str,
    timeout: Duration,
) -> DriverResult<ElementCandidate> {
    let start = Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);
    let query = CandidateQuery::Css(selector.to_string());

    loop {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Err(DriverError::Timeout(timeout.as_millis()));
        }

        match tokio::time::timeout(remaining, page.query(&query)).await {
            Ok(Ok(candidates)) => {
                if let Some(first) = candidates.into_iter().next() {
                    return Ok(first);
                }
            }
            Ok(Err(err @ DriverError::InvalidSelector { .. })) => return Err(err),
            Ok(Err(err)) => tracing::debug!("Polling for '{}' failed: {}", selector, err),
            Err(_) => return Err(DriverError::Timeout(timeout.as_millis())),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(DriverError::Timeout(timeout.as_millis()));
        }

        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}
