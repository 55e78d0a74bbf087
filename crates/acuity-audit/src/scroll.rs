//! Page preparation: bounded auto-scroll to force lazy-loaded content.

use acuity_browser::{BrowserError, ScanPage};
use acuity_core::config::ScrollConfig;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Slack when deciding the viewport has reached the document bottom.
const BOTTOM_SLACK_PX: f64 = 50.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrollMetrics {
    offset: f64,
    scroll_height: f64,
    inner_height: f64,
}

/// Scroll through the page so lazy-loaded elements enter the DOM, then
/// return to the top.
///
/// Never fails the caller: a page that breaks scrolling is still worth
/// auditing, so internal errors are logged and swallowed.
pub async fn scroll_through_page(page: &ScanPage, config: &ScrollConfig) {
    if let Err(e) = run(page, config).await {
        tracing::warn!("auto-scroll failed, continuing without it: {}", e);
    }
}

/// Bounded scroll loop.
///
/// Each step scrolls down by a fixed amount and samples the new offset.
/// The loop stops when the offset stops moving for several consecutive
/// steps, when the viewport reaches the document bottom, or when the
/// wall-clock cap elapses, whichever comes first.
async fn run(page: &ScanPage, config: &ScrollConfig) -> Result<(), BrowserError> {
    // A page with no scrollable overflow needs no preparation. On probe
    // error, assume it is scrollable and let the loop find out.
    let scrollable: bool = page
        .evaluate("document.body.scrollHeight > window.innerHeight")
        .await
        .unwrap_or(true);

    if !scrollable {
        tracing::debug!("page has no scrollable overflow, skipping auto-scroll");
        return Ok(());
    }

    let step_expression = format!(
        "(() => {{ \
           window.scrollBy(0, {step}); \
           const doc = document.documentElement; \
           return {{ \
             offset: doc.scrollTop || document.body.scrollTop || 0, \
             scrollHeight: Math.max(document.body.scrollHeight, doc.scrollHeight), \
             innerHeight: window.innerHeight \
           }}; \
         }})()",
        step = config.step_px
    );

    let wall_clock = Duration::from_millis(config.wall_clock_ms);
    let started = Instant::now();
    let mut last_offset = 0.0_f64;
    let mut stuck_count = 0_u32;

    loop {
        if started.elapsed() >= wall_clock {
            tracing::debug!("auto-scroll wall-clock cap reached");
            break;
        }

        let metrics: ScrollMetrics = page.evaluate(step_expression.clone()).await?;

        if (metrics.offset - last_offset).abs() < config.stuck_threshold_px {
            stuck_count += 1;
            if stuck_count >= config.max_stuck {
                tracing::debug!("scroll offset stopped moving, ending auto-scroll");
                break;
            }
        } else {
            stuck_count = 0;
        }
        last_offset = metrics.offset;

        if metrics.offset + metrics.inner_height >= metrics.scroll_height - BOTTOM_SLACK_PX {
            tracing::debug!("reached document bottom");
            break;
        }

        tokio::time::sleep(Duration::from_millis(config.interval_ms)).await;
    }

    // Give lazy-load fetches triggered by the scrolling a moment to land.
    tokio::time::sleep(Duration::from_millis(config.post_scroll_pause_ms)).await;

    page.execute("window.scrollTo(0, 0)").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_bound_exceeds_stuck_window() {
        // The wall-clock cap must leave room for the stuck detector to
        // trigger; otherwise stuck detection is dead code.
        let config = ScrollConfig::default();
        let stuck_window_ms = config.interval_ms * u64::from(config.max_stuck);
        assert!(config.wall_clock_ms > stuck_window_ms);
    }

    #[test]
    fn test_metrics_deserialize_from_page_shape() {
        let json = r#"{"offset": 300.0, "scrollHeight": 5000, "innerHeight": 1080}"#;
        let metrics: ScrollMetrics = serde_json::from_str(json).expect("metrics JSON");
        assert!((metrics.offset - 300.0).abs() < f64::EPSILON);
        assert!((metrics.scroll_height - 5000.0).abs() < f64::EPSILON);
        assert!((metrics.inner_height - 1080.0).abs() < f64::EPSILON);
    }
}
