// Statistics dashboard: polling lifecycle and derived display values

use crate::format::{format_date, format_magnitude, top_categories};
use crate::task::{FirstRun, PeriodicTask};
use chrono::{DateTime, Local};
use phishscope_client::{ApiClient, ApiError, Statistics};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);
/// Categories shown in the compact UT1 panel
pub const TOP_CATEGORIES_SUMMARY: usize = 10;
/// Categories shown in the detailed UT1 panel
pub const TOP_CATEGORIES_DETAIL: usize = 15;

/// Anything that can produce a statistics snapshot.
pub trait StatisticsSource: Send + Sync + 'static {
    fn fetch_statistics(&self) -> impl Future<Output = Result<Statistics, ApiError>> + Send;
}

impl StatisticsSource for ApiClient {
    fn fetch_statistics(&self) -> impl Future<Output = Result<Statistics, ApiError>> + Send {
        self.get_statistics()
    }
}

/// Callback receiving each poll outcome
pub type StatsCallback = Arc<dyn Fn(Result<Statistics, ApiError>) + Send + Sync>;

/// Fetches once immediately and then every `period` until the returned task
/// is torn down.
pub fn start_polling<S: StatisticsSource>(
    source: Arc<S>,
    period: Duration,
    on_result: StatsCallback,
) -> PeriodicTask {
    PeriodicTask::spawn("statistics-poll", period, FirstRun::Immediately, move || {
        let source = source.clone();
        let on_result = on_result.clone();
        async move {
            let outcome = source.fetch_statistics().await;
            on_result(outcome);
        }
    })
}

/// A headline counter card
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
    pub caption: &'static str,
}

/// Dashboard state. Holds only the latest snapshot; everything shown is
/// derived from it on demand.
#[derive(Debug, Clone)]
pub struct DashboardView {
    snapshot: Option<Statistics>,
    error: Option<String>,
    last_updated: Option<DateTime<Local>>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            error: None,
            last_updated: None,
        }
    }

    /// True until the first outcome (success or failure) arrives.
    pub fn is_loading(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn apply(&mut self, outcome: Result<Statistics, ApiError>) {
        match outcome {
            Ok(stats) => {
                info!(
                    "Statistics refreshed: {} certificates, {} phishing URLs",
                    stats.total_certificates, stats.phishing_data.total_phishing_urls
                );
                self.snapshot = Some(stats);
                self.error = None;
            }
            Err(e) => {
                warn!("Statistics refresh failed: {}", e);
                self.snapshot = Some(fallback_statistics());
                self.error = Some(format!("Failed to load statistics: {}", e));
            }
        }
        self.last_updated = Some(Local::now());
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn database_label(&self) -> String {
        match &self.snapshot {
            Some(stats) if !stats.database_status.is_empty() => format!("Database {}", stats.database_status),
            _ => "Database Unknown".to_string(),
        }
    }

    pub fn is_database_connected(&self) -> bool {
        self.snapshot.as_ref().is_some_and(Statistics::is_database_connected)
    }

    pub fn grand_total(&self) -> String {
        format_magnitude(self.stats().grand_total_intelligence)
    }

    pub fn certificate_metrics(&self) -> Vec<Metric> {
        let stats = self.stats();
        vec![
            Metric {
                label: "Total Certificates",
                value: format_magnitude(stats.total_certificates),
                caption: "Active monitoring",
            },
            Metric {
                label: "New (24h)",
                value: format_magnitude(stats.recent_certificates_24h),
                caption: "Fresh discoveries",
            },
            Metric {
                label: "With Domains",
                value: format_magnitude(stats.certificates_with_domains),
                caption: "Domain coverage",
            },
            Metric {
                label: "Daily Average",
                value: format_magnitude(stats.avg_certificates_per_day.max(0.0).round() as u64),
                caption: "Processing rate",
            },
        ]
    }

    pub fn phishing_metrics(&self) -> Vec<Metric> {
        let phishing = &self.stats().phishing_data;
        vec![
            Metric {
                label: "Total Phishing URLs",
                value: format_magnitude(phishing.total_phishing_urls),
                caption: "Identified threats",
            },
            Metric {
                label: "New (24h)",
                value: format_magnitude(phishing.recent_phishing_24h),
                caption: "Recent threats",
            },
        ]
    }

    /// (latest, oldest) certificate dates
    pub fn certificate_dates(&self) -> (String, String) {
        let stats = self.stats();
        (
            format_date(stats.latest_certificate_date.as_deref()),
            format_date(stats.oldest_certificate_date.as_deref()),
        )
    }

    /// Per-feed counts, UT1 excluded
    pub fn primary_sources(&self) -> Vec<(&'static str, String)> {
        self.stats()
            .phishing_data
            .sources
            .primary()
            .iter()
            .map(|(name, count)| (*name, format_magnitude(*count)))
            .collect()
    }

    pub fn ut1_total(&self) -> String {
        format_magnitude(self.stats().phishing_data.sources.ut1_blacklists.total_ut1_urls)
    }

    pub fn top_ut1_categories(&self, limit: usize) -> Vec<(String, String)> {
        top_categories(&self.stats().phishing_data.sources.ut1_blacklists.categories, limit)
            .into_iter()
            .map(|(name, count)| (name.to_string(), format_magnitude(count)))
            .collect()
    }

    fn stats(&self) -> &Statistics {
        static EMPTY: std::sync::OnceLock<Statistics> = std::sync::OnceLock::new();
        self.snapshot
            .as_ref()
            .unwrap_or_else(|| EMPTY.get_or_init(fallback_statistics))
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-valued snapshot shown when the backend cannot be reached.
pub fn fallback_statistics() -> Statistics {
    Statistics {
        database_status: "error".to_string(),
        ..Statistics::default()
    }
}
