// Live phishing-domain table fed by a local simulator

use crate::task::{FirstRun, PeriodicTask};
use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub const SIMULATION_INTERVAL: Duration = Duration::from_secs(30);
/// Rows kept once simulated records start arriving
pub const MAX_ROWS: usize = 10;

const DOMAIN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatType {
    Phishing,
    Malware,
    Typosquat,
    Dga,
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThreatType::Phishing => "phishing",
            ThreatType::Malware => "malware",
            ThreatType::Typosquat => "typosquat",
            ThreatType::Dga => "dga",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatus {
    Active,
    Inactive,
    Investigating,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DomainStatus::Active => "active",
            DomainStatus::Inactive => "inactive",
            DomainStatus::Investigating => "investigating",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(confidence: u8) -> Self {
        match confidence {
            90.. => ConfidenceBand::High,
            75..=89 => ConfidenceBand::Medium,
            _ => ConfidenceBand::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhishingDomain {
    pub id: String,
    pub domain: String,
    pub first_seen: DateTime<Utc>,
    pub source: String,
    pub threat_type: ThreatType,
    /// 0-100
    pub confidence: u8,
    pub target_brand: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub status: DomainStatus,
}

impl PhishingDomain {
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }

    fn matches(&self, needle_lower: &str) -> bool {
        self.domain.to_lowercase().contains(needle_lower)
            || self
                .target_brand
                .as_deref()
                .is_some_and(|brand| brand.to_lowercase().contains(needle_lower))
    }
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    domain: &str,
    (day, hour, minute): (u32, u32, u32),
    source: &str,
    threat_type: ThreatType,
    confidence: u8,
    target_brand: Option<&str>,
    ip_address: &str,
    country: &str,
    status: DomainStatus,
) -> PhishingDomain {
    PhishingDomain {
        id: id.to_string(),
        domain: domain.to_string(),
        first_seen: Utc
            .with_ymd_and_hms(2024, 1, day, hour, minute, 0)
            .single()
            .unwrap_or_default(),
        source: source.to_string(),
        threat_type,
        confidence,
        target_brand: target_brand.map(str::to_string),
        ip_address: Some(ip_address.to_string()),
        country: Some(country.to_string()),
        status,
    }
}

/// The five example records the table starts with.
pub fn seed_domains() -> Vec<PhishingDomain> {
    vec![
        seed(
            "1",
            "payp4l-secure-login.com",
            (20, 14, 30),
            "PhishTank",
            ThreatType::Phishing,
            95,
            Some("PayPal"),
            "192.168.1.100",
            "RU",
            DomainStatus::Active,
        ),
        seed(
            "2",
            "microsoft-security-update.net",
            (20, 13, 15),
            "URLhaus",
            ThreatType::Malware,
            88,
            Some("Microsoft"),
            "203.0.113.5",
            "CN",
            DomainStatus::Active,
        ),
        seed(
            "3",
            "amaz0n-prime-renewal.org",
            (20, 12, 45),
            "OpenPhish",
            ThreatType::Phishing,
            92,
            Some("Amazon"),
            "198.51.100.25",
            "US",
            DomainStatus::Investigating,
        ),
        seed(
            "4",
            "g00gle-verify-account.com",
            (20, 11, 20),
            "PhishStats",
            ThreatType::Typosquat,
            85,
            Some("Google"),
            "203.0.113.15",
            "BR",
            DomainStatus::Active,
        ),
        seed(
            "5",
            "xvbnmklpoiuytrewq.tk",
            (20, 10, 0),
            "DGArchive",
            ThreatType::Dga,
            76,
            None,
            "192.0.2.50",
            "Unknown",
            DomainStatus::Inactive,
        ),
    ]
}

/// A simulated fresh detection: random five-character `.com` domain reported
/// by PhishTank with confidence 70-99.
pub fn synthesize_domain<R: Rng>(rng: &mut R) -> PhishingDomain {
    let name: String = (0..5)
        .map(|_| DOMAIN_CHARSET[rng.random_range(0..DOMAIN_CHARSET.len())] as char)
        .collect();

    PhishingDomain {
        id: Uuid::new_v4().to_string(),
        domain: format!("{}.com", name),
        first_seen: Utc::now(),
        source: "PhishTank".to_string(),
        threat_type: ThreatType::Phishing,
        confidence: rng.random_range(70..=99),
        target_brand: None,
        ip_address: Some(format!(
            "{}.{}.{}.{}",
            rng.random_range(1..=223u8),
            rng.random::<u8>(),
            rng.random::<u8>(),
            rng.random_range(1..=254u8)
        )),
        country: None,
        status: DomainStatus::Active,
    }
}

pub type DomainCallback = Arc<dyn Fn(PhishingDomain) + Send + Sync>;

/// Delivers one synthesized record every `period`, first one after a full
/// period, until the returned task is torn down.
pub fn start_simulator(period: Duration, on_domain: DomainCallback) -> PeriodicTask {
    PeriodicTask::spawn("domain-simulator", period, FirstRun::AfterPeriod, move || {
        let domain = synthesize_domain(&mut rand::rng());
        debug!("Simulated detection {}", domain.domain);
        on_domain(domain);
        std::future::ready(())
    })
}

/// Table of recent detections with a text filter
#[derive(Debug, Clone)]
pub struct DomainTable {
    rows: Vec<PhishingDomain>,
    filter: String,
}

impl DomainTable {
    pub fn new() -> Self {
        Self {
            rows: seed_domains(),
            filter: String::new(),
        }
    }

    pub fn rows(&self) -> &[PhishingDomain] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prepends `domain`, keeping only the most recent rows.
    pub fn insert(&mut self, domain: PhishingDomain) {
        self.rows.insert(0, domain);
        self.rows.truncate(MAX_ROWS);
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter.push(c);
    }

    pub fn pop_filter_char(&mut self) {
        self.filter.pop();
    }

    /// Rows whose domain or target brand contains the filter text,
    /// ignoring case. The type selector is fixed to "all".
    pub fn visible(&self) -> Vec<&PhishingDomain> {
        let needle = self.filter.trim().to_lowercase();
        self.rows.iter().filter(|row| row.matches(&needle)).collect()
    }
}

impl Default for DomainTable {
    fn default() -> Self {
        Self::new()
    }
}
