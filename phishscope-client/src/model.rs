// Typed payloads returned by the PhishScope backend

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// Ordered maps
// ============================================================================

/// A JSON object decoded as an ordered list of entries.
///
/// The backend groups search results and UT1 categories into objects whose key
/// order is meaningful for display (and for tie-breaking in rankings), so the
/// entries are kept exactly as they appeared on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<Vec<(String, V)>> for OrderedMap<V> {
    fn from(entries: Vec<(String, V)>) -> Self {
        Self(entries)
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ============================================================================
// Search
// ============================================================================

/// Backend record ids are numeric for most feeds but free text for some.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhishingUrlHit {
    pub url: String,
    pub source: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlacklistUrlHit {
    pub url: String,
    pub source: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CertificateHit {
    /// The search endpoint names this column `title`
    #[serde(alias = "title")]
    pub subject_cn: String,
    pub source: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One matched record from a universal search.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "result_type", rename_all = "snake_case")]
pub enum SearchResult {
    PhishingUrl(PhishingUrlHit),
    BlacklistUrl(BlacklistUrlHit),
    SslCertificate(CertificateHit),
}

impl SearchResult {
    pub fn result_type(&self) -> &'static str {
        match self {
            SearchResult::PhishingUrl(_) => "phishing_url",
            SearchResult::BlacklistUrl(_) => "blacklist_url",
            SearchResult::SslCertificate(_) => "ssl_certificate",
        }
    }

    pub fn source(&self) -> &str {
        match self {
            SearchResult::PhishingUrl(hit) => &hit.source,
            SearchResult::BlacklistUrl(hit) => &hit.source,
            SearchResult::SslCertificate(hit) => &hit.source,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            SearchResult::PhishingUrl(hit) => &hit.created_at,
            SearchResult::BlacklistUrl(hit) => &hit.created_at,
            SearchResult::SslCertificate(hit) => &hit.created_at,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            SearchResult::PhishingUrl(hit) => Some(&hit.url),
            SearchResult::BlacklistUrl(hit) => Some(&hit.url),
            SearchResult::SslCertificate(_) => None,
        }
    }

    pub fn subject_cn(&self) -> Option<&str> {
        match self {
            SearchResult::SslCertificate(hit) => Some(&hit.subject_cn),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            SearchResult::PhishingUrl(hit) => hit.title.as_deref(),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            SearchResult::PhishingUrl(hit) => hit.target.as_deref(),
            _ => None,
        }
    }

    pub fn verified(&self) -> Option<&str> {
        match self {
            SearchResult::PhishingUrl(hit) => hit.verified.as_deref(),
            _ => None,
        }
    }

    pub fn domains(&self) -> Option<&str> {
        match self {
            SearchResult::SslCertificate(hit) => hit.domains.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub query: String,
    pub search_type: String,
    pub sources_searched: Vec<String>,
    pub total_found: u64,
    pub returned: u64,
    pub limit: u64,
    pub offset: u64,
    pub results_by_type: OrderedMap<Vec<SearchResult>>,
    pub all_results: Vec<SearchResult>,
}

impl SearchResponse {
    /// Number of results actually carried in the grouped buckets.
    pub fn bucketed_count(&self) -> usize {
        self.results_by_type.iter().map(|(_, results)| results.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchSources {
    pub main_sources: Vec<String>,
    pub ut1_categories: Vec<String>,
    pub search_capabilities: OrderedMap<String>,
    pub usage_examples: OrderedMap<String>,
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Ut1Statistics {
    pub total_ut1_urls: u64,
    pub categories_count: u64,
    pub categories: OrderedMap<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhishingSources {
    pub phishtank: u64,
    pub openphish: u64,
    pub phishing_army: u64,
    pub black_mirror: u64,
    pub phishunt: u64,
    pub phishstats: u64,
    pub ut1_blacklists: Ut1Statistics,
}

impl PhishingSources {
    /// Per-feed counts excluding the UT1 blacklists, in display order.
    pub fn primary(&self) -> [(&'static str, u64); 6] {
        [
            ("phishtank", self.phishtank),
            ("openphish", self.openphish),
            ("phishing_army", self.phishing_army),
            ("black_mirror", self.black_mirror),
            ("phishunt", self.phishunt),
            ("phishstats", self.phishstats),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PhishingData {
    pub total_phishing_urls: u64,
    pub recent_phishing_24h: u64,
    pub sources: PhishingSources,
}

/// Aggregate counters snapshot from `/stats/`.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_certificates: u64,
    pub recent_certificates_24h: u64,
    pub recent_certificates_7d: u64,
    pub updated_certificates: u64,
    pub certificates_with_domains: u64,
    pub unique_subject_cns: u64,
    pub total_domains: u64,
    pub avg_certificates_per_day: f64,
    pub latest_certificate_date: Option<String>,
    pub oldest_certificate_date: Option<String>,
    pub grand_total_intelligence: u64,
    pub phishing_data: PhishingData,
    pub database_status: String,
}

impl Statistics {
    pub fn is_database_connected(&self) -> bool {
        self.database_status == "connected"
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecentActivity {
    pub subject_cn: String,
    #[serde(default)]
    pub domains: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub was_updated: bool,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecentActivityResponse {
    pub recent_activity: Vec<RecentActivity>,
    pub count: u64,
}

// ============================================================================
// Certificates
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Certificate {
    pub id: i64,
    pub subject_cn: String,
    #[serde(default)]
    pub domains: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct PaginationInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CertificateListResponse {
    pub certificates: Vec<Certificate>,
    pub pagination: PaginationInfo,
}

/// Optional filters for `/certificates/`; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub has_domains: Option<bool>,
}

impl CertificateQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(has_domains) = self.has_domains {
            pairs.push(("has_domains", has_domains.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DomainMatch {
    pub subject_cn: String,
    #[serde(default)]
    pub domains: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DomainSearchResponse {
    pub query: String,
    pub results: Vec<DomainMatch>,
    pub count: u64,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ComponentHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ComponentHealth>,
    /// Anything else the endpoint reports
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Parses the timestamp formats the backend emits: RFC 3339, or a naive
/// ISO-8601 datetime which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phishing_hit_decodes() {
        let value = json!({
            "url": "http://paypa1.example/login",
            "id": 9001,
            "target": "PayPal",
            "verified": "yes",
            "created_at": "2024-01-20T14:30:00",
            "source": "phishtank",
            "result_type": "phishing_url"
        });
        let result: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.result_type(), "phishing_url");
        assert_eq!(result.url(), Some("http://paypa1.example/login"));
        assert_eq!(result.target(), Some("PayPal"));
        assert_eq!(result.verified(), Some("yes"));
        assert!(matches!(result, SearchResult::PhishingUrl(PhishingUrlHit { id: Some(RecordId::Number(9001)), .. })));
    }

    #[test]
    fn test_certificate_hit_accepts_title_column() {
        let value = json!({
            "title": "*.paypal.com",
            "domains": "paypal.com,www.paypal.com",
            "id": 7,
            "created_at": "2024-01-20T14:30:00Z",
            "updated_at": "2024-01-21T09:00:00Z",
            "source": "certificates",
            "result_type": "ssl_certificate"
        });
        let result: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.subject_cn(), Some("*.paypal.com"));
        assert_eq!(result.domains(), Some("paypal.com,www.paypal.com"));
        assert_eq!(result.url(), None);
    }

    #[test]
    fn test_extra_backend_columns_are_ignored() {
        let value = json!({
            "url": "http://bad.example",
            "id": "ps-1",
            "title": "Login",
            "country_name": "Nowhere",
            "score": 7.5,
            "host": "bad.example",
            "created_at": "2024-01-20T14:30:00",
            "source": "phishstats",
            "result_type": "phishing_url"
        });
        let result: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.title(), Some("Login"));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        // A blacklist hit without a URL is malformed
        let value = json!({
            "id": 1,
            "created_at": "2024-01-20T14:30:00",
            "source": "ut1_gambling",
            "result_type": "blacklist_url"
        });
        assert!(serde_json::from_value::<SearchResult>(value).is_err());

        // Unknown discriminator
        let value = json!({
            "url": "http://x.example",
            "created_at": "2024-01-20T14:30:00",
            "source": "mystery",
            "result_type": "carrier_pigeon"
        });
        assert!(serde_json::from_value::<SearchResult>(value).is_err());
    }

    #[test]
    fn test_ordered_map_preserves_wire_order() {
        let raw = r#"{"zeta": 1, "alpha": 2, "mid": 3}"#;
        let map: OrderedMap<u64> = serde_json::from_str(raw).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(map.get("alpha"), Some(&2));
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn test_statistics_tolerates_missing_fields() {
        let stats: Statistics = serde_json::from_value(json!({
            "total_certificates": 12,
            "database_status": "connected"
        }))
        .unwrap();
        assert_eq!(stats.total_certificates, 12);
        assert_eq!(stats.phishing_data.total_phishing_urls, 0);
        assert!(stats.is_database_connected());
    }

    #[test]
    fn test_certificate_query_pairs_skip_unset() {
        let query = CertificateQuery {
            page: Some(2),
            search: Some(String::new()),
            has_domains: Some(true),
            ..Default::default()
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "2".to_string()), ("has_domains", "true".to_string())]
        );
        assert!(CertificateQuery::default().to_query_pairs().is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-20T14:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-20T14:30:00.123456").is_some());
        assert!(parse_timestamp("2024-01-20 14:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
