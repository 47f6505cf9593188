// Universal search view: query submission, source filters, per-type pagination

use phishscope_client::client::DEFAULT_SEARCH_LIMIT;
use phishscope_client::{ApiError, SearchResponse, SearchResult, SearchSources};
use std::future::Future;
use tracing::{debug, info, warn};

/// Page sizes offered by the results view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    Ten,
    #[default]
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty, PageSize::Hundred];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    pub fn from_usize(n: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == n)
    }

    /// Cycles 10 -> 20 -> 50 -> 100 -> 10
    pub fn next(self) -> Self {
        match self {
            PageSize::Ten => PageSize::Twenty,
            PageSize::Twenty => PageSize::Fifty,
            PageSize::Fifty => PageSize::Hundred,
            PageSize::Hundred => PageSize::Ten,
        }
    }
}

/// Slice of `items` shown on 1-indexed `page`. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Selected source identifiers. Empty means "search everything".
///
/// Identifiers are opaque: `ut1` (every UT1 category) and `ut1_<category>`
/// are distinct entries and both go to the backend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    selected: Vec<String>,
}

impl SourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `source`; returns whether it is now selected.
    pub fn toggle(&mut self, source: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| s == source) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(source.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn contains(&self, source: &str) -> bool {
        self.selected.iter().any(|s| s == source)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Comma-joined value for the `sources` query parameter, if any.
    pub fn to_param(&self) -> Option<String> {
        if self.selected.is_empty() {
            None
        } else {
            Some(self.selected.join(","))
        }
    }
}

/// A search the view wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
    pub sources: Vec<String>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchRequest {
    pub fn sources_param(&self) -> Option<String> {
        if self.sources.is_empty() {
            None
        } else {
            Some(self.sources.join(","))
        }
    }
}

/// Anything that can run a universal search.
pub trait SearchBackend: Send + Sync + 'static {
    fn search(&self, request: &SearchRequest) -> impl Future<Output = Result<SearchResponse, ApiError>> + Send;
}

impl SearchBackend for phishscope_client::ApiClient {
    fn search(&self, request: &SearchRequest) -> impl Future<Output = Result<SearchResponse, ApiError>> + Send {
        self.universal_search(&request.query, &request.sources, request.limit, request.offset)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading,
    Success(SearchResponse),
    Error(String),
}

/// What happened to a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer search was issued after this one; the outcome was dropped
    Stale,
}

/// Summary card for one result-type bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCard {
    pub result_type: String,
    pub label: String,
    pub count: usize,
}

/// One bucket as shown on the current page
#[derive(Debug, Clone)]
pub struct BucketPage<'a> {
    pub result_type: &'a str,
    pub label: String,
    pub total: usize,
    pub total_pages: usize,
    pub results: &'a [SearchResult],
    /// 1-indexed (first, last) positions shown, None when the page is empty
    pub showing: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatLevel {
    High,
    Medium,
    Low,
}

impl ThreatLevel {
    pub fn label(self) -> &'static str {
        match self {
            ThreatLevel::High => "High Risk",
            ThreatLevel::Medium => "Medium Risk",
            ThreatLevel::Low => "Low Risk",
        }
    }
}

pub fn threat_level(result: &SearchResult) -> ThreatLevel {
    if result.verified() == Some("yes") || result.source() == "phishtank" {
        ThreatLevel::High
    } else if result.source().starts_with("ut1_") {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

pub fn type_label(result_type: &str) -> String {
    match result_type {
        "phishing_url" => "Phishing URL".to_string(),
        "blacklist_url" => "Blacklist URL".to_string(),
        "ssl_certificate" => "SSL Certificate".to_string(),
        other => other.to_string(),
    }
}

/// Main line for a result row
pub fn headline(result: &SearchResult) -> &str {
    result
        .url()
        .or_else(|| result.subject_cn())
        .or_else(|| result.title())
        .unwrap_or("N/A")
}

/// The query part of a usage example URL (`/search/?q=x` -> `q=x`).
pub fn example_query(example: &str) -> &str {
    example.split('?').nth(1).unwrap_or(example)
}

/// Search view state.
#[derive(Debug, Clone)]
pub struct SearchView {
    query: String,
    filter: SourceFilter,
    state: SearchState,
    page_size: PageSize,
    current_page: usize,
    latest_generation: u64,
    sources: Option<SearchSources>,
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            filter: SourceFilter::new(),
            state: SearchState::Idle,
            page_size: PageSize::default(),
            current_page: 1,
            latest_generation: 0,
            sources: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut SourceFilter {
        &mut self.filter
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Loading)
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        match &self.state {
            SearchState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn available_sources(&self) -> Option<&SearchSources> {
        self.sources.as_ref()
    }

    pub fn set_available_sources(&mut self, sources: SearchSources) {
        self.sources = Some(sources);
    }

    /// Starts a search for the current query.
    ///
    /// Returns `None` without touching state when the query is blank.
    /// Otherwise the view enters `Loading`, resets to page 1, and returns the
    /// request to issue, tagged with a fresh generation number.
    pub fn submit(&mut self) -> Option<SearchRequest> {
        if self.query.trim().is_empty() {
            debug!("Ignoring blank search query");
            return None;
        }

        self.latest_generation += 1;
        self.state = SearchState::Loading;
        self.current_page = 1;

        let request = SearchRequest {
            generation: self.latest_generation,
            query: self.query.clone(),
            sources: self.filter.selected().to_vec(),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        };
        info!(
            "Search #{} for '{}' (sources: {})",
            request.generation,
            request.query,
            request.sources_param().as_deref().unwrap_or("all")
        );
        Some(request)
    }

    /// Applies the outcome of search `generation` unless a newer search has
    /// been issued since.
    pub fn complete(&mut self, generation: u64, outcome: Result<SearchResponse, ApiError>) -> Completion {
        if generation != self.latest_generation {
            debug!(
                "Dropping stale search #{} (latest is #{})",
                generation, self.latest_generation
            );
            return Completion::Stale;
        }

        self.state = match outcome {
            Ok(response) => SearchState::Success(response),
            Err(e) => {
                warn!("Search #{} failed: {}", generation, e);
                SearchState::Error(format!("Search failed. Please try again. ({})", e))
            }
        };
        Completion::Applied
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
        self.current_page = 1;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Page count of the largest bucket
    pub fn max_pages(&self) -> usize {
        self.response()
            .map(|r| {
                r.results_by_type
                    .iter()
                    .map(|(_, results)| total_pages(results.len(), self.page_size.get()))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    pub fn next_page(&mut self) {
        if self.current_page < self.max_pages() {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
        }
    }

    /// Every bucket sliced to the current page, in backend order.
    pub fn buckets(&self) -> Vec<BucketPage<'_>> {
        let Some(response) = self.response() else {
            return Vec::new();
        };
        let size = self.page_size.get();

        response
            .results_by_type
            .iter()
            .map(|(result_type, results)| {
                let page = paginate(results.as_slice(), self.current_page, size);
                BucketPage {
                    result_type,
                    label: type_label(result_type),
                    total: results.len(),
                    total_pages: total_pages(results.len(), size),
                    results: page,
                    showing: (!page.is_empty()).then(|| {
                        let first = (self.current_page - 1) * size + 1;
                        (first, first + page.len() - 1)
                    }),
                }
            })
            .collect()
    }

    pub fn category_cards(&self) -> Vec<CategoryCard> {
        self.response()
            .map(|response| {
                response
                    .results_by_type
                    .iter()
                    .map(|(result_type, results)| CategoryCard {
                        result_type: result_type.to_string(),
                        label: type_label(result_type),
                        count: results.len(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// "Found N results for "q" in M sources", using the backend's
    /// `total_found` rather than the number of results carried.
    pub fn summary_line(&self) -> Option<String> {
        self.response().map(|r| {
            format!(
                "Found {} results for \"{}\" in {} sources",
                r.total_found,
                r.query,
                r.sources_searched.len()
            )
        })
    }
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}
