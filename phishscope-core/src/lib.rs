pub mod dashboard;
pub mod domains;
pub mod format;
pub mod search;
pub mod shell;
pub mod task;

pub use dashboard::{DashboardView, StatisticsSource};
pub use domains::{DomainTable, PhishingDomain};
pub use search::{Completion, PageSize, SearchBackend, SearchRequest, SearchState, SearchView, SourceFilter};
pub use shell::{Page, Shell};
pub use task::{FirstRun, PeriodicTask};
