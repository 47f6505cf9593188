use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use phishscope_client::client::{DEFAULT_DOMAIN_LIMIT, DEFAULT_RECENT_LIMIT, DEFAULT_SEARCH_LIMIT};
use phishscope_client::model::{
    Certificate, CertificateListResponse, CertificateQuery, DomainSearchResponse, HealthStatus,
    RecentActivityResponse,
};
use phishscope_client::{ApiClient, ClientConfig, SearchSources};
use phishscope_core::dashboard::{self, DashboardView, POLL_INTERVAL, TOP_CATEGORIES_SUMMARY};
use phishscope_core::format::{format_short_timestamp, format_thousands, truncate};
use phishscope_core::search::{
    PageSize, SearchBackend, SearchState, SearchView, ThreatLevel, example_query, headline, threat_level,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Recent certificates shown under the one-shot statistics view
const STATS_RECENT_LIMIT: u32 = 5;

// Setup helpers

/// Client configuration: environment first, then `--api-url` / `--timeout`.
pub fn build_config(args: &ArgMatches) -> Result<ClientConfig, String> {
    let mut config = ClientConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(url) = args.get_one::<Url>("api-url") {
        config = config.with_base_url(url.as_str()).map_err(|e| e.to_string())?;
    }
    if let Some(ms) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_millis(*ms));
    }
    debug!("Using API at {} (timeout {:?})", config.base_url(), config.timeout());
    Ok(config)
}

pub fn build_client(args: &ArgMatches) -> Result<ApiClient, String> {
    ApiClient::new(build_config(args)?).map_err(|e| e.to_string())
}

/// Splits a comma-separated source list, dropping blanks and repeats.
pub fn parse_sources(raw: Option<&str>) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for source in raw.unwrap_or_default().split(',').map(str::trim) {
        if !source.is_empty() && !sources.iter().any(|s| s == source) {
            sources.push(source.to_string());
        }
    }
    sources
}

pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.into());
    spinner
}

fn divider() -> String {
    "═".repeat(60).bright_blue().bold().to_string()
}

fn heading(title: &str) -> Vec<String> {
    vec![divider(), format!("  {}", title.bright_white().bold()), divider()]
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode JSON: {}", e))
}

// Rendering

pub fn render_statistics(view: &DashboardView) -> Vec<String> {
    let mut lines = heading("THREAT INTELLIGENCE DASHBOARD");

    let db = if view.is_database_connected() {
        format!("● {}", view.database_label()).green().to_string()
    } else {
        format!("● {}", view.database_label()).red().to_string()
    };
    lines.push(db);
    if let Some(error) = view.error() {
        lines.push(format!("{} {}", "✗".red().bold(), error.red()));
    }
    lines.push(format!(
        "{} {}",
        "Total intelligence:".bright_white(),
        view.grand_total().yellow().bold()
    ));
    lines.push(String::new());

    lines.push("SSL CERTIFICATES".bright_blue().bold().to_string());
    for metric in view.certificate_metrics() {
        lines.push(format!(
            "  {:<20} {:>10}  {}",
            metric.label,
            metric.value.bright_white().bold(),
            metric.caption.dimmed()
        ));
    }
    let (latest, oldest) = view.certificate_dates();
    lines.push(format!("  {:<20} {}", "Latest", latest));
    lines.push(format!("  {:<20} {}", "Oldest", oldest));
    lines.push(String::new());

    lines.push("PHISHING INTELLIGENCE".bright_blue().bold().to_string());
    for metric in view.phishing_metrics() {
        lines.push(format!(
            "  {:<20} {:>10}  {}",
            metric.label,
            metric.value.bright_white().bold(),
            metric.caption.dimmed()
        ));
    }
    for (name, count) in view.primary_sources() {
        lines.push(format!("  {:<20} {:>10}", name, count));
    }
    lines.push(format!("  {:<20} {:>10}", "ut1_blacklists", view.ut1_total().yellow()));
    lines.push(String::new());

    let categories = view.top_ut1_categories(TOP_CATEGORIES_SUMMARY);
    if !categories.is_empty() {
        lines.push("TOP UT1 CATEGORIES".bright_blue().bold().to_string());
        for (i, (name, count)) in categories.iter().enumerate() {
            lines.push(format!("  {:>2}. {:<20} {:>10}", i + 1, name, count));
        }
    }
    lines
}

pub fn render_recent(recent: &RecentActivityResponse) -> Vec<String> {
    let mut lines = vec![format!("RECENT CERTIFICATES ({})", recent.count).bright_blue().bold().to_string()];
    if recent.recent_activity.is_empty() {
        lines.push("  No recent activity".dimmed().to_string());
    }
    for activity in &recent.recent_activity {
        let kind = if activity.was_updated {
            "updated".yellow()
        } else {
            "new".green()
        };
        lines.push(format!(
            "  {:<14} {:<8} {}",
            format_short_timestamp(&activity.created_at),
            kind,
            activity.subject_cn.bright_white()
        ));
    }
    lines
}

fn threat_badge(level: ThreatLevel) -> String {
    let label = format!("[{}]", level.label());
    match level {
        ThreatLevel::High => label.red().bold().to_string(),
        ThreatLevel::Medium => label.yellow().to_string(),
        ThreatLevel::Low => label.green().to_string(),
    }
}

pub fn render_search(view: &SearchView) -> Vec<String> {
    let mut lines = Vec::new();
    match view.state() {
        SearchState::Idle | SearchState::Loading => {}
        SearchState::Error(message) => lines.push(format!("{} {}", "✗".red().bold(), message.red())),
        SearchState::Success(_) => {
            if let Some(summary) = view.summary_line() {
                lines.push(summary.bright_white().bold().to_string());
            }
            let cards: Vec<String> = view
                .category_cards()
                .iter()
                .map(|card| format!("{} {}", card.count.to_string().cyan().bold(), card.label))
                .collect();
            if !cards.is_empty() {
                lines.push(cards.join("   "));
            }
            lines.push(format!(
                "Page {} of {} ({} per page)",
                view.current_page(),
                view.max_pages().max(1),
                view.page_size().get()
            ));

            for bucket in view.buckets() {
                lines.push(String::new());
                let range = bucket
                    .showing
                    .map(|(first, last)| format!("showing {}-{} of {}", first, last, bucket.total))
                    .unwrap_or_else(|| format!("no results on this page, {} total", bucket.total));
                lines.push(format!("{} ({})", bucket.label.bright_blue().bold(), range));
                for result in bucket.results {
                    let mut line = format!(
                        "  {} {}  {}  {}",
                        threat_badge(threat_level(result)),
                        headline(result),
                        result.source().blue(),
                        format_short_timestamp(result.created_at()).dimmed()
                    );
                    if let Some(target) = result.target() {
                        line.push_str(&format!("  target: {}", target.magenta()));
                    }
                    if let Some(domains) = result.domains() {
                        line.push_str(&format!("  [{}]", truncate(domains, 60)));
                    }
                    lines.push(line);
                }
            }
        }
    }
    lines
}

pub fn render_sources(sources: &SearchSources) -> Vec<String> {
    let mut lines = heading("SEARCH SOURCES");
    lines.push("MAIN SOURCES".bright_blue().bold().to_string());
    for source in &sources.main_sources {
        lines.push(format!("  {} {}", "•".cyan(), source));
    }
    lines.push(String::new());
    lines.push(format!("UT1 CATEGORIES ({})", sources.ut1_categories.len()).bright_blue().bold().to_string());
    for chunk in sources.ut1_categories.chunks(4) {
        lines.push(format!("  {}", chunk.iter().map(|c| format!("{:<18}", c)).collect::<String>()));
    }
    if !sources.search_capabilities.is_empty() {
        lines.push(String::new());
        lines.push("CAPABILITIES".bright_blue().bold().to_string());
        for (name, description) in sources.search_capabilities.iter() {
            lines.push(format!("  {:<20} {}", name.bright_white(), description));
        }
    }
    if !sources.usage_examples.is_empty() {
        lines.push(String::new());
        lines.push("EXAMPLES".bright_blue().bold().to_string());
        for (name, example) in sources.usage_examples.iter() {
            lines.push(format!("  {:<20} {}", name.bright_white(), example_query(example).cyan()));
        }
    }
    lines
}

pub fn render_certificate_list(list: &CertificateListResponse) -> Vec<String> {
    let page = &list.pagination;
    let mut lines = vec![format!(
        "Page {} of {} ({} certificates)",
        page.page,
        page.total_pages.max(1),
        format_thousands(page.total)
    )
    .bright_white()
    .bold()
    .to_string()];

    for cert in &list.certificates {
        lines.push(format!(
            "  {:<8} {:<40} {:<14} {}",
            format!("#{}", cert.id).dimmed(),
            truncate(&cert.subject_cn, 40),
            format_short_timestamp(&cert.created_at),
            truncate(cert.domains.as_deref().unwrap_or("-"), 50).dimmed()
        ));
    }

    let mut nav = Vec::new();
    if page.has_prev {
        nav.push(format!("--page {} for previous", page.page.saturating_sub(1)));
    }
    if page.has_next {
        nav.push(format!("--page {} for next", page.page + 1));
    }
    if !nav.is_empty() {
        lines.push(nav.join(", ").dimmed().to_string());
    }
    lines
}

pub fn render_certificate(cert: &Certificate) -> Vec<String> {
    let mut lines = heading(&format!("CERTIFICATE #{}", cert.id));
    lines.push(format!("{:<12} {}", "Subject CN", cert.subject_cn.bright_white().bold()));
    lines.push(format!("{:<12} {}", "Created", format_short_timestamp(&cert.created_at)));
    lines.push(format!("{:<12} {}", "Updated", format_short_timestamp(&cert.updated_at)));
    match cert.domains.as_deref() {
        Some(domains) if !domains.is_empty() => {
            lines.push("Domains".to_string());
            for domain in domains.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                lines.push(format!("  {} {}", "•".cyan(), domain));
            }
        }
        _ => lines.push(format!("{:<12} {}", "Domains", "-".dimmed())),
    }
    lines
}

pub fn render_domain_matches(matches: &DomainSearchResponse) -> Vec<String> {
    let mut lines = vec![format!("{} matches for \"{}\"", matches.count, matches.query)
        .bright_white()
        .bold()
        .to_string()];
    for found in &matches.results {
        lines.push(format!(
            "  {:<40} {}",
            found.subject_cn.bright_white(),
            truncate(found.domains.as_deref().unwrap_or("-"), 60).dimmed()
        ));
    }
    lines
}

pub fn render_health(health: &HealthStatus) -> Vec<String> {
    let mut lines = Vec::new();
    let status = if health.is_healthy() {
        format!("{} {}", "✓".green().bold(), health.status.green().bold())
    } else {
        format!("{} {}", "✗".red().bold(), health.status.red().bold())
    };
    lines.push(format!("{:<10} {}", "Overall", status));

    if let Some(db) = &health.database {
        let mut line = format!("{:<10} {}", "Database", db.status);
        if let Some(ts) = &db.timestamp {
            line.push_str(&format!(" ({})", format_short_timestamp(ts)));
        }
        if let Some(error) = &db.error {
            line.push_str(&format!(" {}", error.red()));
        }
        lines.push(line);
    }
    if let Some(api) = &health.api {
        let version = api.version.as_deref().unwrap_or("unknown");
        lines.push(format!("{:<10} {} (v{})", "API", api.status, version));
    }
    lines
}

// Command handlers

pub async fn handle_search(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let mut view = SearchView::new();
    view.set_query(args.get_one::<String>("QUERY").cloned().unwrap_or_default());
    for source in parse_sources(args.get_one::<String>("sources").map(String::as_str)) {
        view.filter_mut().toggle(&source);
    }

    let Some(mut request) = view.submit() else {
        return Err("Search query must not be empty".to_string());
    };
    request.limit = args.get_one::<u32>("limit").copied().unwrap_or(DEFAULT_SEARCH_LIMIT);
    request.offset = args.get_one::<u32>("offset").copied().unwrap_or(0);

    let spinner = spinner(format!("Searching for '{}'...", request.query), quiet);
    let outcome = client.search(&request).await;
    spinner.finish_and_clear();

    if args.get_flag("json") {
        let response = outcome.map_err(|e| e.to_string())?;
        println!("{}", to_json(&response)?);
        return Ok(());
    }

    view.complete(request.generation, outcome);
    let page_size = args
        .get_one::<String>("page-size")
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(PageSize::from_usize)
        .unwrap_or_default();
    view.set_page_size(page_size);
    view.set_page(args.get_one::<u32>("page").map_or(1, |page| *page as usize));

    if let SearchState::Error(message) = view.state() {
        return Err(message.clone());
    }
    print_lines(&render_search(&view));
    Ok(())
}

pub async fn handle_stats(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    if args.get_flag("watch") {
        return watch_stats(client).await;
    }

    let spinner = spinner("Loading statistics...", quiet);
    let (stats, recent) = futures::join!(
        client.get_statistics(),
        client.get_recent_activity(STATS_RECENT_LIMIT)
    );
    spinner.finish_and_clear();

    let stats = stats.map_err(|e| format!("Failed to load statistics: {}", e))?;
    if args.get_flag("json") {
        println!("{}", to_json(&stats)?);
        return Ok(());
    }

    let mut view = DashboardView::new();
    view.apply(Ok(stats));
    print_lines(&render_statistics(&view));

    match recent {
        Ok(recent) => print_lines(&render_recent(&recent)),
        Err(e) => eprintln!("{} Recent activity unavailable: {}", "⚠".yellow(), e),
    }
    Ok(())
}

async fn watch_stats(client: &ApiClient) -> Result<(), String> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut task = dashboard::start_polling(
        Arc::new(client.clone()),
        POLL_INTERVAL,
        Arc::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );
    info!("Watching statistics every {}s", POLL_INTERVAL.as_secs());

    let mut view = DashboardView::new();
    loop {
        tokio::select! {
            Some(outcome) = rx.recv() => {
                view.apply(outcome);
                // Clear screen and home the cursor
                print!("\x1B[2J\x1B[H");
                print_lines(&render_statistics(&view));
                if let Some(updated) = view.last_updated() {
                    println!("{}", format!("Updated {} · Ctrl+C to stop", updated.format("%H:%M:%S")).dimmed());
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    task.teardown();
    Ok(())
}

pub async fn handle_sources(client: &ApiClient, quiet: bool) -> Result<(), String> {
    let spinner = spinner("Loading sources...", quiet);
    let sources = client.get_search_sources().await;
    spinner.finish_and_clear();
    print_lines(&render_sources(&sources.map_err(|e| e.to_string())?));
    Ok(())
}

pub async fn handle_certs_list(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let query = CertificateQuery {
        page: args.get_one::<u32>("page").copied(),
        limit: args.get_one::<u32>("limit").copied(),
        search: args.get_one::<String>("search").cloned(),
        has_domains: args.get_flag("has-domains").then_some(true),
    };

    let spinner = spinner("Loading certificates...", quiet);
    let list = client.get_certificates(&query).await;
    spinner.finish_and_clear();
    print_lines(&render_certificate_list(&list.map_err(|e| e.to_string())?));
    Ok(())
}

pub async fn handle_certs_get(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let id = *args
        .get_one::<i64>("ID")
        .ok_or_else(|| "A certificate id is required".to_string())?;

    let spinner = spinner(format!("Loading certificate #{}...", id), quiet);
    let cert = client.get_certificate(id).await;
    spinner.finish_and_clear();
    print_lines(&render_certificate(&cert.map_err(|e| e.to_string())?));
    Ok(())
}

pub async fn handle_certs_domains(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let query = args.get_one::<String>("QUERY").cloned().unwrap_or_default();
    if query.trim().is_empty() {
        return Err("Domain query must not be empty".to_string());
    }
    let limit = args.get_one::<u32>("limit").copied().unwrap_or(DEFAULT_DOMAIN_LIMIT);

    let spinner = spinner(format!("Searching certificates for '{}'...", query), quiet);
    let matches = client.search_domains(&query, limit).await;
    spinner.finish_and_clear();
    print_lines(&render_domain_matches(&matches.map_err(|e| e.to_string())?));
    Ok(())
}

pub async fn handle_recent(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let limit = args.get_one::<u32>("limit").copied().unwrap_or(DEFAULT_RECENT_LIMIT);
    let spinner = spinner("Loading recent activity...", quiet);
    let recent = client.get_recent_activity(limit).await;
    spinner.finish_and_clear();
    print_lines(&render_recent(&recent.map_err(|e| e.to_string())?));
    Ok(())
}

pub async fn handle_health(client: &ApiClient, args: &ArgMatches, quiet: bool) -> Result<(), String> {
    let spinner = spinner("Checking backend health...", quiet);
    let health = if args.get_flag("db") {
        client.database_health().await
    } else {
        client.health_check().await
    };
    spinner.finish_and_clear();

    let health = health.map_err(|e| e.to_string())?;
    print_lines(&render_health(&health));
    if health.is_healthy() {
        Ok(())
    } else {
        Err(format!("Backend reports status '{}'", health.status))
    }
}
