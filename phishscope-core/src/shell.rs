// Page navigation

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Dashboard,
    Search,
    ApiDocs,
    Careers,
    Blog,
    Privacy,
    Terms,
    Gdpr,
    SecurityPolicy,
    Help,
    Status,
    Forum,
    Press,
    NotFound,
}

impl Page {
    /// Pages reachable from the navigation bar
    pub const NAVIGABLE: [Page; 3] = [Page::Home, Page::Dashboard, Page::Search];

    pub const FOOTER: [Page; 11] = [
        Page::ApiDocs,
        Page::Careers,
        Page::Blog,
        Page::Privacy,
        Page::Terms,
        Page::Gdpr,
        Page::SecurityPolicy,
        Page::Help,
        Page::Status,
        Page::Forum,
        Page::Press,
    ];

    /// Resolves a route name; anything unknown is the not-found page.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" | "" => Page::Home,
            "dashboard" => Page::Dashboard,
            "search" => Page::Search,
            "api-docs" => Page::ApiDocs,
            "careers" => Page::Careers,
            "blog" => Page::Blog,
            "privacy" => Page::Privacy,
            "terms" => Page::Terms,
            "gdpr" => Page::Gdpr,
            "security-policy" => Page::SecurityPolicy,
            "help" => Page::Help,
            "status" => Page::Status,
            "forum" => Page::Forum,
            "press" => Page::Press,
            _ => Page::NotFound,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Dashboard => "dashboard",
            Page::Search => "search",
            Page::ApiDocs => "api-docs",
            Page::Careers => "careers",
            Page::Blog => "blog",
            Page::Privacy => "privacy",
            Page::Terms => "terms",
            Page::Gdpr => "gdpr",
            Page::SecurityPolicy => "security-policy",
            Page::Help => "help",
            Page::Status => "status",
            Page::Forum => "forum",
            Page::Press => "press",
            Page::NotFound => "not-found",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Dashboard => "Dashboard",
            Page::Search => "Search",
            Page::ApiDocs => "API Documentation",
            Page::Careers => "Careers",
            Page::Blog => "Blog",
            Page::Privacy => "Privacy Policy",
            Page::Terms => "Terms of Service",
            Page::Gdpr => "GDPR Compliance",
            Page::SecurityPolicy => "Security Policy",
            Page::Help => "Help Center",
            Page::Status => "System Status",
            Page::Forum => "Community Forum",
            Page::Press => "Press Kit",
            Page::NotFound => "Page Not Found",
        }
    }

    /// Body text for pages without a dedicated view.
    pub fn placeholder(self) -> Option<&'static str> {
        let text = match self {
            Page::Home | Page::Dashboard | Page::Search => return None,
            Page::ApiDocs => "Comprehensive API documentation for integrating PhishScope threat intelligence.",
            Page::Careers => "Join our team and help make the internet safer.",
            Page::Blog => "Latest insights on phishing trends and threat intelligence.",
            Page::Privacy => "How we collect, use, and protect your data.",
            Page::Terms => "The terms governing use of the PhishScope platform.",
            Page::Gdpr => "Our commitment to GDPR compliance and data protection rights.",
            Page::SecurityPolicy => "How we secure the platform and handle vulnerability reports.",
            Page::Help => "Guides and answers to common questions.",
            Page::Status => "Real-time status of PhishScope services.",
            Page::Forum => "Discuss threats and share intelligence with the community.",
            Page::Press => "Brand assets and press resources.",
            Page::NotFound => "The page you're looking for doesn't exist.",
        };
        Some(text)
    }

    pub fn has_view(self) -> bool {
        self.placeholder().is_none()
    }
}

/// Owns the current page.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    current: Page,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Switches to `page` and returns the page left, so the caller can
    /// unmount it.
    pub fn navigate(&mut self, page: Page) -> Page {
        let previous = std::mem::replace(&mut self.current, page);
        if previous != page {
            info!("Navigated {} -> {}", previous.name(), page.name());
        }
        previous
    }

    pub fn navigate_to(&mut self, name: &str) -> Page {
        self.navigate(Page::from_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_names_round_trip() {
        for page in Page::NAVIGABLE.into_iter().chain(Page::FOOTER) {
            assert_eq!(Page::from_name(page.name()), page);
        }
        assert_eq!(Page::from_name("nowhere"), Page::NotFound);
        assert_eq!(Page::from_name("Dashboard"), Page::Dashboard);
    }

    #[test]
    fn test_placeholders() {
        assert!(Page::Search.has_view());
        assert_eq!(Page::Gdpr.title(), "GDPR Compliance");
        assert!(Page::Gdpr.placeholder().is_some());
        assert_eq!(Page::NotFound.title(), "Page Not Found");
    }

    #[test]
    fn test_navigate_returns_previous() {
        let mut shell = Shell::new();
        assert_eq!(shell.current(), Page::Home);
        assert_eq!(shell.navigate(Page::Dashboard), Page::Home);
        assert_eq!(shell.navigate_to("search"), Page::Dashboard);
        assert_eq!(shell.current(), Page::Search);
    }
}
