//! Page Object Model support.
//!
//! Page objects hold the locators and business steps of one screen and talk
//! to the browser only through a [`Session`](crate::Session). This module
//! gives them a common shape: where the page lives and how to tell it has
//! loaded.

use crate::locator::LocatorSpec;

/// Trait for page objects representing a page or component in the UI.
///
/// # Example
///
/// ```
/// use vaxprobe::{LocatorSpec, PageObject, Role};
///
/// struct VaccinesPage;
///
/// impl PageObject for VaccinesPage {
///     fn url_pattern(&self) -> &str {
///         "/vaccines"
///     }
///
///     fn ready_marker(&self) -> Option<LocatorSpec> {
///         Some(LocatorSpec::role(Role::Heading).named_as("Vaccines"))
///     }
/// }
///
/// assert_eq!(VaccinesPage.path(), "/vaccines");
/// ```
pub trait PageObject {
    /// URL pattern that matches this page (e.g. "/vaccines", "/sessions/:slug")
    fn url_pattern(&self) -> &str;

    /// Path to navigate to when opening the page directly
    fn path(&self) -> &str {
        self.url_pattern()
    }

    /// Element whose visibility means the page is ready
    fn ready_marker(&self) -> Option<LocatorSpec> {
        None
    }

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// URL pattern matcher for page objects
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
}

impl UrlMatcher {
    /// Create a new URL matcher from a pattern
    ///
    /// Patterns support literal segments (`/vaccines`) and single-segment
    /// wildcards, written `/vaccines/*` or `/sessions/:slug`.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| {
                if s == "*" || s.starts_with(':') {
                    UrlSegment::Wildcard
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check if a URL (absolute or path-only) matches the pattern.
    ///
    /// Scheme, host, query and fragment are ignored.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path: Vec<&str> = split_path(path_of(url)).collect();
        path.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&path)
                .all(|(segment, part)| match segment {
                    UrlSegment::Literal(lit) => lit.as_str() == *part,
                    UrlSegment::Wildcard => true,
                })
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("", |slash| &without_scheme[slash..])
    } else {
        without_scheme
    };
    path.split(['?', '#']).next().unwrap_or_default()
}
