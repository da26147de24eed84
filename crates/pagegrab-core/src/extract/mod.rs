//! Fetched page markup and attribute lookup.

use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::retry::FetchError;
use crate::scheduler::FetchScheduler;
use crate::scribe::{Scribe, Severity, Visibility};
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid page url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u32 },
}

/// A parsed page and the URL relative references resolve against.
pub struct Page {
    url: Url,
    document: Html,
    scribe: Arc<dyn Scribe>,
}

impl Page {
    pub fn parse(url: Url, markup: &str, scribe: Arc<dyn Scribe>) -> Self {
        Self {
            url,
            document: Html::parse_document(markup),
            scribe,
        }
    }

    /// Fetch `url` through the scheduler and parse the body.
    pub fn fetch<T: Transport>(
        scheduler: &mut FetchScheduler<T>,
        url: &str,
        scribe: Arc<dyn Scribe>,
    ) -> Result<Self, PageError> {
        let parsed = Url::parse(url).map_err(|source| PageError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let result = scheduler.fetch(parsed.as_str())?;
        if !result.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status: result.status,
            });
        }
        let page = Self::parse(parsed, &result.text(), scribe);
        page.scribe.write(
            "Retrieved HTML from URL",
            Visibility::Debug,
            Severity::Plain,
        );
        Ok(page)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    /// Elements whose attribute `name` equals `value`, in document order.
    /// For `class`, any one of the whitespace-separated classes may match.
    pub fn elements_with_attr(
        &self,
        name: &str,
        value: &str,
        limit: Option<usize>,
    ) -> Vec<ElementRef<'_>> {
        let limit = limit.unwrap_or(usize::MAX);
        let found: Vec<ElementRef<'_>> = self
            .document
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| attr_matches(el, name, value))
            .take(limit)
            .collect();

        self.scribe.write(
            &format!("Captured {} web page element(s)", found.len()),
            Visibility::Debug,
            Severity::Plain,
        );
        if found.is_empty() {
            self.scribe.write(
                &format!("Warning: no element with {name}=\"{value}\" found"),
                Visibility::Both,
                Severity::Warning,
            );
        }
        found
    }

    /// The `occurrence`-th (1-based) descendant of `parent` that carries
    /// attribute `name`, and that attribute's value.
    pub fn child_attr<'a>(
        &self,
        parent: ElementRef<'a>,
        name: &str,
        occurrence: usize,
    ) -> Option<&'a str> {
        let children: Vec<ElementRef<'a>> = parent
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().attr(name).is_some())
            .collect();

        if children.is_empty() {
            self.scribe.write(
                &format!("Warning: child element(s) containing {name} not found"),
                Visibility::Both,
                Severity::Warning,
            );
            return None;
        }
        self.scribe.write(
            &format!(
                "Captured {} child element(s) containing: {}",
                children.len(),
                name
            ),
            Visibility::Debug,
            Severity::Plain,
        );

        let picked = occurrence
            .checked_sub(1)
            .and_then(|i| children.get(i))
            .and_then(|el| el.value().attr(name));
        if picked.is_none() {
            self.scribe.write(
                &format!(
                    "Warning: occurrence {occurrence} of {name} requested, {} found",
                    children.len()
                ),
                Visibility::Both,
                Severity::Warning,
            );
        }
        picked
    }

    /// Absolute URLs of `<img>` sources under `scope` (the whole document when
    /// `None`), resolved against the page URL. Inline `data:` images are
    /// skipped and duplicates dropped, first occurrence wins.
    pub fn image_sources(&self, scope: Option<ElementRef<'_>>) -> Vec<Url> {
        let root = match scope {
            Some(el) => *el,
            None => self.document.tree.root(),
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for img in root
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case("img"))
        {
            let Some(src) = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            match self.url.join(src) {
                Ok(resolved) if resolved.scheme() == "data" => {}
                Ok(resolved) => {
                    if seen.insert(resolved.as_str().to_string()) {
                        out.push(resolved);
                    }
                }
                Err(e) => tracing::debug!(src, error = %e, "skipping unresolvable image source"),
            }
        }

        self.scribe.write(
            &format!("Captured {} image source(s)", out.len()),
            Visibility::Debug,
            Severity::Plain,
        );
        out
    }
}

/// Value of attribute `name` on `element`.
pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

fn attr_matches(el: &ElementRef<'_>, name: &str, value: &str) -> bool {
    match el.value().attr(name) {
        Some(v) if v == value => true,
        Some(v) if name.eq_ignore_ascii_case("class") => v.split_whitespace().any(|c| c == value),
        _ => false,
    }
}
