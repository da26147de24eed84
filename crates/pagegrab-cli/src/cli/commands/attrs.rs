//! `pagegrab attrs <url> --match NAME=VALUE --get ATTR`: print attribute values.

use anyhow::Result;
use pagegrab_core::extract::{attr, Page};

use crate::cli::session::Session;

/// Prints one value per matching element and returns them.
pub fn run_attrs(
    session: &mut Session,
    url: &str,
    matching: &(String, String),
    get: &str,
    child: Option<usize>,
    limit: Option<usize>,
) -> Result<Vec<String>> {
    let scribe = session.scribe();
    let page = Page::fetch(&mut session.scheduler, url, scribe)?;
    let values = attribute_values(&page, matching, get, child, limit);
    for v in &values {
        println!("{v}");
    }
    Ok(values)
}

pub(crate) fn attribute_values(
    page: &Page,
    (name, value): &(String, String),
    get: &str,
    child: Option<usize>,
    limit: Option<usize>,
) -> Vec<String> {
    page.elements_with_attr(name, value, limit)
        .into_iter()
        .filter_map(|el| match child {
            Some(n) => page.child_attr(el, get, n),
            None => attr(&el, get),
        })
        .map(str::to_string)
        .collect()
}
