use tracing::warn;
use url::{Url, form_urlencoded};

/// Query parameters that identify a product; everything else is tracking noise.
const ESSENTIAL_PARAMS: &[&str] = &["ID"];

pub fn normalize_all(urls: &[String]) -> Vec<String> {
    urls.iter().map(|url| normalize_url(url)).collect()
}

/// Drops every query parameter except `ID`. Scheme, host, path and fragment are
/// copied from the input as written; only the query is rebuilt.
pub fn normalize_url(raw: &str) -> String {
    if let Err(e) = Url::parse(raw) {
        warn!("Cannot normalize url {}: {}", raw, e);
        return raw.to_string();
    }

    let (before_fragment, fragment) = match raw.find('#') {
        Some(i) => raw.split_at(i),
        None => (raw, ""),
    };
    let (base, query) = match before_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => (before_fragment, ""),
    };

    let mut kept: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if !ESSENTIAL_PARAMS.contains(&&*key) || value.is_empty() {
            continue;
        }
        match kept.iter_mut().find(|(k, _)| *k == *key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => kept.push((key.into_owned(), vec![value.into_owned()])),
        }
    }

    let query = kept
        .iter()
        .map(|(key, values)| format!("{}={}", key, values.join(",")))
        .collect::<Vec<_>>()
        .join("&");
    let fragment = if fragment == "#" { "" } else { fragment };

    if query.is_empty() {
        format!("{base}{fragment}")
    } else {
        format!("{base}?{query}{fragment}")
    }
}
