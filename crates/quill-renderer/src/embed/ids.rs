//! Platform ID extraction from share URLs.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static TWEET_STATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/status/(\d+)").unwrap());

/// Returns `true` for `http://` and `https://` identifiers.
pub(crate) fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// `v` query parameter, else the first path segment.
pub(crate) fn youtube(value: &str) -> Option<String> {
    let url = platform_url(value, &["youtube.com", "youtu.be"])?;
    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return Some(id.into_owned());
    }
    first_segment(&url)
}

pub(crate) fn vimeo(value: &str) -> Option<String> {
    first_segment(&platform_url(value, &["vimeo.com"])?)
}

/// Numeric `/status/<id>` path segment.
pub(crate) fn twitter(value: &str) -> Option<String> {
    let url = platform_url(value, &["twitter.com", "x.com"])?;
    TWEET_STATUS
        .captures(url.path())
        .map(|caps| caps[1].to_owned())
}

fn platform_url(value: &str, hosts: &[&str]) -> Option<Url> {
    let url = Url::parse(value).ok()?;
    let host = url.host_str()?;
    hosts
        .iter()
        .any(|known| host.contains(known))
        .then_some(url)
}

fn first_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}
