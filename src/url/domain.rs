use url::Url;

/// Returns the origin key of a URL (`scheme://host[:port]`)
///
/// robots.txt rules are scoped to an origin, so this is the robots cache key.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_search::url::origin_key;
///
/// let url = Url::parse("https://EXAMPLE.com:8443/path?q=1").unwrap();
/// assert_eq!(origin_key(&url), Some("https://example.com:8443".to_string()));
/// ```
pub fn origin_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Returns the robots.txt location for the origin of a URL
pub fn robots_url(url: &Url) -> Option<Url> {
    let origin = origin_key(url)?;
    Url::parse(&format!("{}/robots.txt", origin)).ok()
}
