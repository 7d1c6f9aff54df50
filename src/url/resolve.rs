use url::Url;

/// Resolves an href or src attribute to an absolute URL
///
/// Only scheme-relative (`//host/..`), root-relative (`/..`) and
/// dot-relative (`./..`, `../..`) references are joined onto `base_url`.
/// Anything else must already be an absolute URL; bare relative paths,
/// fragment-only references and empty values resolve to `None`.
///
/// # Examples
///
/// ```
/// use pagesift::url::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(
///     resolve_reference("../about", &base).unwrap().as_str(),
///     "https://example.com/about"
/// );
/// assert!(resolve_reference("about", &base).is_none());
/// ```
pub fn resolve_reference(reference: &str, base_url: &Url) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() {
        return None;
    }

    if is_relative_reference(reference) {
        base_url.join(reference).ok()
    } else {
        Url::parse(reference).ok()
    }
}

/// Resolves a link href, keeping only absolute http/https results
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    resolve_reference(href, base_url)
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .map(|url| url.to_string())
}

fn is_relative_reference(reference: &str) -> bool {
    reference.starts_with('/') || reference.starts_with("./") || reference.starts_with("../")
}
