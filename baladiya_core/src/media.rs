use url::Url;

/// Turns relative storage paths into public URLs.
///
/// The database only ever holds paths relative to the storage root; absolute
/// URLs are computed at read time so the public base can move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    pub fn new(public_base: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(public_base)?;
        let base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(MediaResolver { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Already absolute URLs come back unchanged, so resolving twice is a
    /// no-op.
    pub fn resolve(&self, path: &str) -> String {
        if is_absolute(path) {
            return path.to_string();
        }

        let relative = path.trim_start_matches('/');
        format!("{}/{}", self.base, url_escape::encode_path(relative))
    }

    pub fn resolve_opt(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.trim().is_empty())
            .map(|p| self.resolve(p))
    }

    pub fn resolve_all<'a>(&self, paths: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        paths.into_iter().map(|p| self.resolve(p)).collect()
    }
}

fn is_absolute(path: &str) -> bool {
    match Url::parse(path) {
        Ok(url) => url.has_host() || url.scheme() == "data",
        Err(_) => false,
    }
}
