//! Turns whatever an editor pasted into a map block into something usable as
//! an iframe `src`.
//!
//! Editors paste one of three things: a bare URL, the full `<iframe>` snippet
//! a map provider hands out, or a URL with the snippet's attributes glued on
//! after it by a rich-text paste. This is a normalizer, not an allow-list: the
//! host of the result is not checked.

use once_cell::sync::Lazy;
use regex::Regex;

static SRC_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)src=["']([^"']+)["']"#).expect("src attribute pattern is valid")
});

static TRAILING_ATTRIBUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:width|height|style|allowfullscreen|loading|referrerpolicy)=")
        .expect("trailing attribute pattern is valid")
});

pub fn sanitize_map_url(raw: &str) -> String {
    if raw.to_ascii_lowercase().contains("<iframe") {
        if let Some(src) = SRC_ATTRIBUTE.captures(raw).and_then(|c| c.get(1)) {
            return src.as_str().to_string();
        }
    }

    let head = match TRAILING_ATTRIBUTES.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };

    // an iframe without a src leaves its opening tag behind
    let head = match head.find('<') {
        Some(idx) => &head[..idx],
        None => head,
    };

    head.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_src_from_iframe() {
        let raw = r#"<iframe src="https://maps.example/embed?x=1" width="600" height="400"></iframe>"#;
        assert_eq!(sanitize_map_url(raw), "https://maps.example/embed?x=1");
    }

    #[test]
    fn extracts_single_quoted_src_case_insensitively() {
        let raw = "<IFRAME SRC='https://www.google.com/maps/embed?pb=!1m18' style=\"border:0\"></IFRAME>";
        assert_eq!(sanitize_map_url(raw), "https://www.google.com/maps/embed?pb=!1m18");
    }

    #[test]
    fn strips_pasted_attributes() {
        let raw = r#"https://maps.example/embed?x=1 width="600" height="400""#;
        assert_eq!(sanitize_map_url(raw), "https://maps.example/embed?x=1");

        let raw = "https://maps.example/embed?x=1\n  allowfullscreen=\"\" loading=\"lazy\"";
        assert_eq!(sanitize_map_url(raw), "https://maps.example/embed?x=1");
    }

    #[test]
    fn attribute_names_need_leading_whitespace() {
        let raw = "https://maps.example/embed?width=600";
        assert_eq!(sanitize_map_url(raw), raw);
    }

    #[test]
    fn plain_url_is_trimmed() {
        assert_eq!(
            sanitize_map_url("  https://maps.example/embed?x=1 \t"),
            "https://maps.example/embed?x=1"
        );
    }

    #[test]
    fn iframe_without_src_never_yields_a_tag() {
        let out = sanitize_map_url(r#"<iframe width="600" height="400"></iframe>"#);
        assert!(!out.contains('<'));
        assert_eq!(out, "");

        let out = sanitize_map_url("https://maps.example/embed <iframe>");
        assert_eq!(out, "https://maps.example/embed");
    }
}
