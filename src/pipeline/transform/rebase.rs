//! URL rebasing for compiled stylesheets.
//!
//! Stylesheets are concatenated into `<output>/styles/css/`, while fonts and
//! images are copied to `<output>/fonts/` and `<output>/images/`. Every
//! `url(...)` that names a font or image is rewritten to point there by
//! basename:
//!
//! | Reference                          | Result                              |
//! |------------------------------------|-------------------------------------|
//! | `url(foo.png)`                     | `url("../../images/foo.png")`       |
//! | `url('../fonts/Foo.woff')`         | `url("../../fonts/foo.woff")`       |
//! | `url("icons/font-awesome.svg#fa")` | `url("../../fonts/font-awesome.svg#fa")` |
//! | `url(data:image/png;base64,...)`   | unchanged                           |
//! | `url(other.css)`                   | unchanged                           |
//!
//! Rebasing is idempotent: a rewritten reference classifies to itself.

use super::MapStage;
use crate::pipeline::Unit;
use regex::{Captures, Regex};
use std::{borrow::Cow, sync::LazyLock};

// ASCII whitespace only: the regex crate is built without unicode classes
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url[ \t\r\n\x0C]*\([ \t\r\n\x0C]*([^)]+)\)").unwrap());

const FONT_EXTENSIONS: &[&str] = &["eot", "woff", "woff2", "ttf", "otf"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// What a `url(...)` reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Font,
    Image,
}

/// Rewrites font and image references to fixed directories.
#[derive(Debug, Clone)]
pub struct UrlRebase {
    fonts: String,
    images: String,
}

impl Default for UrlRebase {
    fn default() -> Self {
        Self::new("../../fonts", "../../images")
    }
}

impl UrlRebase {
    pub fn new(fonts: impl Into<String>, images: impl Into<String>) -> Self {
        Self {
            fonts: fonts.into().trim_end_matches('/').to_string(),
            images: images.into().trim_end_matches('/').to_string(),
        }
    }

    /// Rewrite every recognised reference in `css`.
    pub fn rebase<'a>(&self, css: &'a str) -> Cow<'a, str> {
        URL_RE.replace_all(css, |caps: &Captures<'_>| {
            let whole = &caps[0];
            self.rewrite(&caps[1]).unwrap_or_else(|| whole.to_string())
        })
    }

    /// Rewritten `url(...)` for one captured reference, or `None` to keep it.
    fn rewrite(&self, raw: &str) -> Option<String> {
        let reference = strip_quotes(raw.trim());
        let (class, basename, suffix) = classify(reference)?;
        let dir = match class {
            AssetClass::Font => &self.fonts,
            AssetClass::Image => &self.images,
        };
        Some(format!("url(\"{dir}/{basename}{suffix}\")"))
    }
}

impl MapStage for UrlRebase {
    fn name(&self) -> &'static str {
        "rebase"
    }

    fn apply(&self, unit: Unit) -> Unit {
        match self.rebase(&unit.content) {
            Cow::Borrowed(_) => unit,
            Cow::Owned(rebased) => unit.with_content(rebased),
        }
    }
}

/// Remove one pair of matching single or double quotes.
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Classify a reference, returning its class, lower-cased basename and the
/// untouched `?query` / `#fragment` suffix.
pub fn classify(reference: &str) -> Option<(AssetClass, String, &str)> {
    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("data:")
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("//")
    {
        return None;
    }

    let split = reference.find(['?', '#']).unwrap_or(reference.len());
    let (path, suffix) = reference.split_at(split);

    let basename = path.rsplit(['/', '\\']).next()?.to_lowercase();
    let (_, ext) = basename.rsplit_once('.')?;

    let class = if FONT_EXTENSIONS.contains(&ext) || (ext == "svg" && lower.contains("font")) {
        AssetClass::Font
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        AssetClass::Image
    } else {
        return None;
    };

    Some((class, basename, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebase(css: &str) -> String {
        UrlRebase::default().rebase(css).into_owned()
    }

    #[test]
    fn test_bare_image() {
        assert_eq!(rebase("a{background:url(foo.png)}"), "a{background:url(\"../../images/foo.png\")}");
    }

    #[test]
    fn test_idempotent() {
        let once = rebase("a{background:url(foo.png)}");
        assert_eq!(rebase(&once), once);

        let once = rebase("@font-face{src:url('../font/Icons.svg#icons')}");
        assert_eq!(rebase(&once), once);
    }

    #[test]
    fn test_quote_variants() {
        let expected = "url(\"../../fonts/foo.woff\")";
        assert_eq!(rebase("url('foo.woff')"), expected);
        assert_eq!(rebase("url(\"foo.woff\")"), expected);
        assert_eq!(rebase("url(foo.woff)"), expected);
    }

    #[test]
    fn test_whitespace_inside_parens() {
        assert_eq!(rebase("url(  'a/b/c.GIF' )"), "url(\"../../images/c.gif\")");
    }

    #[test]
    fn test_reference_split_over_lines() {
        let css = "a { background: url(\n\t'Hero.JPG'\n); }";
        assert_eq!(
            UrlRebase::default().rebase(css),
            "a { background: url(\"../../images/hero.jpg\"); }"
        );
        assert!(URL_RE.is_match("url\x0C(x.png)"));
    }

    #[test]
    fn test_font_suffix_kept() {
        assert_eq!(
            rebase("src:url('../fonts/glyphs.eot?#iefix') format('embedded-opentype')"),
            "src:url(\"../../fonts/glyphs.eot?#iefix\") format('embedded-opentype')"
        );
    }

    #[test]
    fn test_svg_font_or_image() {
        assert_eq!(rebase("url(fonts/icons.svg)"), "url(\"../../fonts/icons.svg\")");
        // svg outside a font path is neither font nor image
        assert_eq!(rebase("url(img/logo.svg)"), "url(img/logo.svg)");
    }

    #[test]
    fn test_unrecognised_unchanged() {
        let css = "@import url(theme.css); a{b:url(data:image/png;base64,AAA=)} c{d:url(https://cdn.example.com/x.png)}";
        assert_eq!(rebase(css), css);
    }

    #[test]
    fn test_mismatched_quotes_not_stripped() {
        // The quote is kept, so the basename carries it and is not an image.
        assert_eq!(rebase("url('foo.png\")"), "url('foo.png\")");
    }

    #[test]
    fn test_custom_directories() {
        let rebase = UrlRebase::new("/static/fonts/", "/static/img");
        assert_eq!(rebase.rebase("url(a.ttf) url(b.jpeg)"), "url(\"/static/fonts/a.ttf\") url(\"/static/img/b.jpeg\")");
    }

    #[test]
    fn test_apply_keeps_identity() {
        let unit = Unit::new("main.less", "a{background:url(x.png)}");
        let out = UrlRebase::default().apply(unit);
        assert_eq!(out.name, "main.less");
        assert_eq!(out.content, "a{background:url(\"../../images/x.png\")}");
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("../Img/Photo.JPG"),
            Some((AssetClass::Image, "photo.jpg".to_string(), ""))
        );
        assert_eq!(classify("noext"), None);
    }
}
