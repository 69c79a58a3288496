//! Boundary markers for the batch buffer.
//!
//! Each collected unit is wrapped in a pair of CSS comments carrying a
//! per-batch random boundary:
//!
//! ```text
//! /*9f2c…e1:0:begin main.less*/<content>
//! /*9f2c…e1:0:end*/
//! /*9f2c…e1:1:begin theme.less*/<content>
//! /*9f2c…e1:1:end*/
//! ```
//!
//! Comments survive a stylesheet preprocessor, and a random boundary cannot
//! be reproduced by accident in user content, unlike a fixed sentinel such
//! as `/*start file*/`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hex characters in a boundary (128 bits).
const BOUNDARY_LEN: usize = 32;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Random opaque token shared by every marker of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// Derive a fresh boundary from time, process id and a counter.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);
        let local = 0u8;

        let mut hasher = blake3::Hasher::new();
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());
        hasher.update(&count.to_le_bytes());
        hasher.update(&(std::ptr::addr_of!(local) as usize).to_le_bytes());

        let mut hex = hex::encode(hasher.finalize().as_bytes());
        hex.truncate(BOUNDARY_LEN);
        Self(hex)
    }

    /// Generate boundaries until one does not occur in any of `texts`.
    pub fn generate_avoiding<'a>(texts: impl Iterator<Item = &'a str> + Clone) -> Self {
        loop {
            let boundary = Self::generate();
            if !texts.clone().any(|t| boundary.occurs_in(t)) {
                return boundary;
            }
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the boundary text appears anywhere in `text`.
    #[inline]
    pub fn occurs_in(&self, text: &str) -> bool {
        text.contains(self.0.as_str())
    }

    /// Common prefix of every marker token: `/*<boundary>:`.
    fn token_prefix(&self) -> String {
        format!("/*{}:", self.0)
    }

    /// Start marker for unit `index`, annotated with its name.
    pub fn begin(&self, index: usize, name: &str) -> String {
        format!("/*{}:{index}:begin {}*/", self.0, sanitize_name(name))
    }

    /// End marker for unit `index`.
    pub fn end(&self, index: usize) -> String {
        format!("/*{}:{index}:end*/", self.0)
    }

    /// Find every well-formed marker in `text`, in textual order.
    ///
    /// Occurrences of the boundary that do not parse as a marker are
    /// reported as [`MarkerKind::Malformed`] so callers can reject the
    /// output rather than silently skip them.
    pub fn scan(&self, text: &str) -> Vec<Marker> {
        let prefix = self.token_prefix();
        let mut markers = Vec::new();
        let mut from = 0;

        while let Some(pos) = text[from..].find(&prefix) {
            let start = from + pos;
            let body_start = start + prefix.len();
            let Some(close) = text[body_start..].find("*/") else {
                markers.push(Marker {
                    kind: MarkerKind::Malformed,
                    start,
                    end: text.len(),
                });
                break;
            };
            let end = body_start + close + 2;
            let kind = parse_body(&text[body_start..body_start + close]);
            markers.push(Marker { kind, start, end });
            from = end;
        }

        markers
    }
}

/// Marker located in compiler output; `start..end` covers the whole comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Begin(usize),
    End(usize),
    Malformed,
}

/// Parse `<index>:begin <name>` or `<index>:end`.
fn parse_body(body: &str) -> MarkerKind {
    let Some((index, rest)) = body.split_once(':') else {
        return MarkerKind::Malformed;
    };
    let Ok(index) = index.parse::<usize>() else {
        return MarkerKind::Malformed;
    };
    if rest == "end" {
        MarkerKind::End(index)
    } else if rest == "begin" || rest.starts_with("begin ") {
        MarkerKind::Begin(index)
    } else {
        MarkerKind::Malformed
    }
}

/// Keep a unit name from closing the marker comment early.
fn sanitize_name(name: &str) -> String {
    name.replace("*/", "*_/").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_differ() {
        let a = Boundary::generate();
        let b = Boundary::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), BOUNDARY_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_avoiding() {
        let taken = Boundary::generate();
        let text = format!("a {{ content: '{}' }}", taken.as_str());
        let fresh = Boundary::generate_avoiding([text.as_str()].into_iter());
        assert!(!fresh.occurs_in(&text));
    }

    #[test]
    fn test_scan_pairs_in_order() {
        let b = Boundary::generate();
        let text = format!(
            "{}x{{}}\n{}\n{}y{{}}\n{}\n",
            b.begin(0, "x.less"),
            b.end(0),
            b.begin(1, "y.less"),
            b.end(1)
        );
        let kinds: Vec<_> = b.scan(&text).into_iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::Begin(0),
                MarkerKind::End(0),
                MarkerKind::Begin(1),
                MarkerKind::End(1)
            ]
        );
    }

    #[test]
    fn test_scan_offsets_cover_comment() {
        let b = Boundary::generate();
        let begin = b.begin(0, "a.less");
        let text = format!("{begin}body");
        let markers = b.scan(&text);
        assert_eq!(markers[0].start, 0);
        assert_eq!(&text[markers[0].end..], "body");
    }

    #[test]
    fn test_scan_ignores_foreign_boundaries_and_legacy_markers() {
        let ours = Boundary::generate();
        let theirs = Boundary::generate();
        let text = format!(
            "/*start file*/{}/*end file*/{}",
            theirs.begin(0, "x"),
            ours.end(3)
        );
        let markers = ours.scan(&text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, MarkerKind::End(3));
    }

    #[test]
    fn test_scan_malformed() {
        let b = Boundary::generate();
        let text = format!("/*{}:zero:begin*/ /*{}:1:", b.as_str(), b.as_str());
        let kinds: Vec<_> = b.scan(&text).into_iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::Malformed, MarkerKind::Malformed]);
    }

    #[test]
    fn test_name_cannot_close_comment() {
        let b = Boundary::generate();
        let begin = b.begin(0, "evil*/name.less");
        assert_eq!(begin.matches("*/").count(), 1);
        assert!(begin.ends_with("*/"));
        assert_eq!(b.scan(&begin)[0].kind, MarkerKind::Begin(0));
    }
}
