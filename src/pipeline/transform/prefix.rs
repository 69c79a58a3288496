//! Vendor prefix expansion for a browser target list.

use super::MapStage;
use crate::debug;
use crate::pipeline::Unit;
use lightningcss::{
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::{Browsers, Targets},
};

/// Adds the vendor-prefixed declarations required by the target browsers.
///
/// Content that lightningcss cannot parse passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct Prefixer {
    targets: Targets,
}

impl Prefixer {
    /// Build from browserslist queries such as `["ie >= 9", "chrome >= 34"]`.
    pub fn from_queries(queries: &[String]) -> Result<Self, String> {
        let browsers = parse_browsers(queries)?;
        Ok(Self {
            targets: browsers.map(Targets::from).unwrap_or_default(),
        })
    }

    pub fn targets(&self) -> Targets {
        self.targets.clone()
    }

    /// Prefix one stylesheet.
    pub fn prefix(&self, css: &str) -> Result<String, String> {
        let mut sheet =
            StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
        sheet
            .minify(MinifyOptions {
                targets: self.targets.clone(),
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;
        let printed = sheet
            .to_css(PrinterOptions {
                targets: self.targets.clone(),
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;
        Ok(printed.code)
    }
}

impl MapStage for Prefixer {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn apply(&self, unit: Unit) -> Unit {
        match self.prefix(&unit.content) {
            Ok(css) => unit.with_content(css),
            Err(e) => {
                debug!("prefix"; "{} left unprefixed: {}", unit.name, e);
                unit
            }
        }
    }
}

/// Resolve browserslist queries; an empty list means no targets.
pub fn parse_browsers(queries: &[String]) -> Result<Option<Browsers>, String> {
    if queries.is_empty() {
        return Ok(None);
    }
    Browsers::from_browserslist(queries.iter().map(String::as_str)).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_old_targets_get_prefixes() {
        let prefixer = Prefixer::from_queries(&queries(&["safari >= 7", "ios >= 7"])).unwrap();
        let css = prefixer.prefix(".a { user-select: none; }").unwrap();
        assert!(css.contains("-webkit-user-select: none"), "{css}");
    }

    #[test]
    fn test_no_targets_no_prefixes() {
        let prefixer = Prefixer::from_queries(&[]).unwrap();
        let css = prefixer.prefix(".a { user-select: none; }").unwrap();
        assert!(!css.contains("-webkit-"), "{css}");
    }

    #[test]
    fn test_default_browser_list_parses() {
        let list = queries(&[
            "ie >= 9",
            "ie_mob >= 10",
            "ff >= 30",
            "chrome >= 34",
            "safari >= 7",
            "opera >= 23",
            "ios >= 7",
            "android >= 4.4",
            "bb >= 10",
        ]);
        assert!(parse_browsers(&list).unwrap().is_some());
    }

    #[test]
    fn test_invalid_query() {
        assert!(parse_browsers(&queries(&["not a browser >= x"])).is_err());
    }

    #[test]
    fn test_unparsable_content_passes_through() {
        let prefixer = Prefixer::from_queries(&queries(&["chrome >= 34"])).unwrap();
        let unit = Unit::new("broken.css", "a { color: red");
        let before = unit.content.clone();
        // lightningcss recovers from some errors; either way the unit survives
        let out = prefixer.apply(unit);
        assert_eq!(out.name, "broken.css");
        if prefixer.prefix(&before).is_err() {
            assert_eq!(out.content, before);
        }
    }

    #[test]
    fn test_pure() {
        let prefixer = Prefixer::from_queries(&queries(&["chrome >= 34"])).unwrap();
        let css = ".a { display: flex; }";
        assert_eq!(prefixer.prefix(css).unwrap(), prefixer.prefix(css).unwrap());
    }
}
