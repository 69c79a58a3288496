//! CSS minification.

use super::MapStage;
use crate::debug;
use crate::pipeline::Unit;
use lightningcss::{
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::Targets,
};

/// Minifies a stylesheet, keeping prefixes needed by `targets`.
#[derive(Debug, Clone, Default)]
pub struct Minifier {
    targets: Targets,
}

impl Minifier {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }

    /// Minify CSS source code.
    pub fn minify(&self, source: &str) -> Option<String> {
        let mut stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
        stylesheet
            .minify(MinifyOptions {
                targets: self.targets.clone(),
                ..MinifyOptions::default()
            })
            .ok()?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                targets: self.targets.clone(),
                ..PrinterOptions::default()
            })
            .ok()?;
        Some(result.code)
    }
}

impl MapStage for Minifier {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, unit: Unit) -> Unit {
        match self.minify(&unit.content) {
            Some(css) => unit.with_content(css),
            None => {
                debug!("minify"; "{} left unminified", unit.name);
                unit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let css = ".a {\n  color: #ff0000;\n  margin: 0px;\n}\n";
        assert_eq!(Minifier::default().minify(css).unwrap(), ".a{color:red;margin:0}");
    }

    #[test]
    fn test_apply_keeps_name() {
        let unit = Unit::new("main.less", ".b { padding: 0 }");
        let out = Minifier::default().apply(unit);
        assert_eq!(out.name, "main.less");
        assert_eq!(out.content, ".b{padding:0}");
    }
}
