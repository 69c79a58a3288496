//! Batch render and re-split.
//!
//! Many stylesheet fragments are compiled with one compiler invocation and
//! split back into one unit per input.
//!
//! ```text
//! collect(a.less) ─┐
//! collect(b.less) ─┼─► buffer ─► compiler (once) ─► scan markers ─► emit a', b', c'
//! collect(c.less) ─┘                                                └─► end
//! ```
//!
//! Every unit is wrapped as `<begin i name><content>\n<end i>\n`. The newline
//! before the end marker keeps a trailing `//` line comment from swallowing
//! it, so with a pass-through compiler a unit comes back with one extra
//! trailing newline.
//!
//! All markers are validated before the first unit is emitted: a flush either
//! emits every unit followed by end-of-sequence, or emits nothing. Output
//! outside the marker pairs may only be whitespace; anything else (a hoisted
//! `@import`, a source map comment) would be lost by the split and fails the
//! flush instead.

use super::{
    Unit, UnitSink,
    marker::{Boundary, Marker, MarkerKind},
};
use crate::compiler::{CompileError, RenderOptions, StyleCompiler};
use crate::{debug, log};
use std::ops::Range;
use thiserror::Error;

/// Batch flush failure. No unit has been emitted when this is returned.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("stylesheet compiler failed")]
    Compiler(#[from] CompileError),

    #[error(
        "compiler output does not match the batch: expected {expected} marker pairs, \
         found {begins} begin and {ends} end markers ({malformed} malformed)"
    )]
    MarkerMismatch {
        expected: usize,
        begins: usize,
        ends: usize,
        malformed: usize,
    },

    #[error("compiler output reordered the batch: pair {position} is {found}")]
    MarkerOrder { position: usize, found: String },

    #[error("compiler wrote text {location} that belongs to no unit: {text}")]
    StrayOutput { location: String, text: String },
}

/// Collects units into one buffer, compiles it once, and re-splits the output.
///
/// One instance per invocation; [`flush`](Self::flush) consumes it.
#[derive(Debug)]
pub struct BatchTransform {
    boundary: Boundary,
    units: Vec<Unit>,
    buffer: String,
}

impl Default for BatchTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchTransform {
    pub fn new() -> Self {
        Self {
            boundary: Boundary::generate(),
            units: Vec::new(),
            buffer: String::new(),
        }
    }

    /// Append a unit to the batch, wrapped in a fresh marker pair.
    pub fn collect(&mut self, unit: Unit) {
        if self.boundary.occurs_in(&unit.content) {
            debug!("batch"; "{} contains the batch boundary, regenerating", unit.name);
            self.units.push(unit);
            self.regenerate_boundary();
            return;
        }

        write_unit(&mut self.buffer, &self.boundary, self.units.len(), &unit);
        self.units.push(unit);
    }

    /// Number of collected units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[cfg(test)]
    fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    #[cfg(test)]
    fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Compile the batch once and emit one unit per collected unit, in order.
    ///
    /// An empty batch only signals end-of-sequence. On error nothing is
    /// emitted and the sequence is not ended.
    pub async fn flush<C, S>(
        self,
        compiler: &C,
        options: &RenderOptions,
        sink: &mut S,
    ) -> Result<usize, BatchError>
    where
        C: StyleCompiler,
        S: UnitSink + ?Sized,
    {
        if self.units.is_empty() {
            sink.end();
            return Ok(0);
        }

        let count = self.units.len();
        debug!("batch"; "compiling {} unit(s) with {} ({} bytes)",
            count, compiler.name(), self.buffer.len());

        let rendered = match compiler.render(&self.buffer, options).await {
            Ok(rendered) => rendered,
            Err(e) => {
                log!("error"; "{} failed on a batch of {} unit(s): {}", compiler.name(), count, e);
                return Err(BatchError::Compiler(e));
            }
        };

        let ranges = split_ranges(&self.boundary, &rendered.css, count)?;

        for (unit, range) in self.units.into_iter().zip(ranges) {
            let content = rendered.css[range].to_string();
            sink.emit(unit.with_content(content));
        }
        sink.end();

        Ok(count)
    }

    /// Pick a boundary absent from every collected unit and rebuild the buffer.
    fn regenerate_boundary(&mut self) {
        self.boundary = Boundary::generate_avoiding(self.units.iter().map(|u| u.content.as_str()));
        self.buffer.clear();
        for (index, unit) in self.units.iter().enumerate() {
            write_unit(&mut self.buffer, &self.boundary, index, unit);
        }
    }
}

fn write_unit(buffer: &mut String, boundary: &Boundary, index: usize, unit: &Unit) {
    buffer.push_str(&boundary.begin(index, &unit.name));
    buffer.push_str(&unit.content);
    buffer.push('\n');
    buffer.push_str(&boundary.end(index));
    buffer.push('\n');
}

/// Locate the content range of every unit in compiler output.
///
/// The i-th begin/end pair must carry index i; the range lies strictly
/// between the end of the begin marker and the start of the end marker.
fn split_ranges(
    boundary: &Boundary,
    css: &str,
    expected: usize,
) -> Result<Vec<Range<usize>>, BatchError> {
    let markers = boundary.scan(css);

    let begins = count_kind(&markers, |k| matches!(k, MarkerKind::Begin(_)));
    let ends = count_kind(&markers, |k| matches!(k, MarkerKind::End(_)));
    let malformed = count_kind(&markers, |k| matches!(k, MarkerKind::Malformed));

    if begins != expected || ends != expected || malformed > 0 {
        return Err(BatchError::MarkerMismatch {
            expected,
            begins,
            ends,
            malformed,
        });
    }

    let ranges = markers
        .chunks_exact(2)
        .enumerate()
        .map(|(position, pair)| match (pair[0].kind, pair[1].kind) {
            (MarkerKind::Begin(b), MarkerKind::End(e)) if b == position && e == position => {
                Ok(pair[0].end..pair[1].start)
            }
            (first, second) => Err(BatchError::MarkerOrder {
                position,
                found: format!("{first:?} followed by {second:?}"),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_gaps(css, &markers)?;
    Ok(ranges)
}

/// Reject non-whitespace text before, between or after the marker pairs.
fn check_gaps(css: &str, markers: &[Marker]) -> Result<(), BatchError> {
    let pairs = markers.len() / 2;
    let mut from = 0;

    for gap in 0..=pairs {
        let to = markers.get(gap * 2).map_or(css.len(), |m| m.start);
        let text = css[from..to].trim();
        if !text.is_empty() {
            let location = match gap {
                0 => "before the first unit".to_string(),
                g if g == pairs => "after the last unit".to_string(),
                g => format!("between units {} and {}", g - 1, g),
            };
            return Err(BatchError::StrayOutput {
                location,
                text: text.chars().take(80).collect(),
            });
        }
        if let Some(end) = markers.get(gap * 2 + 1) {
            from = end.end;
        }
    }
    Ok(())
}

fn count_kind(markers: &[Marker], pred: impl Fn(MarkerKind) -> bool) -> usize {
    markers.iter().filter(|m| pred(m.kind)).count()
}
