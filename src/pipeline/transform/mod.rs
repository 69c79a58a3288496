//! Per-unit map stages applied after the batch split.
//!
//! | Stage        | Purpose                                    |
//! |--------------|--------------------------------------------|
//! | `UrlRebase`  | Point font/image `url()`s at output dirs   |
//! | `Prefixer`   | Vendor prefixes for the browser targets    |
//! | `Minifier`   | Minify (when `build.minify` is set)        |
//!
//! Stages are one-to-one and total: a stage that cannot process a unit
//! returns it unchanged.

mod minify;
mod prefix;
mod rebase;

pub use minify::Minifier;
pub use prefix::{Prefixer, parse_browsers};
pub use rebase::UrlRebase;

use super::Unit;

/// A synchronous one-to-one transform over units.
pub trait MapStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, unit: Unit) -> Unit;
}

/// Ordered chain of map stages.
#[derive(Default)]
pub struct Stages {
    stages: Vec<Box<dyn MapStage>>,
}

impl Stages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage to the end of the chain.
    pub fn pipe(mut self, stage: impl MapStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a stage only when `enabled`.
    pub fn pipe_if(self, enabled: bool, stage: impl MapStage + 'static) -> Self {
        if enabled { self.pipe(stage) } else { self }
    }

    /// Run a unit through every stage in order.
    pub fn apply(&self, unit: Unit) -> Unit {
        self.stages
            .iter()
            .fold(unit, |unit, stage| stage.apply(unit))
    }

    /// Stage names in order, for logging.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}
