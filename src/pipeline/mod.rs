//! Stylesheet processing pipeline.
//!
//! # Architecture
//!
//! ```text
//!  inputs (ordered)
//!     │
//!     ├── compiled ext (.less) ──► BatchTransform ──(one compiler call)──┐
//!     │                                                                  │ ChannelSink
//!     └── plain (.css) ─────────────────────────────────────────┐        ▼
//!                                                               │   Stages (rebase → prefix → minify)
//!                                                               ▼        │
//!                                                 Stages ──► merge back in input order
//!                                                                        │
//!                                                                        ▼
//!                                                                  concat → bundle
//! ```
//!
//! - `batch`: collect / flush / re-split
//! - `marker`: boundary tokens and the marker scanner
//! - `sink`: where re-split units go
//! - `transform`: per-unit map stages
//! - `styles`: the async driver tying the pieces together

mod batch;
mod concat;
mod marker;
mod sink;
mod styles;
pub mod transform;
mod unit;

pub use batch::BatchTransform;
pub use concat::{concat, write_bundle};
pub use sink::{ChannelSink, UnitSink};
pub use styles::run_styles;
pub use transform::Stages;
pub use unit::Unit;
