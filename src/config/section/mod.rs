//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assets.toml`:
//!
//! | Module  | TOML Section | Purpose                            |
//! |---------|--------------|------------------------------------|
//! | `build` | `[build]`    | Output, styles pipeline, copy rules |
//! | `serve` | `[serve]`    | Development server                 |

pub mod build;
mod serve;

pub use build::{BuildSectionConfig, CompilerConfig, CopyRule, StylesConfig};
pub use serve::ServeConfig;
