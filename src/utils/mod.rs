//! Shared utilities.
//!
//! | Module   | Purpose                                 |
//! |----------|-----------------------------------------|
//! | `mime`   | Content-Type detection for the server   |
//! | `path`   | Path normalization and freshness checks |
//! | `plural` | Count formatting for log lines          |

pub mod mime;
pub mod path;
pub mod plural;
