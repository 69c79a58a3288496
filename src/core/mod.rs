//! Process-wide state shared by the build steps and the server.

mod state;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
