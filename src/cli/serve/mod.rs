//! Static development server over the build output.
//!
//! No watching and no live reload: rerun `build` (or restart `serve`) to
//! pick up changes.

mod lifecycle;
mod path;
mod response;

use crate::{
    config::{ProjectConfig, cfg},
    core::{is_shutdown, register_server},
    log,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bind the server and run the request loop until Ctrl+C.
pub fn serve_output() -> Result<()> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    log!(
        "serve";
        "serving {}, press Ctrl+C to stop",
        config.root_relative(&config.build.output).display()
    );

    run_request_loop(&server, &config)
}

fn run_request_loop(server: &Server, config: &Arc<ProjectConfig>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ProjectConfig) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    crate::debug!("serve"; "{} {}", request.method(), request.url());

    match path::resolve_path(request.url(), &config.build.output) {
        Some(path) => response::respond_file(request, &path),
        None => response::respond_not_found(request, &config.build.output),
    }
}
