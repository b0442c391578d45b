//! softnav headless driver.
//!
//! Boots a session against a live site, then reads commands from stdin:
//! `open <href>` activates a link, `back`/`forward` traverse, `show` and
//! `history` print the session, `quit` exits. Set `RUST_LOG=debug` to watch
//! cache hits, request targets and superseded navigations.

mod commands;
mod headless;
mod session;

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use commands::Command;
use session::{Flow, Session};
use softnav_net::HttpNetwork;
use softnav_types::config::SoftnavConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, SOFTNAV_CONFIG env var, or defaults.
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SOFTNAV_CONFIG").ok())
    {
        Some(path) => SoftnavConfig::load(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => SoftnavConfig::default(),
    };
    config.validate()?;
    log::info!(
        "Starting softnav for {}{}",
        config.site.origin,
        config.site.start_path
    );

    let network = HttpNetwork::new(&config.site.origin)?.with_default_tls();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    let mut session = runtime
        .block_on(Session::boot(network, config))
        .context("loading start page")?;
    println!("{}", commands::HELP);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        match runtime.block_on(session.execute(command)) {
            Ok(Flow::Continue) => {},
            Ok(Flow::Quit) => break,
            Err(e) => {
                log::error!("page load failed: {e}");
                println!("error: {e}");
            },
        }
    }

    log::info!("softnav exiting");
    Ok(())
}
