//! Gauge JSON-lines host
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr.
//!
//! Requests:
//! - parse: `{"op":"parse","kind":"MassFlow","text":"12.5 kg/s"}`
//! - format: `{"op":"format","kind":"Length","value":1.5,"unit":"m","format":"F2 mm"}`
//! - verify: `{"op":"verify","kind":"Length","format":"F2 mm"}`
//! - units: `{"op":"units","kind":"Length"}`
//!
//! Environment: `GAUGE_CULTURE`, `GAUGE_UNIT_INPUT`, `GAUGE_ALLOW_THOUSANDS`.

mod config;
mod handler;

use std::env;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;
use config::Config;
use handler::{handle_line, Response};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env();
    tracing::info!(
        version = SERVER_VERSION,
        culture = %config.culture.name,
        unit_input = %config.unit_input,
        allow_thousands = config.allow_thousands,
        "gauge started"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = serve(stdin.lock(), stdout.lock(), &config) {
        tracing::error!(error = %e, "i/o failure");
    }

    tracing::info!("gauge shutting down");
}

/// Answer requests until EOF
fn serve(reader: impl BufRead, mut writer: impl Write, config: &Config) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        tracing::debug!(bytes = line.len(), "request received");
        let response = handle_line(line, config);
        write_response(&mut writer, &response)?;
    }
    tracing::debug!("input closed");
    Ok(())
}

fn write_response(writer: &mut impl Write, response: &Response) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()
}
