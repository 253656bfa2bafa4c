use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod error;
mod model;
mod protocol;
mod services;

fn main() {
    let _ = dotenvy::dotenv();

    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let app = match protocol::App::from_env() {
        Ok(app) => app,
        Err(e) => {
            error!("failed to start: {e}");
            std::process::exit(1);
        }
    };
    info!("polyglot-core ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| app.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
