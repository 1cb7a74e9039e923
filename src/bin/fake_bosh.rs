//! Fake bosh CLI binary for integration testing
//!
//! Stands in for the real bosh CLI so the suite's invocation plumbing can
//! be exercised without a director. Behavior is scripted through a JSON
//! responses file keyed by subcommand; a value may be a single response or
//! a sequence consumed one invocation at a time (the last entry repeats):
//!
//! ```json
//! {
//!   "deploy": { "stdout": "...", "stderr": "...", "exit": 1 },
//!   "ssh": [ { "stdout": "1000\n" }, { "stdout": "12\n" } ]
//! }
//! ```
//!
//! Environment:
//! - `FAKE_BOSH_RESPONSES`: path to the responses file (optional; missing
//!   subcommands succeed silently)
//! - `FAKE_BOSH_STATE`: directory for per-subcommand invocation counters,
//!   required only when sequences are used
//! - `FAKE_BOSH_LOG`: path to append each received argv to, one line per
//!   invocation, for later assertions

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
struct Response {
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    #[serde(default)]
    exit: i32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scripted {
    One(Response),
    Seq(Vec<Response>),
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Ok(log_path) = std::env::var("FAKE_BOSH_LOG") {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .expect("open FAKE_BOSH_LOG");
        writeln!(file, "{}", args.join(" ")).expect("append to FAKE_BOSH_LOG");
    }

    let subcommand = find_subcommand(&args).unwrap_or_default();

    let response = match std::env::var("FAKE_BOSH_RESPONSES") {
        Ok(path) => {
            let content = std::fs::read_to_string(&path).expect("read FAKE_BOSH_RESPONSES");
            let mut responses: HashMap<String, Scripted> =
                serde_json::from_str(&content).expect("parse FAKE_BOSH_RESPONSES");
            match responses.remove(&subcommand) {
                Some(Scripted::One(response)) => response,
                Some(Scripted::Seq(seq)) if !seq.is_empty() => {
                    let call = bump_counter(&subcommand);
                    seq[call.min(seq.len() - 1)].clone()
                }
                _ => Response::default(),
            }
        }
        Err(_) => Response::default(),
    };

    print!("{}", response.stdout);
    eprint!("{}", response.stderr);
    std::process::exit(response.exit);
}

/// Read, increment and persist the invocation counter for a subcommand
fn bump_counter(subcommand: &str) -> usize {
    let state_dir = std::env::var("FAKE_BOSH_STATE")
        .expect("FAKE_BOSH_STATE must be set when sequence responses are used");
    let path = Path::new(&state_dir).join(format!("{subcommand}.calls"));
    let current: usize = std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    std::fs::write(&path, (current + 1).to_string()).expect("write call counter");
    current
}

/// First token after the global flags (`-n`, `-d <name>`, `--column=...`)
fn find_subcommand(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-n" => continue,
            "-d" => {
                iter.next();
            }
            flag if flag.starts_with("--") => continue,
            subcommand => return Some(subcommand.to_string()),
        }
    }
    None
}
