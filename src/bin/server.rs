//! Coach API server binary.
//! Run with: cargo run --bin coachbot-server

use std::process::ExitCode;

use coachbot_engine::start_coachbot;

fn main() -> ExitCode {
    start_coachbot::run()
}
