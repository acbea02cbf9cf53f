//! shell-argv entry point: one JSON request on stdin, one response out.

use shell_argv::audit::AuditLogger;
use shell_argv::config::Config;
use shell_argv::handler::handle;
use shell_argv::input::Request;
use shell_argv::outcome::Outcome;
use shell_argv::output::{format_rejection, format_response};

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

fn fail(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("ERROR: {}", message);
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let mut input_str = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input_str) {
        return fail(format!("failed to read stdin: {}", e));
    }

    let request = match Request::parse(&input_str) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let cwd = request.cwd.as_deref().map(Path::new);
    let config = match Config::load(cwd) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    let compiled = match config.compile() {
        Ok(c) => c,
        Err(e) => return fail(format!("config error: {}", e)),
    };

    let outcome = match handle(&request, &compiled) {
        Ok(o) => o,
        Err(e) => return fail(e),
    };

    // Audit failures never change the exit status.
    if compiled.raw.audit.enabled {
        if let Some(path) = &compiled.raw.audit.path {
            if let Ok(mut logger) = AuditLogger::open(Path::new(path)) {
                let _ = logger.log_outcome(&request, &outcome);
            }
        }
    }

    match &outcome {
        Outcome::Rejected(info) => {
            eprintln!("{}", format_rejection(info));
            ExitCode::from(2)
        }
        _ => {
            println!("{}", format_response(&outcome));
            ExitCode::SUCCESS
        }
    }
}
