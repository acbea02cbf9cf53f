//! Response formatting for binary output.

use serde::Serialize;

use crate::outcome::{Outcome, RejectInfo};

/// JSON response written to stdout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Response<'a> {
    Tokens(&'a [String]),
    Escaped(&'a str),
    Argv(&'a [String]),
}

/// JSON body for rejections.
#[derive(Debug, Serialize)]
struct RejectResponse<'a> {
    rejected: bool,
    reason: &'a str,
    class: &'a str,
}

/// Format an outcome as a single-line JSON object.
pub fn format_response(outcome: &Outcome) -> String {
    let json = match outcome {
        Outcome::Tokens(tokens) => serde_json::to_string(&Response::Tokens(tokens)),
        Outcome::Escaped(escaped) => serde_json::to_string(&Response::Escaped(escaped)),
        Outcome::Argv(argv) => serde_json::to_string(&Response::Argv(argv)),
        Outcome::Rejected(info) => serde_json::to_string(&RejectResponse {
            rejected: true,
            reason: &info.reason,
            class: &info.class,
        }),
    };
    // Plain strings and string lists always serialize.
    json.unwrap_or_else(|_| "{}".to_string())
}

/// Format a rejection for stderr.
pub fn format_rejection(info: &RejectInfo) -> String {
    format!("REJECTED: {} ({})", info.reason, info.class)
}
