//! Audit logging for handled requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::input::Request;
use crate::outcome::Outcome;

const SUMMARY_LIMIT: usize = 200;

/// An audit log entry.
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
    /// Operation that was requested.
    pub op: String,
    /// Whether the escaper rejected the input.
    pub rejected: bool,
    /// Reason for the rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Summary of the input.
    pub summary: String,
}

impl AuditEntry {
    /// Create a new audit entry from a request and its outcome.
    pub fn new(request: &Request, outcome: &Outcome) -> Self {
        let reason = outcome.reject_info().map(|info| info.reason.clone());
        Self {
            timestamp: Utc::now(),
            op: request.op_name().to_string(),
            rejected: reason.is_some(),
            reason,
            summary: truncate_string(&request.subject(), SUMMARY_LIMIT),
        }
    }
}

fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}

/// Audit logger for writing entries to a file.
pub struct AuditLogger {
    file: File,
}

impl AuditLogger {
    /// Open or create an audit log file.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Write an audit entry to the log.
    pub fn log(&mut self, entry: &AuditEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()
    }

    /// Log the outcome of a request.
    pub fn log_outcome(&mut self, request: &Request, outcome: &Outcome) -> std::io::Result<()> {
        let entry = AuditEntry::new(request, outcome);
        self.log(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::EscapeError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_audit_entry_split() {
        let request = Request::parse(r#"{"op":"split","input":"ls -la"}"#).unwrap();
        let outcome = Outcome::Tokens(vec!["ls".to_string(), "-la".to_string()]);
        let entry = AuditEntry::new(&request, &outcome);

        assert_eq!(entry.op, "split");
        assert!(!entry.rejected);
        assert!(entry.reason.is_none());
        assert_eq!(entry.summary, "ls -la");
    }

    #[test]
    fn test_audit_entry_rejected() {
        let request = Request::parse(r#"{"op":"escape","value":"a\u0000"}"#).unwrap();
        let outcome = Outcome::rejected(EscapeError::NullByte);
        let entry = AuditEntry::new(&request, &outcome);

        assert_eq!(entry.op, "escape");
        assert!(entry.rejected);
        assert_eq!(entry.reason.as_deref(), Some("Input contains null-bytes"));
    }

    #[test]
    fn test_audit_logger() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut logger = AuditLogger::open(temp_file.path()).unwrap();

        let request = Request::parse(r#"{"op":"normalize","argv":["-ab"]}"#).unwrap();
        let outcome = Outcome::Argv(vec!["-ab".to_string()]);
        logger.log_outcome(&request, &outcome).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"op\":\"normalize\""));
        assert!(content.contains("\"rejected\":false"));
    }

    #[test]
    fn test_truncate_summary() {
        let long_input = "a".repeat(300);
        let json = format!(r#"{{"op":"split","input":"{}"}}"#, long_input);
        let request = Request::parse(&json).unwrap();
        let entry = AuditEntry::new(&request, &Outcome::Tokens(vec![long_input]));

        assert_eq!(entry.summary.chars().count(), SUMMARY_LIMIT);
        assert!(entry.summary.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "é".repeat(250);
        let truncated = truncate_string(&s, 200);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 200);
    }
}
