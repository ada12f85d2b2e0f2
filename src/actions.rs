//! GitHub Actions runner integration.
//!
//! Step outputs, workflow-command annotations and the triggering event payload.

use crate::config::EventConfig;
use crate::error::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Escape a workflow-command message
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow-command property value
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// `::error::` command for `message`
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Report a failure to the runner
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}

/// Writer for step outputs
#[derive(Debug, Clone, Default)]
pub struct StepOutputs {
    /// `GITHUB_OUTPUT` file; `None` outside a runner that provides one
    file: Option<PathBuf>,
}

impl StepOutputs {
    /// Create a writer appending to `file`, or printing legacy commands when `None`
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    /// Set the step output `name` to `value`
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        match &self.file {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(output_entry(name, value).as_bytes())?;
            }
            None => println!(
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            ),
        }
        log::debug!("Set output {}={}", name, value);
        Ok(())
    }
}

/// One `GITHUB_OUTPUT` entry; multi-line values use a heredoc block
fn output_entry(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{}={}\n", name, value);
    }

    let mut delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    while value.contains(&delimiter) {
        delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Load the triggering event payload.
///
/// The payload is informational only, so an unreadable file yields a warning.
pub fn load_event_payload(event: &EventConfig) -> Option<serde_json::Value> {
    let path = event.path.as_ref()?;
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("Could not read event payload {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(payload) => Some(payload),
        Err(e) => {
            log::warn!("Event payload {} is not valid JSON: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("50% done\nnext"), "50%25 done%0Anext");
        assert_eq!(escape_property("a:b,c"), "a%3Ab%2Cc");
    }

    #[test]
    fn test_error_command_single_line() {
        assert_eq!(
            error_command("Fail to download file https://x/y: reset\r\n"),
            "::error::Fail to download file https://x/y: reset%0D%0A"
        );
    }

    #[test]
    fn test_output_file_appends_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("output");
        let outputs = StepOutputs::new(Some(path.clone()));

        outputs.set("time", "14:05:09 GMT+0000").expect("first write");
        outputs.set("notes", "line one\nline two").expect("second write");

        let written = std::fs::read_to_string(&path).expect("output file");
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("time=14:05:09 GMT+0000"));

        let header = lines.next().expect("heredoc header");
        let delimiter = header.strip_prefix("notes<<").expect("heredoc form");
        assert_eq!(lines.next(), Some("line one"));
        assert_eq!(lines.next(), Some("line two"));
        assert_eq!(lines.next(), Some(delimiter));
    }

    #[test]
    fn test_load_event_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"ref":"refs/tags/v1.2.3"}"#).expect("write payload");

        let event = EventConfig {
            name: Some("push".to_string()),
            path: Some(path),
        };
        let payload = load_event_payload(&event).expect("payload");
        assert_eq!(payload["ref"], "refs/tags/v1.2.3");
    }

    #[test]
    fn test_unreadable_event_payload_is_not_fatal() {
        let event = EventConfig {
            name: None,
            path: Some(PathBuf::from("/nonexistent/event.json")),
        };
        assert!(load_event_payload(&event).is_none());
        assert!(load_event_payload(&EventConfig::default()).is_none());
    }
}
