//! The four conformance checks and their orchestration
//!
//! Checks run strictly in order: Agent Card, Protocol Compliance (assertions
//! over the fetched card), Message Send, Response Quality (assertions over
//! the extracted reply). A failed card check skips everything downstream;
//! network errors become FAIL results and never abort the run.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::{json, Value};

use crate::domain::entities::{AgentCard, TestResult, TestRun, TestStatus};
use crate::infrastructure::a2a::{extract_reply, A2aEndpoint};

pub const CHECK_AGENT_CARD: &str = "Agent Card";
pub const CHECK_PROTOCOL_COMPLIANCE: &str = "Protocol Compliance";
pub const CHECK_MESSAGE_SEND: &str = "Message Send";
pub const CHECK_RESPONSE_QUALITY: &str = "Response Quality";

/// Sent when the caller does not configure a message
pub const DEFAULT_MESSAGE: &str = "Hello! This is a connectivity check, please reply.";

/// Minimum reply length (bytes) for the quality check
const MIN_REPLY_LENGTH: usize = 10;

/// Reply preview retained in verbose payloads, in characters
const REPLY_PREVIEW_CHARS: usize = 500;

static PROTOCOL_0X: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0\.\d+").unwrap());

/// Per-run configuration
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub message: String,
    pub keywords: Vec<String>,
    pub verbose: bool,
    pub timeout: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            message: DEFAULT_MESSAGE.to_string(),
            keywords: Vec::new(),
            verbose: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Outcome of one sub-assertion inside a compound check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubCheck {
    Pass,
    /// Expected-but-optional field not present; downgrades the check to WARN
    Absent,
    /// Present field with an invalid value; fails the check
    Invalid,
}

type SubCheckRow = (&'static str, SubCheck, String);

fn roll_up(rows: &[SubCheckRow]) -> (TestStatus, String) {
    let passed = rows.iter().filter(|(_, s, _)| *s == SubCheck::Pass).count();
    let status = if rows.iter().any(|(_, s, _)| *s == SubCheck::Invalid) {
        TestStatus::Fail
    } else if rows.iter().any(|(_, s, _)| *s == SubCheck::Absent) {
        TestStatus::Warn
    } else {
        TestStatus::Pass
    };
    (status, format!("{}/{} checks passed", passed, rows.len()))
}

fn sub_check_payload(rows: &[SubCheckRow]) -> Value {
    let mut map = serde_json::Map::new();
    for (name, _, detail) in rows {
        map.insert(name.to_string(), Value::String(detail.clone()));
    }
    Value::Object(map)
}

/// Compliance assertions over an already-fetched Agent Card
fn compliance_rows(card: &AgentCard) -> Vec<SubCheckRow> {
    let mut rows = Vec::new();

    let version = card.protocol_version.as_deref().unwrap_or("");
    if PROTOCOL_0X.is_match(version) {
        rows.push(("Protocol version", SubCheck::Pass, version.to_string()));
    } else {
        rows.push((
            "Protocol version",
            SubCheck::Invalid,
            format!("Unsupported: {}", version),
        ));
    }

    match card.streaming_capability() {
        None => rows.push((
            "Streaming capability",
            SubCheck::Absent,
            "Not declared".to_string(),
        )),
        Some(value) if value.is_boolean() => rows.push((
            "Streaming capability",
            SubCheck::Pass,
            format!("Enabled: {}", value),
        )),
        Some(value) => rows.push((
            "Streaming capability",
            SubCheck::Invalid,
            format!("Not a boolean: {}", value),
        )),
    }

    match card.provider.as_ref() {
        None => rows.push(("Provider info", SubCheck::Absent, "Missing".to_string())),
        Some(provider) => {
            let organization = provider
                .get("organization")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty());
            let url = provider
                .get("url")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty());
            match (organization, url) {
                (Some(org), Some(url)) => rows.push((
                    "Provider info",
                    SubCheck::Pass,
                    format!("{} ({})", org, url),
                )),
                _ => rows.push((
                    "Provider info",
                    SubCheck::Invalid,
                    "Missing organization or url".to_string(),
                )),
            }
        }
    }

    rows
}

/// Quality assertions over the extracted reply text
fn quality_rows(text: &str, keywords: &[String]) -> Vec<SubCheckRow> {
    let mut rows = Vec::new();

    if text.len() > MIN_REPLY_LENGTH {
        rows.push((
            "Response length",
            SubCheck::Pass,
            format!("{} chars", text.chars().count()),
        ));
    } else {
        rows.push(("Response length", SubCheck::Invalid, "Too short".to_string()));
    }

    // No keywords configured: vacuously satisfied, not counted
    if !keywords.is_empty() {
        let found: Vec<&String> = keywords.iter().filter(|kw| text.contains(kw.as_str())).collect();
        if found.len() == keywords.len() {
            rows.push((
                "Expected keywords",
                SubCheck::Pass,
                format!("{}/{} found", found.len(), keywords.len()),
            ));
        } else {
            let missing: Vec<&str> = keywords
                .iter()
                .filter(|kw| !text.contains(kw.as_str()))
                .map(String::as_str)
                .collect();
            rows.push((
                "Expected keywords",
                SubCheck::Absent,
                format!(
                    "{}/{} found, missing: {}",
                    found.len(),
                    keywords.len(),
                    missing.join(", ")
                ),
            ));
        }
    }

    rows
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Runs the check sequence against one agent
pub struct AgentTester<C> {
    url: String,
    client: C,
    options: TestOptions,
}

impl<C: A2aEndpoint> AgentTester<C> {
    pub fn new(url: impl Into<String>, client: C, options: TestOptions) -> Self {
        Self {
            url: url.into(),
            client,
            options,
        }
    }

    /// Run all four checks in order and collect the results.
    ///
    /// Never fails for network or protocol reasons; those become FAIL
    /// results inside the returned run.
    pub async fn run_all_tests(&self) -> TestRun {
        let mut results = Vec::with_capacity(4);

        let (card_result, card) = self.check_agent_card().await;
        results.push(card_result);

        match card {
            Some(card) => {
                results.push(self.check_protocol_compliance(&card));

                let (send_result, reply) = self.check_message_send().await;
                results.push(send_result);

                match reply {
                    Some(text) => results.push(self.check_response_quality(&text)),
                    None => results.push(TestResult::skipped(
                        CHECK_RESPONSE_QUALITY,
                        "Skipped (no response text)",
                    )),
                }
            }
            None => {
                let reason = "Skipped (Agent Card check failed)";
                results.push(TestResult::skipped(CHECK_PROTOCOL_COMPLIANCE, reason));
                results.push(TestResult::skipped(CHECK_MESSAGE_SEND, reason));
                results.push(TestResult::skipped(CHECK_RESPONSE_QUALITY, reason));
            }
        }

        TestRun::new(self.url.clone(), results)
    }

    /// Check 1: fetch the Agent Card and validate its required fields.
    /// Returns the card only when the check passed, gating checks 2-4.
    async fn check_agent_card(&self) -> (TestResult, Option<AgentCard>) {
        let start = Instant::now();
        let fetched = self.client.fetch_agent_card().await;
        let duration = start.elapsed();

        let card = match fetched {
            Ok(card) => card,
            Err(e) => {
                let result = TestResult::new(
                    CHECK_AGENT_CARD,
                    TestStatus::Fail,
                    duration,
                    format!("Failed to retrieve Agent Card: {}", e),
                );
                return (result, None);
            }
        };

        let missing = card.missing_required_fields();
        if !missing.is_empty() {
            let mut result = TestResult::new(
                CHECK_AGENT_CARD,
                TestStatus::Fail,
                duration,
                format!("Missing required fields: {}", missing.join(", ")),
            );
            if self.options.verbose {
                result = result.with_payload(json!(card));
            }
            return (result, None);
        }

        let mut result = TestResult::new(
            CHECK_AGENT_CARD,
            TestStatus::Pass,
            duration,
            format!(
                "Agent: {} v{}",
                card.name.as_deref().unwrap_or(""),
                card.version.as_deref().unwrap_or("")
            ),
        );
        if self.options.verbose {
            result = result.with_payload(json!(card));
        }
        (result, Some(card))
    }

    /// Check 2: assertions over the card from check 1, no refetch
    fn check_protocol_compliance(&self, card: &AgentCard) -> TestResult {
        let start = Instant::now();
        let rows = compliance_rows(card);
        let (status, message) = roll_up(&rows);

        let mut result =
            TestResult::new(CHECK_PROTOCOL_COMPLIANCE, status, start.elapsed(), message);
        if self.options.verbose {
            result = result.with_payload(sub_check_payload(&rows));
        }
        result
    }

    /// Check 3: JSON-RPC message/send round trip.
    /// Returns the extracted reply text for check 4 when non-empty.
    async fn check_message_send(&self) -> (TestResult, Option<String>) {
        let start = Instant::now();
        let response = self.client.send_message(&self.options.message).await;
        let duration = start.elapsed();

        let body = match response {
            Ok(body) => body,
            Err(e) => {
                let result = TestResult::new(
                    CHECK_MESSAGE_SEND,
                    TestStatus::Fail,
                    duration,
                    format!("Error: {}", e),
                );
                return (result, None);
            }
        };

        let text = match extract_reply(&body) {
            Ok(text) => text,
            Err(reason) => {
                let mut result =
                    TestResult::new(CHECK_MESSAGE_SEND, TestStatus::Fail, duration, reason);
                if self.options.verbose {
                    result = result.with_payload(body);
                }
                return (result, None);
            }
        };

        if text.is_empty() {
            let mut result = TestResult::new(
                CHECK_MESSAGE_SEND,
                TestStatus::Fail,
                duration,
                "Response text is empty",
            );
            if self.options.verbose {
                result = result.with_payload(body);
            }
            return (result, None);
        }

        let mut result = TestResult::new(
            CHECK_MESSAGE_SEND,
            TestStatus::Pass,
            duration,
            format!(
                "Received response ({} chars) in {:.2}s",
                text.chars().count(),
                duration.as_secs_f64()
            ),
        );
        if self.options.verbose {
            result = result
                .with_payload(json!({"response": truncate_chars(&text, REPLY_PREVIEW_CHARS)}));
        }
        (result, Some(text))
    }

    /// Check 4: quality assertions over the reply from check 3
    fn check_response_quality(&self, text: &str) -> TestResult {
        let start = Instant::now();
        let rows = quality_rows(text, &self.options.keywords);
        let (status, message) = roll_up(&rows);

        let mut result =
            TestResult::new(CHECK_RESPONSE_QUALITY, status, start.elapsed(), message);
        if self.options.verbose {
            result = result.with_payload(sub_check_payload(&rows));
        }
        result
    }
}
