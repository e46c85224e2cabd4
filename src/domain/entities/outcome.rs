//! Check outcomes - per-check results and the per-target run that owns them

use std::time::Duration;

use serde_json::Value;

/// Outcome of a single conformance check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

impl TestStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✅",
            TestStatus::Fail => "❌",
            TestStatus::Warn => "⚠️",
            TestStatus::Skip => "⏭️",
        }
    }
}

/// One check's result. Created once the check finishes, immutable after.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: &'static str,
    pub status: TestStatus,
    pub duration: Duration,
    pub message: String,
    /// Raw payload behind the result, retained only in verbose mode
    pub payload: Option<Value>,
}

impl TestResult {
    pub fn new(
        name: &'static str,
        status: TestStatus,
        duration: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            status,
            duration,
            message: message.into(),
            payload: None,
        }
    }

    pub fn skipped(name: &'static str, message: impl Into<String>) -> Self {
        Self::new(name, TestStatus::Skip, Duration::ZERO, message)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Overall verdict for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

/// Per-status tallies across a run's results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub passed: usize,
    pub failed: usize,
    pub warned: usize,
    pub skipped: usize,
}

/// One invocation of the full check sequence against one agent URL
#[derive(Debug, Clone)]
pub struct TestRun {
    pub url: String,
    pub results: Vec<TestResult>,
}

impl TestRun {
    pub fn new(url: impl Into<String>, results: Vec<TestResult>) -> Self {
        Self {
            url: url.into(),
            results,
        }
    }

    /// PASSED iff no check failed; WARN and SKIP do not block a pass
    pub fn overall(&self) -> RunStatus {
        if self.results.iter().any(|r| r.status == TestStatus::Fail) {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        }
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for result in &self.results {
            match result.status {
                TestStatus::Pass => counts.passed += 1,
                TestStatus::Fail => counts.failed += 1,
                TestStatus::Warn => counts.warned += 1,
                TestStatus::Skip => counts.skipped += 1,
            }
        }
        counts
    }

    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }
}
