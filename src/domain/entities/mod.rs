pub mod card;
pub mod outcome;

pub use card::{AgentCard, AGENT_CARD_PATH};
pub use outcome::{RunStatus, StatusCounts, TestResult, TestRun, TestStatus};
