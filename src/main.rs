use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

mod application;
mod domain;
mod infrastructure;

use application::errors::ConfigError;
use application::tester::{AgentTester, TestOptions};
use domain::entities::{RunStatus, TestRun};
use infrastructure::a2a::HttpA2aClient;
use infrastructure::discovery::{discover_agents, DISCOVERY_PORT_END, DISCOVERY_PORT_START};
use infrastructure::report;
use infrastructure::report::color;

#[derive(Parser)]
#[command(name = "a2a-probe")]
#[command(about = "Conformance tester for A2A protocol agents", long_about = None)]
struct Cli {
    /// Agent URL (e.g., http://localhost:9014); omit with --discover
    url: Option<String>,

    /// Test message to send
    #[arg(short, long)]
    message: Option<String>,

    /// Expected keywords in the response
    #[arg(short, long, num_args = 1..)]
    keywords: Vec<String>,

    /// Print retained response payloads
    #[arg(short, long)]
    verbose: bool,

    /// Auto-discover and test all local agents
    #[arg(long)]
    discover: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::from(2);
        }
    };

    match rt.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}Error:{} {}", color::RED, color::RESET, e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, ConfigError> {
    let options = TestOptions {
        message: cli.message.unwrap_or_else(|| {
            application::tester::DEFAULT_MESSAGE.to_string()
        }),
        keywords: cli.keywords,
        verbose: cli.verbose,
        timeout: Duration::from_secs(cli.timeout),
    };

    if cli.discover {
        let urls = discover_agents(DISCOVERY_PORT_START, DISCOVERY_PORT_END).await;
        if urls.is_empty() {
            println!("{}No agents found{}", color::RED, color::RESET);
            return Ok(ExitCode::from(1));
        }

        let mut runs = Vec::with_capacity(urls.len());
        for url in &urls {
            runs.push(test_agent(url, &options).await?);
        }
        report::print_combined_summary(&runs);

        let all_passed = runs.iter().all(|r| r.overall() == RunStatus::Passed);
        return Ok(exit_code(all_passed));
    }

    let url = cli.url.ok_or(ConfigError::MissingUrl)?;
    let url = validate_url(&url)?;
    let run = test_agent(&url, &options).await?;
    Ok(exit_code(run.overall() == RunStatus::Passed))
}

/// One atomic report block per target: header, per-check lines, summary
async fn test_agent(url: &str, options: &TestOptions) -> Result<TestRun, ConfigError> {
    let client = HttpA2aClient::new(url, options.timeout)
        .map_err(|e| ConfigError::ClientInit(e.to_string()))?;

    report::print_header(&format!("Testing Agent: {}", url));

    let tester = AgentTester::new(url, client, options.clone());
    let run = tester.run_all_tests().await;

    for result in &run.results {
        report::print_result(result);
    }
    report::print_summary(&run);
    Ok(run)
}

fn validate_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = reqwest::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            })
        }
    }

    Ok(raw.trim_end_matches('/').to_string())
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_urls_are_accepted() {
        assert_eq!(
            validate_url("http://localhost:9014").unwrap(),
            "http://localhost:9014"
        );
        assert_eq!(
            validate_url("https://agent.example/").unwrap(),
            "https://agent.example"
        );
    }

    #[test]
    fn malformed_url_is_a_config_error() {
        assert!(matches!(
            validate_url("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(matches!(
            validate_url("ftp://localhost:9014"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
