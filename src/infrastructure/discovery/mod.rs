//! Local agent discovery - probe a fixed localhost port range for Agent Cards
//!
//! A port counts as live when its well-known Agent Card URL answers 2xx
//! within a short probe timeout. Probes run sequentially in ascending port
//! order; every live port becomes an independent test target.

use std::time::Duration;

use reqwest::Client;

use crate::domain::entities::{AgentCard, AGENT_CARD_PATH};
use crate::infrastructure::report::color;

pub const DISCOVERY_PORT_START: u16 = 9001;
pub const DISCOVERY_PORT_END: u16 = 9020;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Probe `localhost:start_port..=end_port` and return the base URLs that
/// served an Agent Card, in ascending port order.
pub async fn discover_agents(start_port: u16, end_port: u16) -> Vec<String> {
    println!(
        "{}🔍 Discovering agents on localhost:{}-{}...{}\n",
        color::CYAN,
        start_port,
        end_port,
        color::RESET
    );

    let client = match Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build probe client: {}", e);
            return Vec::new();
        }
    };

    let mut discovered = Vec::new();
    for port in start_port..=end_port {
        let url = format!("http://localhost:{}", port);
        let probe = format!("{}{}", url, AGENT_CARD_PATH);
        match client.get(&probe).send().await {
            Ok(response) if response.status().is_success() => {
                let name = response
                    .json::<AgentCard>()
                    .await
                    .ok()
                    .and_then(|card| card.name)
                    .unwrap_or_else(|| "unknown".to_string());
                println!(
                    "  {}✅{} Found: {} at {}",
                    color::GREEN,
                    color::RESET,
                    name,
                    url
                );
                discovered.push(url);
            }
            Ok(response) => {
                tracing::debug!("Port {} answered {} for the card", port, response.status());
            }
            Err(e) => {
                tracing::debug!("Port {} not reachable: {}", port, e);
            }
        }
    }

    println!(
        "\n{}Found {} agent(s){}\n",
        color::CYAN,
        discovered.len(),
        color::RESET
    );
    discovered
}
