// Spiritual Quest CLI Entry Point
// Line-oriented REPL over a single guidance session

use anyhow::Context;
use spiritual_quest_core::actors::embedding::embedder_from_config;
use spiritual_quest_core::actors::llm::completer_from_config;
use spiritual_quest_core::models::Role;
use spiritual_quest_core::preflight::run_preflight_checks;
use spiritual_quest_core::telemetry::init_telemetry;
use spiritual_quest_core::{QuestConfig, QuestSupervisor};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, warn};

const BANNER: &str = "Spiritual Quest - type 'exit' to quit, 'clear' to start over, 'history' to review.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = QuestConfig::from_env().context("Invalid configuration")?;
    init_telemetry(config.log_format)?;

    let report = run_preflight_checks(&config).await;
    if !report.all_passed {
        warn!("Preflight: {}", report.summary);
    }

    let embedder = embedder_from_config(&config).context("Failed to start embedding backend")?;
    let completer = completer_from_config(&config).context("Failed to start completion backend")?;
    let supervisor = QuestSupervisor::bootstrap(config, embedder, completer)
        .await
        .map_err(|e| {
            error!("Bootstrap failed: {}", e);
            e
        })
        .context("Failed to bootstrap the guidance agent")?;

    let session_id = supervisor.open_session().await?;
    println!("{}", BANNER);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => break,
            "clear" => {
                supervisor.reset(&session_id).await?;
                println!("Conversation cleared.");
            }
            "history" => {
                for message in supervisor.history(&session_id).await? {
                    let speaker = match message.role {
                        Role::User => "You",
                        Role::Assistant => "Guide",
                    };
                    println!("{}: {}", speaker, message.content);
                }
            }
            _ => {
                let reply = supervisor.chat(&session_id, input).await?;
                println!("\nGuide: {}", reply);
            }
        }
    }

    supervisor.shutdown().await;
    println!("Farewell.");
    Ok(())
}
