//! Startup self-check for scoring deployments.
//!
//! Validates configuration and, with `--ping`, round-trips a tiny JSON
//! prompt through the configured model.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vscore_engine::ScoringConfig;
use vscore_firestore::FirestoreConfig;
use vscore_llm::{parse_llm_json, GeminiClient, LlmClient, LlmConfig, LlmRequest};

const PING_PROMPT: &str =
    r#"Reply with JSON only: {"status": "ok", "gates": ["partner_safety", "funnel_match"]}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let ping = std::env::args().skip(1).any(|a| a == "--ping");

    let scoring = ScoringConfig::from_env();
    info!(?scoring, "Scoring config");
    println!(
        "score-selfcheck: scoring_version={} ai_gates_fail_open={}",
        scoring.scoring_version, scoring.ai_gates_fail_open
    );

    ensure_env_present(&["GEMINI_API_KEY"])?;
    let llm_config = LlmConfig::from_env();
    let primary = llm_config
        .primary_model()
        .ok_or_else(|| anyhow::anyhow!("LLM_MODELS resolved to an empty model list"))?;
    println!("score-selfcheck: primary model {}", primary);

    match FirestoreConfig::from_env() {
        Ok(fs) => println!(
            "score-selfcheck: firestore project={} database={}",
            fs.project_id, fs.database_id
        ),
        Err(e) => println!("score-selfcheck: firestore not configured ({}), using in-memory store", e),
    }

    if ping {
        ping_llm(llm_config).await?;
    }

    println!("score-selfcheck: ok");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("vscore=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn ping_llm(config: LlmConfig) -> anyhow::Result<()> {
    let client = GeminiClient::new(config)?;
    let reply = client.complete(&LlmRequest::json(PING_PROMPT, 128)).await?;
    let parsed = parse_llm_json(&reply)?;

    if parsed.value.get("status").and_then(|s| s.as_str()) != Some("ok") {
        return Err(anyhow::anyhow!("ping reply missing status=ok: {}", parsed.value));
    }
    println!(
        "score-selfcheck: ping ok via {} ({:?} parse)",
        client.model_name(),
        parsed.stage
    );
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).map(|v| v.trim().is_empty()).unwrap_or(true) {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
