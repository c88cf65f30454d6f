//! skillhubctl - CLI client for skillhubd
//!
//! Lists skills, probes health, and calls a single skill on a running hub.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod client;
mod render;

use clap::{Parser, Subcommand};
use client::{Client, ClientError};
use serde_json::{Map, Value};
use skillhub_core::ErrorRecord;

/// CLI client for the skills hub.
#[derive(Parser)]
#[command(name = "skillhubctl")]
#[command(about = "Call skills on a running skills hub")]
#[command(version)]
struct Cli {
    /// Hub address
    #[arg(long, global = true, env = "SKILLHUB_ADDR", default_value = "http://127.0.0.1:8000")]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered skills grouped by provider
    Skills,

    /// Check hub health
    Health,

    /// Call a skill
    Call {
        /// Skill name, e.g. github_list_repos
        skill: String,

        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,

        /// Single param as key=value; value is parsed as JSON when valid (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        param: Vec<(String, Value)>,
    },
}

fn parse_param(s: &str) -> Result<(String, Value), String> {
    let Some((key, raw)) = s.split_once('=') else {
        return Err(format!("invalid param '{s}', expected key=value"));
    };
    if key.is_empty() {
        return Err(format!("invalid param '{s}', key is empty"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Merge `--params` with `--param` pairs; pairs win on key collisions.
fn build_params(
    params: Option<&str>,
    pairs: Vec<(String, Value)>,
) -> Result<Map<String, Value>, ClientError> {
    let mut map = match params {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ClientError::InvalidArgument(
                    "--params must be a JSON object".to_string(),
                ))
            }
            Err(e) => {
                return Err(ClientError::InvalidArgument(format!(
                    "--params is not valid JSON: {e}"
                )))
            }
        },
    };
    map.extend(pairs);
    Ok(map)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = Client::new(&cli.addr);

    if let Err(e) = client.wait_for_ready().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Skills => run_skills(&client).await,
        Command::Health => run_health(&client).await,
        Command::Call {
            skill,
            params,
            param,
        } => run_call(&client, &skill, params.as_deref(), param).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run_skills(client: &Client) -> Result<(), ClientError> {
    let info = client.info().await?;
    render::print_hub_info(&info);
    Ok(())
}

async fn run_health(client: &Client) -> Result<(), ClientError> {
    let health = client.health().await?;
    render::print_health(client.addr(), &health);
    Ok(())
}

async fn run_call(
    client: &Client,
    skill: &str,
    params: Option<&str>,
    pairs: Vec<(String, Value)>,
) -> Result<(), ClientError> {
    let params = build_params(params, pairs)?;
    let value = client.call_skill(skill, params).await?;

    if let Some(record) = ErrorRecord::from_value(&value) {
        return Err(ClientError::SkillFailed(record.error));
    }

    render::print_result(&value);
    Ok(())
}
