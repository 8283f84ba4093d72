//! Terminal client for the AgentCore demo server.
//!
//! Run with: cargo run -p agentcore-demo-cli -- create-stm
//!
//! Streams each step's events to the terminal and remembers the resources
//! it created in a local state file, so later commands can refer to them.

mod client;

use std::path::PathBuf;

use agentcore_demo_core::{StreamEvent, session::steps};
use agentcore_demo_transport::{FileMirrorStorage, MirrorStorage, StateMirror};
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::ApiClient;

#[derive(Debug, Parser)]
#[command(name = "agentcore-demo", about = "Drive the AgentCore demo server from a terminal")]
struct Cli {
    /// Server base URL.
    #[arg(long, env = "AGENTCORE_DEMO_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Session the created resources are bound to.
    #[arg(long, env = "AGENTCORE_DEMO_SESSION", default_value = "cli")]
    session: String,

    /// Directory for the local state file.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a short-term memory.
    CreateStm {
        #[arg(long)]
        name: Option<String>,
    },
    /// Create a long-term memory with extraction strategies.
    CreateLtm {
        #[arg(long)]
        name: Option<String>,
    },
    /// Store one user/assistant exchange in the short-term memory.
    Remember { user: String, assistant: String },
    /// Search the long-term memory.
    Search { query: String },
    /// Deploy an agent runtime.
    Deploy {
        #[arg(long, default_value = "code", value_parser = ["code", "container"])]
        deployment_type: String,
        #[arg(long)]
        agent_name: Option<String>,
    },
    /// Show the deployed runtime's status.
    Status,
    /// Send a prompt to the deployed runtime.
    Invoke {
        prompt: String,
        /// Conversation id on the runtime side; at least 33 characters.
        #[arg(long)]
        runtime_session_id: Option<String>,
    },
    /// Delete the deployed runtime.
    Cleanup,
    /// Run Python in a fresh code interpreter sandbox.
    Execute { code: String },
    /// Print the locally remembered resources.
    State,
    /// Forget the session locally and on the server.
    Forget,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let storage = match &cli.state_dir {
        Some(dir) => FileMirrorStorage::new(dir),
        None => FileMirrorStorage::default_location().context("no place for the state file")?,
    };
    tracing::debug!(dir = %storage.dir().display(), session = %cli.session, "loading state mirror");
    let mut mirror = StateMirror::load(storage, &cli.session).await;
    let client = ApiClient::new(&cli.server)?;

    run(&client, &mut mirror, &cli.session, cli.command).await
}

async fn run<S: MirrorStorage>(
    client: &ApiClient,
    mirror: &mut StateMirror<S>,
    session: &str,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::CreateStm { name } => {
            let mut query = vec![("session_id", session)];
            if let Some(name) = name.as_deref() {
                query.push(("name", name));
            }
            follow(client, mirror, steps::CREATE_STM, "/api/memory/create-stm-stream", &query).await
        }
        Command::CreateLtm { name } => {
            let mut query = vec![("session_id", session)];
            if let Some(name) = name.as_deref() {
                query.push(("name", name));
            }
            follow(client, mirror, steps::CREATE_LTM, "/api/memory/create-ltm-stream", &query).await
        }
        Command::Deploy {
            deployment_type,
            agent_name,
        } => {
            let mut query = vec![
                ("session_id", session),
                ("deployment_type", deployment_type.as_str()),
            ];
            if let Some(name) = agent_name.as_deref() {
                query.push(("agent_name", name));
            }
            follow(client, mirror, steps::DEPLOY, "/api/runtime/deploy-stream", &query).await
        }
        Command::Remember { user, assistant } => {
            let Some(memory_id) = mirror.state().stm_memory_id.clone() else {
                bail!("no short-term memory yet; run `create-stm` first");
            };
            let reply = client
                .post(
                    "/api/memory/stm/turns",
                    &json!({
                        "session_id": session,
                        "memory_id": memory_id,
                        "turns": [
                            {"role": "USER", "text": user},
                            {"role": "ASSISTANT", "text": assistant},
                        ],
                    }),
                )
                .await?;
            print_reply(&reply);
            Ok(())
        }
        Command::Search { query } => {
            let Some(memory_id) = mirror.state().ltm_memory_id.clone() else {
                bail!("no long-term memory yet; run `create-ltm` first");
            };
            let reply = client
                .post(
                    "/api/memory/ltm/search",
                    &json!({"session_id": session, "memory_id": memory_id, "query": query}),
                )
                .await?;
            if reply["available"] == Value::Bool(false) {
                println!("{}", reply["message"].as_str().unwrap_or("nothing extracted yet"));
                return Ok(());
            }
            for record in reply["records"].as_array().into_iter().flatten() {
                println!("- {}", record["text"].as_str().unwrap_or_default());
            }
            Ok(())
        }
        Command::Status => {
            let Some(runtime_id) = mirror.state().runtime_id.clone() else {
                bail!("no runtime deployed; run `deploy` first");
            };
            let reply = client
                .post(
                    "/api/runtime/status",
                    &json!({
                        "session_id": session,
                        "runtime_id": runtime_id,
                        "runtime_version": mirror.state().runtime_version,
                    }),
                )
                .await?;
            println!("{runtime_id}: {}", reply["runtime_status"].as_str().unwrap_or("UNKNOWN"));
            Ok(())
        }
        Command::Invoke {
            prompt,
            runtime_session_id,
        } => {
            let state = mirror.state();
            let Some(runtime_arn) = state.runtime_arn.clone() else {
                bail!("no runtime deployed; run `deploy` first");
            };
            let runtime_session_id =
                runtime_session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let reply = client
                .post(
                    "/api/runtime/invoke",
                    &json!({
                        "session_id": session,
                        "runtime_arn": runtime_arn,
                        "runtime_session_id": runtime_session_id,
                        "prompt": prompt,
                        "deployment_type": state.deployment_type.as_deref().unwrap_or("code"),
                    }),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&reply["response"])?);
            println!("({})", reply["execution_time"].as_str().unwrap_or_default());
            Ok(())
        }
        Command::Cleanup => {
            let Some(runtime_id) = mirror.state().runtime_id.clone() else {
                bail!("no runtime deployed");
            };
            let reply = client
                .post(
                    "/api/runtime/cleanup",
                    &json!({"session_id": session, "runtime_id": runtime_id}),
                )
                .await?;
            mirror.state_mut().clear_runtime();
            mirror.save().await?;
            print_reply(&reply);
            Ok(())
        }
        Command::Execute { code } => {
            let reply = client
                .post(
                    "/api/code-interpreter/execute",
                    &json!({"session_id": session, "code": code}),
                )
                .await?;
            if let Some(id) = reply["sandbox_id"].as_str() {
                mirror.state_mut().code_session_id = Some(id.to_string());
                mirror.save().await?;
            }
            println!("{}", reply["output"].as_str().unwrap_or_default());
            Ok(())
        }
        Command::State => {
            println!("{}", serde_json::to_string_pretty(mirror.state())?);
            Ok(())
        }
        Command::Forget => {
            client.delete(&format!("/api/sessions/{session}")).await?;
            mirror.clear().await?;
            println!("Session {session} forgotten");
            Ok(())
        }
    }
}

/// Stream a step to the terminal and remember what it created.
async fn follow<S: MirrorStorage>(
    client: &ApiClient,
    mirror: &mut StateMirror<S>,
    step: &str,
    path: &str,
    query: &[(&str, &str)],
) -> anyhow::Result<()> {
    let outcome = client
        .stream_step(path, query, |event| {
            if let Some(line) = render_event(event) {
                println!("{line}");
            }
        })
        .await?;
    if mirror.absorb(step, &outcome).await? {
        tracing::debug!(step, "state file updated");
    }
    if !outcome.success {
        bail!("{step} failed: {}", outcome.message);
    }
    Ok(())
}

/// Terminal rendering of one stream event; failures already arrive as a
/// `log` line, so failed results print nothing.
fn render_event(event: &StreamEvent) -> Option<String> {
    match event {
        StreamEvent::Log(line) => Some(line.clone()),
        StreamEvent::Code(snippet) => Some(
            snippet
                .lines()
                .map(|l| format!("    {l}"))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        StreamEvent::Result(outcome) if outcome.success => Some(format!(
            "✅ {} [{}]",
            outcome.message, outcome.elapsed_time
        )),
        StreamEvent::Result(_) => None,
    }
}

fn print_reply(reply: &Value) {
    match reply["message"].as_str() {
        Some(message) => println!("{message}"),
        None => println!("{reply}"),
    }
}

#[cfg(test)]
mod tests {
    use agentcore_demo_core::RelayOutcome;
    use agentcore_demo_transport::MemoryMirrorStorage;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::*;

    #[test]
    fn test_render_event() {
        assert_eq!(render_event(&StreamEvent::Log("hi".into())).as_deref(), Some("hi"));
        assert_eq!(
            render_event(&StreamEvent::Code("a\nb".into())).as_deref(),
            Some("    a\n    b")
        );
        assert_eq!(render_event(&StreamEvent::Result(RelayOutcome::failure("x"))), None);
    }

    #[tokio::test]
    async fn test_deploy_updates_mirror_and_cleanup_clears_it() {
        let server = MockServer::start().await;
        let result = json!({
            "success": true,
            "message": "Runtime deployed",
            "elapsed_time": "2.0s",
            "runtime_arn": "arn:aws:bedrock-agentcore:us-west-2:1:runtime/demo-1",
            "runtime_id": "demo-1",
            "runtime_version": "1",
            "agent_name": "demo",
            "deployment_type": "container"
        });
        Mock::given(method("GET"))
            .and(path("/api/runtime/deploy-stream"))
            .and(query_param("deployment_type", "container"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                format!("event: log\ndata: deploying\n\nevent: result\ndata: {result}\n\n"),
                "text/event-stream",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/runtime/cleanup"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": "success", "message": "Runtime demo-1 deleted"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let mut mirror = StateMirror::load(MemoryMirrorStorage::new(), "cli").await;

        run(
            &client,
            &mut mirror,
            "cli",
            Command::Deploy {
                deployment_type: "container".into(),
                agent_name: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(mirror.state().runtime_id.as_deref(), Some("demo-1"));
        assert_eq!(mirror.state().deployment_type.as_deref(), Some("container"));

        run(&client, &mut mirror, "cli", Command::Cleanup).await.unwrap();
        assert_eq!(mirror.state().runtime_id, None);
    }

    #[tokio::test]
    async fn test_failed_step_is_an_error_and_keeps_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "event: log\ndata: ❌ boom\n\nevent: result\ndata: {\"success\":false,\"message\":\"boom\"}\n\n",
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let mut mirror = StateMirror::load(MemoryMirrorStorage::new(), "cli").await;
        let err = run(&client, &mut mirror, "cli", Command::CreateStm { name: None })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(mirror.state().stm_memory_id, None);
    }

    #[tokio::test]
    async fn test_invoke_requires_deployed_runtime() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut mirror = StateMirror::load(MemoryMirrorStorage::new(), "cli").await;
        let err = run(
            &client,
            &mut mirror,
            "cli",
            Command::Invoke {
                prompt: "hi".into(),
                runtime_session_id: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("deploy"));
    }
}
