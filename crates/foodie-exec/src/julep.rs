//! Julep REST adapter
//!
//! Tasks are registered under a pre-provisioned agent the first time a given
//! task definition is submitted; later submissions of the same definition
//! reuse the task id and only create a new execution. Only submissions of the
//! same definition wait on one another's registration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use foodie_config::Config;
use foodie_model::{ExecutionInput, TaskDefinition};
use foodie_utils::http_client::{HttpClient, decode_json};
use foodie_utils::{ConfigError, TourError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::service::{ExecutionService, JobHandle, JobResult};

const SERVICE_NAME: &str = "julep";

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Serialize)]
struct CreateExecution<'a> {
    input: &'a ExecutionInput,
}

#[derive(Debug, Deserialize)]
struct ExecutionRecord {
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the Julep tasks/executions API
pub struct JulepClient {
    client: HttpClient,
    base_url: Url,
    api_key: String,
    agent_id: String,
    /// Registered task ids keyed by task definition fingerprint
    task_ids: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl JulepClient {
    pub fn new(client: HttpClient, base_url: Url, api_key: String, agent_id: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            agent_id,
            task_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Build from the `[execution]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - No agent id is configured
    /// - The base URL is malformed or the HTTP client cannot be constructed
    pub fn from_config(config: &Config) -> Result<Self, TourError> {
        let api_key = config.api_key()?;
        let agent_id = config
            .agent_id()
            .ok_or_else(|| {
                ConfigError::MissingRequired(
                    "execution.agent_id (set [execution] agent_id or pass --agent-id)".to_string(),
                )
            })?
            .to_string();
        let base_url = Url::parse(config.execution_base_url()).map_err(|e| {
            TourError::Misconfiguration(format!(
                "execution.base_url '{}': {e}",
                config.execution_base_url()
            ))
        })?;
        let client = HttpClient::new(config.execution_request_timeout())?;

        Ok(Self::new(client, base_url, api_key, agent_id))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TourError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TourError::Misconfiguration(format!(
                    "execution.base_url '{}' cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Task id for `task`, registering it under the agent on first use.
    ///
    /// The map lock only covers the slot lookup; a failed registration leaves
    /// the slot empty so the next submission tries again.
    async fn ensure_task(&self, task: &TaskDefinition) -> Result<String, TourError> {
        let slot = {
            let mut task_ids = self.task_ids.lock().await;
            Arc::clone(task_ids.entry(task.fingerprint()).or_default())
        };

        slot.get_or_try_init(|| self.register_task(task))
            .await
            .cloned()
    }

    async fn register_task(&self, task: &TaskDefinition) -> Result<String, TourError> {
        let url = self.endpoint(&["agents", &self.agent_id, "tasks"])?;
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(task);
        let response = self.client.execute_with_retry(request, SERVICE_NAME).await?;
        let created: Created = decode_json(response, SERVICE_NAME).await?;

        debug!(task_id = %created.id, task = %task.name, "Registered task");
        Ok(created.id)
    }
}

/// Text payload of a succeeded execution.
///
/// Chat-completion shaped output yields the first choice's message content;
/// a string output is used as-is; anything else is re-serialized as JSON.
fn extract_payload(output: Value) -> Option<String> {
    match output {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(
            other
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        ),
    }
}

#[async_trait]
impl ExecutionService for JulepClient {
    async fn submit(
        &self,
        task: &TaskDefinition,
        input: &ExecutionInput,
    ) -> Result<JobHandle, TourError> {
        let task_id = self.ensure_task(task).await?;

        let url = self.endpoint(&["tasks", &task_id, "executions"])?;
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&CreateExecution { input });
        let response = self.client.execute_with_retry(request, SERVICE_NAME).await?;
        let created: Created = decode_json(response, SERVICE_NAME).await?;

        Ok(JobHandle::new(created.id))
    }

    async fn get_status(&self, handle: &JobHandle) -> Result<JobResult, TourError> {
        let url = self.endpoint(&["executions", handle.as_str()])?;
        let request = self.client.get(url).bearer_auth(&self.api_key);
        let response = self.client.execute_with_retry(request, SERVICE_NAME).await?;
        let record: ExecutionRecord = decode_json(response, SERVICE_NAME).await?;

        debug!(job_id = %handle, status = %record.status, "Execution status");

        Ok(match record.status.as_str() {
            "succeeded" => match extract_payload(record.output) {
                Some(payload) => JobResult::succeeded(payload),
                None => JobResult::failed(format!("execution {handle} succeeded without output")),
            },
            "failed" | "cancelled" => JobResult::failed(
                record
                    .error
                    .unwrap_or_else(|| format!("execution {}", record.status)),
            ),
            _ => JobResult::pending(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::JobStatus;
    use foodie_model::{CityWeather, TourRequestBuilder};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn client(server: &mockito::ServerGuard) -> JulepClient {
        let http = HttpClient::new(Duration::from_secs(5))
            .unwrap()
            .with_retry_policy(0, Duration::from_millis(1));
        JulepClient::new(
            http,
            Url::parse(&format!("{}/api", server.url())).unwrap(),
            "test-key".to_string(),
            "agent-1".to_string(),
        )
    }

    #[tokio::test]
    async fn test_submit_registers_task_once() {
        let mut server = mockito::Server::new_async().await;
        let task_mock = server
            .mock("POST", "/api/agents/agent-1/tasks")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({"name": "Foodie Tour Generator"})))
            .with_status(201)
            .with_body(r#"{"id": "task-9"}"#)
            .expect(1)
            .create_async()
            .await;
        let exec_mock = server
            .mock("POST", "/api/tasks/task-9/executions")
            .match_body(Matcher::PartialJson(
                json!({"input": {"city": "Paris", "dining_type": "outdoor"}}),
            ))
            .with_status(201)
            .with_body(r#"{"id": "exec-1"}"#)
            .expect(2)
            .create_async()
            .await;

        let julep = client(&server);
        let req = TourRequestBuilder::new().build("Paris", CityWeather::observed(22.0, 0));

        let first = julep.submit(&req.task, &req.input).await.unwrap();
        let second = julep.submit(&req.task, &req.input).await.unwrap();

        assert_eq!(first.as_str(), "exec-1");
        assert_eq!(second.as_str(), "exec-1");
        task_mock.assert_async().await;
        exec_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_submissions_of_one_definition_register_once() {
        let mut server = mockito::Server::new_async().await;
        let task_mock = server
            .mock("POST", "/api/agents/agent-1/tasks")
            .with_status(201)
            .with_body(r#"{"id": "task-9"}"#)
            .expect(1)
            .create_async()
            .await;
        let _exec_mock = server
            .mock("POST", "/api/tasks/task-9/executions")
            .with_status(201)
            .with_body(r#"{"id": "exec-1"}"#)
            .expect(2)
            .create_async()
            .await;

        let julep = client(&server);
        let req = TourRequestBuilder::new().build("Paris", CityWeather::observed(22.0, 0));

        let (first, second) = tokio::join!(
            julep.submit(&req.task, &req.input),
            julep.submit(&req.task, &req.input)
        );

        assert_eq!(first.unwrap().as_str(), "exec-1");
        assert_eq!(second.unwrap().as_str(), "exec-1");
        task_mock.assert_async().await;
    }

    /// Read one HTTP/1.1 request (head plus `content-length` body)
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|value| value.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answers every request with `{"id": "exec-1"}`, except requests whose
    /// text mentions `stall_on`: those are read and never answered.
    async fn spawn_stalling_server(stall_on: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let request = read_request(&mut socket).await;
                    if request.contains(stall_on) {
                        std::future::pending::<()>().await;
                    }
                    let body = r#"{"id": "exec-1"}"#;
                    let response = format!(
                        "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });

        Url::parse(&format!("http://{addr}/api")).unwrap()
    }

    #[tokio::test]
    async fn test_stalled_registration_does_not_block_other_cities() {
        let base = spawn_stalling_server("Slowville").await;
        let http = HttpClient::new(Duration::from_secs(60))
            .unwrap()
            .with_retry_policy(0, Duration::from_millis(1));
        let julep = Arc::new(JulepClient::new(
            http,
            base,
            "test-key".to_string(),
            "agent-1".to_string(),
        ));

        let slow = TourRequestBuilder::new().build("Slowville", CityWeather::observed(10.0, 3));
        let stalled = {
            let julep = Arc::clone(&julep);
            tokio::spawn(async move { julep.submit(&slow.task, &slow.input).await })
        };
        // Let the stalled registration reach the server first
        tokio::time::sleep(Duration::from_millis(200)).await;

        let fast = TourRequestBuilder::new().build("Paris", CityWeather::observed(22.0, 0));
        let handle = tokio::time::timeout(
            Duration::from_secs(5),
            julep.submit(&fast.task, &fast.input),
        )
        .await
        .expect("Paris submission waited on Slowville's registration")
        .unwrap();

        assert_eq!(handle.as_str(), "exec-1");
        assert!(!stalled.is_finished());
        stalled.abort();
    }

    #[tokio::test]
    async fn test_status_succeeded_extracts_message_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/executions/exec-1")
            .with_status(200)
            .with_body(
                json!({
                    "status": "succeeded",
                    "output": {"choices": [{"message": {"role": "assistant", "content": "{\"city\":\"Paris\"}"}}]}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = client(&server)
            .get_status(&JobHandle::new("exec-1"))
            .await
            .unwrap();

        assert_eq!(result.status, JobStatus::Succeeded);
        assert_eq!(result.payload.as_deref(), Some(r#"{"city":"Paris"}"#));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _running = server
            .mock("GET", "/api/executions/running")
            .with_status(200)
            .with_body(r#"{"status": "running"}"#)
            .create_async()
            .await;
        let _failed = server
            .mock("GET", "/api/executions/failed")
            .with_status(200)
            .with_body(r#"{"status": "failed", "error": "model overloaded"}"#)
            .create_async()
            .await;
        let _cancelled = server
            .mock("GET", "/api/executions/cancelled")
            .with_status(200)
            .with_body(r#"{"status": "cancelled"}"#)
            .create_async()
            .await;

        let julep = client(&server);

        let running = julep.get_status(&JobHandle::new("running")).await.unwrap();
        assert_eq!(running, JobResult::pending());

        let failed = julep.get_status(&JobHandle::new("failed")).await.unwrap();
        assert_eq!(failed, JobResult::failed("model overloaded"));

        let cancelled = julep.get_status(&JobHandle::new("cancelled")).await.unwrap();
        assert_eq!(cancelled, JobResult::failed("execution cancelled"));
    }

    #[tokio::test]
    async fn test_unauthorized_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/executions/exec-1")
            .with_status(401)
            .create_async()
            .await;

        let err = client(&server)
            .get_status(&JobHandle::new("exec-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TourError::Transport(_)));
        assert!(err.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_extract_payload_variants() {
        assert_eq!(extract_payload(Value::Null), None);
        assert_eq!(extract_payload(json!("plain")), Some("plain".to_string()));
        assert_eq!(
            extract_payload(json!({"city": "Paris"})),
            Some(r#"{"city":"Paris"}"#.to_string())
        );
    }

    #[test]
    fn test_from_config_requires_agent_id() {
        let mut config = Config::minimal_for_testing();
        config.execution.api_key_env = Some("PATH".to_string());

        let err = JulepClient::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("execution.agent_id"));
    }
}
