//! Workflow trigger over Redis Streams.
//!
//! The API enqueues generation jobs and never reads them back; a
//! separate worker consumes the stream through the consumer group
//! created by [`WorkflowTrigger::init`].

use redis::AsyncCommands;
use tracing::{debug, info, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::job::GenerationJob;

/// Workflow stream configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for generation jobs
    pub stream_name: String,
    /// Consumer group the worker reads through
    pub consumer_group: String,
    /// Seconds a duplicate-suppression key lives
    pub dedup_ttl_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "vodhub:generation".to_string(),
            consumer_group: "vodhub:workers".to_string(),
            dedup_ttl_secs: 3600,
        }
    }
}

impl WorkflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or(default.redis_url),
            stream_name: std::env::var("WORKFLOW_STREAM").unwrap_or(default.stream_name),
            consumer_group: std::env::var("WORKFLOW_CONSUMER_GROUP")
                .unwrap_or(default.consumer_group),
            dedup_ttl_secs: std::env::var("WORKFLOW_DEDUP_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.dedup_ttl_secs),
        }
    }
}

/// Fire-and-forget enqueue side of the generation workflow.
pub struct WorkflowTrigger {
    client: redis::Client,
    config: WorkflowConfig,
}

impl WorkflowTrigger {
    /// Create a new trigger.
    pub fn new(config: WorkflowConfig) -> WorkflowResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> WorkflowResult<Self> {
        Self::new(WorkflowConfig::from_env())
    }

    /// Initialize the stream (create the consumer group if missing).
    pub async fn init(&self) -> WorkflowResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!("Created consumer group: {}", self.config.consumer_group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", self.config.consumer_group);
            }
            Err(e) => return Err(WorkflowError::Redis(e)),
        }

        Ok(())
    }

    /// Enqueue a generation job. Returns the stream message id.
    ///
    /// A second request for the same (kind, video) within the dedup
    /// TTL is rejected so one click cannot fan out into a pile of
    /// identical jobs.
    pub async fn enqueue(&self, job: &GenerationJob) -> WorkflowResult<String> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let payload = serde_json::to_string(job)?;
        let idempotency_key = job.idempotency_key();

        let dedup_key = format!("vodhub:dedup:{}", idempotency_key);
        let exists: bool = conn.exists(&dedup_key).await?;
        if exists {
            warn!("Duplicate generation request rejected: {}", idempotency_key);
            return Err(WorkflowError::enqueue_failed(format!(
                "duplicate generation request: {idempotency_key}"
            )));
        }

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg("job")
            .arg(&payload)
            .arg("key")
            .arg(&idempotency_key)
            .query_async(&mut conn)
            .await?;

        conn.set_ex::<_, _, ()>(&dedup_key, "1", self.config.dedup_ttl_secs)
            .await?;

        info!("Enqueued generation job {} as {}", job.id, message_id);
        Ok(message_id)
    }

    /// Current stream length, used by the readiness probe.
    pub async fn len(&self) -> WorkflowResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.xlen(&self.config.stream_name).await?;
        Ok(len)
    }
}
