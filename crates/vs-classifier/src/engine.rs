//! `ClassifierEngine` - wires the pre-filter and `EventClassifierAgent`
//! together into the full Event Classifier pipeline (spec.md §4.4).

use std::sync::Arc;

use sqlx::PgPool;
use vs_agent::base_agent::BaseAgent;
use vs_agent::registry::ProviderRegistry;
use vs_core::ids::EventId;
use vs_core::repo_ref::owner_repo;
use vs_core::VsResult;
use vs_db::dao::{EventDao, LibraryDao};
use vs_db::entities::{AgentRunStatus, Event, EventClassification};
use vs_github::GitHubClient;

use crate::agent::EventClassifierAgent;
use crate::label_map::normalize_label;
use crate::prefilter;

/// Confidence floor below which a `security_bugfix` verdict triggers a
/// model-tier escalation re-run (spec.md §4.4, default 0.7).
pub const DEFAULT_ESCALATION_THRESHOLD: f32 = 0.7;

pub struct ClassifierEngine<'a> {
    pool: &'a PgPool,
    github: Arc<GitHubClient>,
    registry: Arc<ProviderRegistry>,
    model: String,
    escalation_model: Option<String>,
    escalation_threshold: f32,
    concurrency: usize,
}

impl<'a> ClassifierEngine<'a> {
    #[must_use]
    pub fn new(
        pool: &'a PgPool,
        github: Arc<GitHubClient>,
        registry: Arc<ProviderRegistry>,
        model: String,
        escalation_model: Option<String>,
    ) -> Self {
        Self {
            pool,
            github,
            registry,
            model,
            escalation_model,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            concurrency: 3,
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Classify every event awaiting it, bounded by a semaphore (spec.md §5:
    /// classifier concurrency permits default 3).
    pub async fn classify_pending(&self, batch_size: i64) -> VsResult<usize> {
        let event_dao = EventDao::new(self.pool);
        let pending = event_dao.list_unclassified(batch_size).await?;

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(pending.len());

        for event in pending {
            let semaphore = semaphore.clone();
            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                match self.classify_event(&event).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::error!(event_id = %event.id, error = %err, "event classification failed");
                        false
                    }
                }
            });
        }

        let results = futures::future::join_all(tasks).await;
        Ok(results.into_iter().filter(|ok| *ok).count())
    }

    /// Classify one event: pre-filter first, LLM agent (with optional
    /// escalation) only if the pre-filter hands off.
    pub async fn classify_event(&self, event: &Event) -> VsResult<()> {
        if let Some((classification, confidence)) = prefilter::classify(event) {
            return self.record(event.id, classification, confidence).await;
        }

        let library_dao = LibraryDao::new(self.pool);
        let Some(library) = library_dao.find_by_id(event.library_id).await? else {
            tracing::warn!(event_id = %event.id, "event references a library that no longer exists");
            return Ok(());
        };
        let (owner, repo) = owner_repo(&library.repo_url)?;

        let (mut classification, mut confidence) =
            self.run_agent(&owner, &repo, event, self.model.clone()).await?;

        if classification == EventClassification::SecurityBugfix
            && confidence < self.escalation_threshold
        {
            if let Some(escalation_model) = &self.escalation_model {
                tracing::info!(event_id = %event.id, confidence, "escalating low-confidence security_bugfix verdict to a stronger model");
                let (escalated_classification, escalated_confidence) =
                    self.run_agent(&owner, &repo, event, escalation_model.clone()).await?;
                classification = escalated_classification;
                confidence = escalated_confidence;
            }
        }

        self.record(event.id, classification, confidence).await
    }

    async fn run_agent(
        &self,
        owner: &str,
        repo: &str,
        event: &Event,
        model: String,
    ) -> VsResult<(EventClassification, f32)> {
        let agent = EventClassifierAgent {
            github: self.github.clone(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            event_title: event.title.clone(),
            event_message: event.message.clone(),
            event_ref: event.r#ref.clone(),
            model,
        };

        let result = agent.run(&self.registry, Some(self.pool), "event", event.id.as_uuid()).await;

        if result.status != AgentRunStatus::Completed {
            // spec.md §4.4 "Failure": leave classification null for a later
            // scheduler tick rather than writing a guess.
            return Err(vs_core::VsError::ParseSchema(
                result.error_message.unwrap_or_else(|| "agent run did not complete".to_string()),
            ));
        }

        let parsed = result.parsed.unwrap_or(serde_json::Value::Null);
        let label = parsed.get("label").and_then(serde_json::Value::as_str).unwrap_or("other");
        let confidence = parsed.get("confidence").and_then(serde_json::Value::as_f64).unwrap_or(0.5) as f32;

        Ok((normalize_label(label), confidence.clamp(0.0, 1.0)))
    }

    async fn record(&self, event_id: EventId, classification: EventClassification, confidence: f32) -> VsResult<()> {
        EventDao::new(self.pool).set_classification(event_id, classification, confidence).await
    }
}
