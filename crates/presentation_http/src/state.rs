//! Application state shared across handlers

use std::{fmt, sync::Arc, time::Duration};

use application::{
    ArtifactStore, AudioNormalizer, CallDispatcher, CallPipelineService, PipelineCollaborators,
    PipelineSettings, ProviderRegistry, QuestionService, error::ApplicationError,
};
use domain::LanguageTag;
use infrastructure::{
    AppConfig, AsyncDatabase, FfmpegNormalizer, FileKnowledgeBase, FsArtifactStore,
    HttpRecordingFetcher, SqliteQueryRecordStore, TwilioMessagingAdapter, build_provider_registry,
};
use tracing::{info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Queue feeding the call workers
    pub dispatcher: Arc<CallDispatcher>,
    /// Direct question answering and query history
    pub questions: Arc<QuestionService>,
    /// Synthesized answer audio
    pub artifacts: Arc<dyn ArtifactStore>,
    pub registry: ProviderRegistry,
    pub database: AsyncDatabase,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("dispatcher", &self.dispatcher)
            .field("providers", &self.registry.summary())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire providers, adapters and services from configuration
    ///
    /// Starts the call workers, so it must run inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when a provider, the recording fetcher or the
    /// messaging client cannot be built from `config`.
    pub fn assemble(config: &AppConfig, database: AsyncDatabase) -> Result<Self, ApplicationError> {
        let registry = build_provider_registry(config)?;
        let working_language = LanguageTag::new(&config.pipeline.working_language)?;
        let settings = PipelineSettings {
            working_language: working_language.clone(),
            default_caller_language: LanguageTag::new(&config.pipeline.default_caller_language)?,
            retrieval_top_k: config.pipeline.retrieval_top_k,
        };

        let normalizer: Arc<dyn AudioNormalizer> = match &config.speech.ffmpeg_path {
            Some(path) => Arc::new(FfmpegNormalizer::with_ffmpeg_path(path.clone())),
            None => Arc::new(FfmpegNormalizer::new()),
        };
        let artifacts: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(
            config.tts.output_dir.clone(),
            config.tts.public_base_url.clone(),
        ));
        let messaging = Arc::new(TwilioMessagingAdapter::from_config(
            config.messaging.to_twilio_config(),
        )?);
        let records = Arc::new(SqliteQueryRecordStore::new(database.pool().clone()));

        let mut fetcher = HttpRecordingFetcher::new(
            Duration::from_millis(config.speech.fetch_timeout_ms),
            config.speech.max_recording_bytes,
        )?;
        if let Some(dir) = &config.speech.local_recordings_dir {
            fetcher = fetcher.with_local_root(dir.clone());
        }

        let collaborators = PipelineCollaborators {
            fetcher: Arc::new(fetcher),
            normalizer,
            knowledge: Arc::new(FileKnowledgeBase::new(config.knowledge.corpus_dir.clone())),
            artifacts: Arc::clone(&artifacts),
            text: Arc::clone(&messaging) as _,
            voice: messaging,
            records: Arc::clone(&records) as _,
        };
        let pipeline = CallPipelineService::new(&registry, collaborators, settings);
        let questions = QuestionService::new(pipeline.answering(), records, working_language);
        let dispatcher = CallDispatcher::start(
            Arc::new(pipeline),
            config.pipeline.workers,
            config.pipeline.queue_capacity,
        );

        info!(
            workers = config.pipeline.workers,
            queue_capacity = config.pipeline.queue_capacity,
            "Application state assembled"
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            questions: Arc::new(questions),
            artifacts,
            registry,
            database,
        })
    }

    /// Drain the call queue, then release provider resources and the pool
    ///
    /// Only the drain is bounded by `drain_timeout`; the registry and the
    /// database are always released. Returns `false` when calls were still
    /// in flight at the deadline.
    pub async fn shutdown(&self, drain_timeout: Duration) -> bool {
        let drained = tokio::time::timeout(drain_timeout, self.dispatcher.shutdown())
            .await
            .is_ok();
        if !drained {
            warn!(timeout = ?drain_timeout, "Call workers did not finish in time");
        }
        self.registry.shutdown();
        self.database.close().await;
        drained
    }
}
