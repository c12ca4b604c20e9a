//! Application state and service initialization
//!
//! This module centralizes service construction and dependency injection:
//! the database pool, the SMTP transport, the LLM extraction seam, and the
//! event broadcaster are all built once here and handed to the services
//! that need them.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::repository::{ProposalRepository, RfpRepository, VendorRepository};
use crate::model::Config;
use crate::service::llm::OpenAiExtractor;
use crate::service::{
    ComparisonService, DispatchService, EventBroadcaster, InboundService, IntakeService,
    LlmClient, Mailer, SmtpMailer, StructuredExtractor,
};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Database connection pool
    pub db_pool: PgPool,
    /// Vendor directory repository
    pub vendors: VendorRepository,
    /// RFP repository
    pub rfps: RfpRepository,
    /// Proposal repository
    pub proposals: ProposalRepository,
    /// Realtime event fan-out
    pub events: EventBroadcaster,
    /// Natural-language RFP intake
    pub intake: Arc<IntakeService>,
    /// RFP dispatch pipeline
    pub dispatch: Arc<DispatchService>,
    /// Inbound proposal matcher
    pub inbound: Arc<InboundService>,
    /// Comparison & award engine
    pub comparison: Arc<ComparisonService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. LLM client initialization (requires OPENAI_API_KEY)
    /// 3. SMTP transport construction from configuration
    /// 4. Service dependency graph construction
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let llm_client =
            LlmClient::from_env().map_err(|_| AppError::MissingConfig("OPENAI_API_KEY"))?;
        let extractor: Arc<dyn StructuredExtractor> = Arc::new(OpenAiExtractor::new(llm_client));

        let mailer: Arc<dyn Mailer> = Arc::new(
            SmtpMailer::new(&config.smtp).map_err(|e| AppError::MailerInit(e.to_string()))?,
        );

        let vendors = VendorRepository::new(db_pool.clone());
        let rfps = RfpRepository::new(db_pool.clone());
        let proposals = ProposalRepository::new(db_pool.clone());
        let events = EventBroadcaster::new();

        let intake = Arc::new(IntakeService::new(Arc::clone(&extractor), rfps.clone()));
        let dispatch = Arc::new(DispatchService::new(
            vendors.clone(),
            rfps.clone(),
            Arc::clone(&mailer),
        ));
        let inbound = Arc::new(InboundService::new(
            Arc::clone(&extractor),
            vendors.clone(),
            rfps.clone(),
            proposals.clone(),
            events.clone(),
        ));
        let comparison = Arc::new(ComparisonService::new(
            extractor,
            rfps.clone(),
            proposals.clone(),
        ));

        Ok(Self {
            db_pool,
            vendors,
            rfps,
            proposals,
            events,
            intake,
            dispatch,
            inbound,
            comparison,
        })
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Mail transport initialization failed
    #[error("Mail transport initialization failed: {0}")]
    MailerInit(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),
}
