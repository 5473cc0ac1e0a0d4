//! Application state management
//!
//! Shared resources handed to every handler through axum's state
//! extraction. Everything here is created once at startup and is cheap to
//! clone (pools and keys are reference counted).

use crate::auth::JwtService;
use crate::config::AppConfig;
use crate::services::generation_guard::GenerationGuard;
use crate::services::plan_model::PlanModel;
use chrono::{DateTime, FixedOffset, Utc};
use fitcoach_shared::Today;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Source of "now", replaceable in tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// `None` when plan generation is disabled
    pub plan_model: Option<Arc<dyn PlanModel>>,
    pub generation_guard: GenerationGuard,
    pub metrics: Option<PrometheusHandle>,
    clock: Clock,
}

impl AppState {
    /// Create a new application state
    ///
    /// Pre-computes the JWT keys from the config secret; call once at startup.
    pub fn new(
        db: PgPool,
        config: AppConfig,
        plan_model: Option<Arc<dyn PlanModel>>,
        generation_guard: GenerationGuard,
    ) -> Self {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );

        Self {
            db,
            config: Arc::new(config),
            jwt,
            plan_model,
            generation_guard,
            metrics: None,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Freeze or shift time, for tests
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Offset of the reference timezone
    pub fn offset(&self) -> FixedOffset {
        self.config.tracker.offset()
    }

    /// Today in the reference timezone, carrying the offset so plan
    /// timestamps are read the same way
    pub fn today(&self) -> Today {
        Today::at(self.now(), self.offset())
    }
}
