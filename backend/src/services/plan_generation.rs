//! Plan generation gateway
//!
//! Turns a validated onboarding profile into a weekly workout and nutrition
//! plan using the configured plan model, then replaces the user's stored
//! plan with it. Nothing is written unless the model output satisfies the
//! plan contract, and at most one generation runs per user at a time.

use crate::error::GenerationError;
use crate::repositories::PlanStore;
use crate::services::generation_guard::GenerationGuard;
use crate::services::plan_model::PlanModel;
use chrono::{DateTime, Utc};
use fitcoach_shared::plan::{parse_model_output, GeneratePlanRequest, GeneratedPlan, UserProfileInput};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

const OUTPUT_SCHEMA: &str = r#"{
  "workoutPlan": [
    {
      "day": "monday",
      "name": "string",
      "objective": "string",
      "exercises": [
        { "name": "string", "sets": 3, "reps": "8-12", "rest": "60s", "note": "string", "videoUrl": "string" }
      ]
    }
  ],
  "nutritionPlan": {
    "summary": "string",
    "dailyCalories": 2000,
    "meals": [
      { "day": "monday", "name": "string", "time": "07:30", "description": "string", "calories": 400 }
    ]
  },
  "initialMessage": "string"
}"#;

/// Fixed instruction template sent to the plan model
pub fn build_prompt(profile: &UserProfileInput) -> Result<String, GenerationError> {
    let profile_json = serde_json::to_string_pretty(profile)
        .map_err(|e| GenerationError::InvalidProfile(e.to_string()))?;
    let language = profile.settings.language.prompt_name();
    let days = profile.fitness_profile.days_per_week;

    Ok(format!(
        "You are a certified personal trainer and nutritionist.\n\
         Create a one-week training and nutrition plan for the client below.\n\
         The client trains {days} days per week; the other days are rest days with no exercises.\n\
         Use the weekday names sunday, monday, tuesday, wednesday, thursday, friday, saturday.\n\
         Respect every injury, medical condition and dietary restriction listed.\n\
         Write all text for the client in {language}.\n\
         Answer with a single JSON object and nothing else, following exactly this schema:\n\
         {schema}\n\n\
         Client profile:\n\
         {profile_json}\n",
        days = days,
        language = language,
        schema = OUTPUT_SCHEMA,
        profile_json = profile_json,
    ))
}

/// Reject requests without a complete, in-range profile
pub fn validate_request(request: GeneratePlanRequest) -> Result<UserProfileInput, GenerationError> {
    let profile = request
        .user_profile
        .ok_or_else(|| GenerationError::InvalidProfile("userProfile is required".to_string()))?;
    profile
        .validate()
        .map_err(|e| GenerationError::InvalidProfile(e.to_string()))?;
    Ok(profile)
}

pub struct PlanGenerationService;

impl PlanGenerationService {
    /// Generate and store a plan for `user_id`.
    ///
    /// Every outcome is counted in `plan_generation_total`; failures are
    /// logged with the user id.
    pub async fn generate(
        model: &dyn PlanModel,
        store: &dyn PlanStore,
        guard: &GenerationGuard,
        user_id: Uuid,
        request: GeneratePlanRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedPlan, GenerationError> {
        let started = Instant::now();
        let result = Self::run(model, store, guard, user_id, request, now).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        metrics::counter!("plan_generation_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(plan) => info!(
                user_id = %user_id,
                model = model.name(),
                workout_days = plan.workout_plan.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Plan generated"
            ),
            Err(GenerationError::InProgress) => {
                warn!(user_id = %user_id, "Plan generation already in progress")
            }
            Err(e) => error!(user_id = %user_id, outcome, error = %e, "Plan generation failed"),
        }

        result
    }

    /// Count and log a request turned away before generation started.
    ///
    /// `user_id` is `None` when the caller could not be authenticated.
    pub fn record_rejection(user_id: Option<Uuid>, error: &GenerationError) {
        let outcome = error.outcome();
        metrics::counter!("plan_generation_total", "outcome" => outcome).increment(1);
        match user_id {
            Some(user_id) => warn!(user_id = %user_id, outcome, error = %error, "Plan generation rejected"),
            None => warn!(outcome, error = %error, "Plan generation rejected"),
        }
    }

    async fn run(
        model: &dyn PlanModel,
        store: &dyn PlanStore,
        guard: &GenerationGuard,
        user_id: Uuid,
        request: GeneratePlanRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedPlan, GenerationError> {
        let profile = validate_request(request)?;
        let prompt = build_prompt(&profile)?;

        let permit = guard
            .try_acquire(user_id)
            .await
            .ok_or(GenerationError::InProgress)?;

        let result = Self::produce(model, store, user_id, &profile, &prompt, now).await;
        permit.release().await;
        result
    }

    async fn produce(
        model: &dyn PlanModel,
        store: &dyn PlanStore,
        user_id: Uuid,
        profile: &UserProfileInput,
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Result<GeneratedPlan, GenerationError> {
        let text = model.complete(prompt).await?;
        let plan = parse_model_output(&text)?;

        store
            .replace_plan(user_id, profile, &plan, now)
            .await
            .map_err(GenerationError::Persistence)?;

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plan_model::PlanModelError;
    use async_trait::async_trait;
    use fitcoach_shared::plan::{FitnessProfile, HealthFlags, PersonalInfo, PhysicalMetrics, ProfileSettings};
    use fitcoach_shared::profile::{ExperienceLevel, FitnessGoal, Language, Sex};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    const VALID_OUTPUT: &str = r#"Here you go:
    {"workoutPlan":[{"day":"Segunda-feira","name":"Upper","exercises":[{"name":"Push-up","sets":"3","reps":"12","rest":60}]}],
     "nutritionPlan":{"meals":[{"name":"Breakfast","time":"07:30","description":"Oats","calories":"400"}]},
     "initialMessage":"Bem-vindo!"}"#;

    fn profile() -> UserProfileInput {
        UserProfileInput {
            personal_info: PersonalInfo {
                name: "Ana".to_string(),
                age: 31,
                sex: Sex::Female,
            },
            physical_metrics: PhysicalMetrics {
                weight_kg: 64.0,
                height_cm: 168.0,
                target_weight_kg: Some(60.0),
                bmi: None,
                bmi_category: None,
            },
            fitness_profile: FitnessProfile {
                experience_level: ExperienceLevel::Beginner,
                goal: FitnessGoal::LoseWeight,
                days_per_week: 3,
                session_minutes: Some(45),
                workout_location: None,
            },
            health: HealthFlags::default(),
            settings: ProfileSettings {
                language: Language::PtBr,
                water_goal_ml: Some(2500),
            },
        }
    }

    fn request() -> GeneratePlanRequest {
        GeneratePlanRequest {
            user_profile: Some(profile()),
        }
    }

    struct FixedModel(String);

    #[async_trait]
    impl PlanModel for FixedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, PlanModelError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Signals `entered`, then blocks until `gate` is notified
    struct GatedModel {
        entered: Arc<Notify>,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PlanModel for GatedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, PlanModelError> {
            self.entered.notify_one();
            self.gate.notified().await;
            Ok(VALID_OUTPUT.to_string())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<(Uuid, GeneratedPlan)>>,
    }

    #[async_trait]
    impl PlanStore for RecordingStore {
        async fn replace_plan(
            &self,
            user_id: Uuid,
            _profile: &UserProfileInput,
            plan: &GeneratedPlan,
            _generated_at: DateTime<Utc>,
        ) -> anyhow::Result<()> {
            self.saved.lock().unwrap().push((user_id, plan.clone()));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PlanStore for FailingStore {
        async fn replace_plan(
            &self,
            _user_id: Uuid,
            _profile: &UserProfileInput,
            _plan: &GeneratedPlan,
            _generated_at: DateTime<Utc>,
        ) -> anyhow::Result<()> {
            anyhow::bail!("insert into exercises failed")
        }
    }

    #[test]
    fn test_prompt_embeds_profile_and_language() {
        let prompt = build_prompt(&profile()).unwrap();
        assert!(prompt.contains("Brazilian Portuguese"));
        assert!(prompt.contains("\"workoutPlan\""));
        assert!(prompt.contains("\"Ana\""));
        assert!(prompt.contains("3 days per week"));
    }

    #[test]
    fn test_missing_profile_is_rejected() {
        let result = validate_request(GeneratePlanRequest { user_profile: None });
        assert!(matches!(result, Err(GenerationError::InvalidProfile(_))));
    }

    #[test]
    fn test_out_of_range_profile_is_rejected() {
        let mut invalid = profile();
        invalid.fitness_profile.days_per_week = 9;
        let result = validate_request(GeneratePlanRequest {
            user_profile: Some(invalid),
        });
        assert!(matches!(result, Err(GenerationError::InvalidProfile(msg)) if msg.contains("days_per_week")));
    }

    #[tokio::test]
    async fn test_successful_generation_is_stored() {
        let store = RecordingStore::default();
        let user_id = Uuid::new_v4();

        let plan = PlanGenerationService::generate(
            &FixedModel(VALID_OUTPUT.to_string()),
            &store,
            &GenerationGuard::local(),
            user_id,
            request(),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(plan.workout_plan[0].exercises[0].sets, 3);
        let saved = store.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, user_id);
    }

    #[tokio::test]
    async fn test_contract_violation_writes_nothing() {
        let store = RecordingStore::default();
        let output = r#"{"workoutPlan": []}"#.to_string();

        let result = PlanGenerationService::generate(
            &FixedModel(output),
            &store,
            &GenerationGuard::local(),
            Uuid::new_v4(),
            request(),
            Utc::now(),
        )
        .await;

        assert!(matches!(result, Err(GenerationError::Contract(_))));
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported() {
        let result = PlanGenerationService::generate(
            &FixedModel(VALID_OUTPUT.to_string()),
            &FailingStore,
            &GenerationGuard::local(),
            Uuid::new_v4(),
            request(),
            Utc::now(),
        )
        .await;

        assert!(matches!(result, Err(GenerationError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let guard = GenerationGuard::local();
        let user_id = Uuid::new_v4();

        for _ in 0..2 {
            let result = PlanGenerationService::generate(
                &FixedModel("not json".to_string()),
                &RecordingStore::default(),
                &guard,
                user_id,
                request(),
                Utc::now(),
            )
            .await;
            assert!(matches!(result, Err(GenerationError::Contract(_))));
        }
    }

    #[tokio::test]
    async fn test_concurrent_generation_is_rejected() {
        let entered = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let model = Arc::new(GatedModel {
            entered: entered.clone(),
            gate: gate.clone(),
        });
        let store = Arc::new(RecordingStore::default());
        let guard = GenerationGuard::local();
        let user_id = Uuid::new_v4();

        let first = {
            let (model, store, guard) = (model.clone(), store.clone(), guard.clone());
            tokio::spawn(async move {
                PlanGenerationService::generate(&*model, &*store, &guard, user_id, request(), Utc::now()).await
            })
        };

        // The first request holds the guard once the model is running
        entered.notified().await;

        let second =
            PlanGenerationService::generate(&*model, &*store, &guard, user_id, request(), Utc::now()).await;
        assert!(matches!(second, Err(GenerationError::InProgress)));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(store.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_rejections_are_counted_by_outcome() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            PlanGenerationService::record_rejection(Some(Uuid::new_v4()), &GenerationError::Disabled);
            PlanGenerationService::record_rejection(
                None,
                &GenerationError::Unauthorized("missing token".to_string()),
            );
            PlanGenerationService::record_rejection(
                Some(Uuid::new_v4()),
                &GenerationError::InvalidProfile("EOF while parsing".to_string()),
            );
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"plan_generation_total{outcome="disabled"} 1"#));
        assert!(rendered.contains(r#"plan_generation_total{outcome="unauthorized"} 1"#));
        assert!(rendered.contains(r#"plan_generation_total{outcome="invalid_profile"} 1"#));
    }
}
