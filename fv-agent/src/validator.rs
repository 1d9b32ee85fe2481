use crate::fallback;
use crate::prompts;
use crate::stages::{
    BusinessPlan, CompetitorLandscape, IdeaSummary, MarketAnalysis, RiskAssessment, Stage,
};
use chrono::{Datelike, Utc};
use fv_core::{
    ChatMessage, ChatRequest, CompetitorAnalysis, IdeaFields, Llm, RisksRecommendations,
    ValidationResult,
};
use fv_model::parse_model_json;
use fv_telemetry::{Instrument, debug, info, warn};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// `ai_provider` when every stage used its fallback.
pub const FALLBACK_PROVIDER: &str = "fallback";
/// `ai_provider` when only some stages used their fallback.
pub const MIXED_PROVIDER: &str = "mixed";

const STAGE_TEMPERATURE: f32 = 0.7;
const STAGE_MAX_TOKENS: u32 = 2000;

/// What a validation run produced and how much of it came from the model.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub result: ValidationResult,
    /// Stages whose output was synthesized locally, in pipeline order.
    pub fallback_stages: Vec<Stage>,
    /// Backend name (or the override model, which then answered every stage),
    /// [`FALLBACK_PROVIDER`], or [`MIXED_PROVIDER`].
    pub provider: String,
    pub degraded: bool,
}

/// Runs the five validation stages in order.
///
/// Stage failures never abort the run: a failed call or an unparseable reply is replaced
/// by the stage's fallback and recorded in [`ValidationOutcome::fallback_stages`].
#[derive(Clone, Default)]
pub struct Validator {
    llm: Option<Arc<dyn Llm>>,
    model_override: Option<String>,
}

impl Validator {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm: Some(llm), model_override: None }
    }

    /// No backend: every stage falls back.
    pub fn offline() -> Self {
        Self::default()
    }

    /// Sends every stage to `model` instead of the per-stage defaults.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn has_model(&self) -> bool {
        self.llm.is_some()
    }

    pub fn model_for(&self, stage: Stage) -> &str {
        self.model_override.as_deref().unwrap_or_else(|| stage.default_model())
    }

    pub async fn validate(&self, idea: &IdeaFields) -> ValidationOutcome {
        if self.llm.is_none() {
            debug!("no model configured; validation will use fallback output only");
        }
        let industry = idea.industry.as_deref().unwrap_or("");
        let year = Utc::now().year();
        let mut fallback_stages = Vec::new();

        let summary = match self
            .run_stage::<IdeaSummary>(Stage::Summarize, prompts::summarize(idea))
            .await
        {
            Some(summary) => summary,
            None => {
                fallback_stages.push(Stage::Summarize);
                fallback::summary(idea)
            }
        };

        let market = match self
            .run_stage::<MarketAnalysis>(Stage::Market, prompts::market(&summary, industry))
            .await
        {
            Some(market) => complete_market(market, year),
            None => {
                fallback_stages.push(Stage::Market);
                fallback::market(&summary, industry, year, &mut rand::rng())
            }
        };

        let landscape = match self
            .run_stage::<CompetitorLandscape>(
                Stage::Competitors,
                prompts::competitors(&summary, &market),
            )
            .await
        {
            Some(landscape) => landscape,
            None => {
                fallback_stages.push(Stage::Competitors);
                fallback::competitors(&summary, &mut rand::rng())
            }
        };

        let plan = match self
            .run_stage::<BusinessPlan>(
                Stage::Business,
                prompts::business(&summary, &market, &landscape),
            )
            .await
        {
            Some(plan) => plan,
            None => {
                fallback_stages.push(Stage::Business);
                fallback::business_plan(&summary)
            }
        };

        let risk = match self
            .run_stage::<RiskAssessment>(
                Stage::Risk,
                prompts::risk(&summary, &market, &landscape, &plan),
            )
            .await
        {
            Some(risk) if risk.is_complete() => clamp_score(risk),
            Some(partial) => {
                warn!(
                    stage = %Stage::Risk,
                    "stage reply incomplete; filling gaps with fallback output"
                );
                fallback_stages.push(Stage::Risk);
                fill_risk_gaps(clamp_score(partial), &market, &plan)
            }
            None => {
                fallback_stages.push(Stage::Risk);
                fallback::risk_assessment(&market, &plan, &mut rand::rng())
            }
        };

        let result = compile(market, landscape, plan, risk);
        let provider = self.provider_label(&fallback_stages);
        let degraded = !fallback_stages.is_empty();
        if degraded {
            info!(
                fallback_stages = ?fallback_stages,
                provider = %provider,
                "validation finished with fallback output"
            );
        }

        ValidationOutcome { result, fallback_stages, provider, degraded }
    }

    fn provider_label(&self, fallback_stages: &[Stage]) -> String {
        match (&self.llm, fallback_stages.len()) {
            (Some(llm), 0) => match &self.model_override {
                Some(model) => model.clone(),
                None => llm.name().to_string(),
            },
            (Some(_), n) if n < Stage::ALL.len() => MIXED_PROVIDER.to_string(),
            _ => FALLBACK_PROVIDER.to_string(),
        }
    }

    async fn run_stage<T: DeserializeOwned>(&self, stage: Stage, prompt: String) -> Option<T> {
        let llm = self.llm.as_ref()?;
        let request = ChatRequest::new(vec![ChatMessage::user(prompts::with_json_suffix(&prompt))])
            .with_model(self.model_for(stage))
            .with_temperature(STAGE_TEMPERATURE)
            .with_max_tokens(STAGE_MAX_TOKENS);

        let outcome = async {
            let response = llm.complete(request).await?;
            parse_model_json::<T>(&response.content)
        }
        .instrument(fv_telemetry::stage_span(stage.as_str()))
        .await;

        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(stage = %stage, error = %error, "stage failed; substituting fallback output");
                None
            }
        }
    }
}

fn complete_market(mut market: MarketAnalysis, year: i32) -> MarketAnalysis {
    if market.tam.year == 0 {
        market.tam.year = year;
    }
    if market.market_trends.is_empty() {
        market.market_trends = fallback::project_trends(market.tam.total_market, market.tam.year);
    }
    market
}

fn clamp_score(mut risk: RiskAssessment) -> RiskAssessment {
    risk.viability_score = risk.viability_score.clamp(0.0, 10.0);
    risk
}

fn fill_risk_gaps(
    mut risk: RiskAssessment,
    market: &MarketAnalysis,
    plan: &BusinessPlan,
) -> RiskAssessment {
    if risk.risks.is_empty() {
        risk.risks = fallback::risks();
    }
    if risk.recommendations.is_empty() {
        risk.recommendations = fallback::recommendations();
    }
    if risk.executive_summary.trim().is_empty() {
        risk.executive_summary = fallback::executive_summary(risk.viability_score, market, plan);
    }
    risk
}

fn compile(
    market: MarketAnalysis,
    landscape: CompetitorLandscape,
    plan: BusinessPlan,
    risk: RiskAssessment,
) -> ValidationResult {
    ValidationResult {
        viability_score: risk.viability_score,
        som_data: fallback::som(market.tam.total_market),
        tam_data: market.tam,
        sam_data: market.sam,
        swot_analysis: landscape.swot,
        competitor_analysis: CompetitorAnalysis {
            direct_competitors: landscape.competitors,
            competitive_advantage: landscape.competitive_advantage,
        },
        market_trends: market.market_trends,
        usp: plan.usp,
        business_model: plan.business_model,
        risks_recommendations: RisksRecommendations {
            risks: risk.risks,
            recommendations: risk.recommendations,
        },
        business_plan: risk.executive_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_model::MockLlm;

    const SUMMARY: &str = r#"{"core_problem": "Late invoices", "target_customer": "Freelancers",
        "value_proposition": "Instant payout", "key_differentiators": ["speed"],
        "market_category": "fintech"}"#;
    const MARKET: &str = r#"{"tam": {"total_market": 2000000000, "growth_rate": 14.0, "year": 2026},
        "sam": {"serviceable_market": 500000000, "penetration_rate": 4.0,
        "target_segments": ["freelancers"]}}"#;
    const COMPETITORS: &str = r#"```json
        {"competitors": [{"name": "Fundbox", "market_share": 12.0, "strengths": ["brand"]}],
         "competitive_advantage": "Speed", "swot": {"strengths": ["fast"]}}
        ```"#;
    const BUSINESS: &str = r#"{"business_model": "Take rate", "usp": "Paid today",
        "gtm_strategy": "Communities"}"#;
    const RISK: &str = r#"{"viability_score": 8.2, "risks": ["credit risk"],
        "recommendations": ["partner with banks"], "executive_summary": "Promising."}"#;

    fn idea() -> IdeaFields {
        IdeaFields::new("PayNow").with_description("Invoice advances").with_industry("fintech")
    }

    #[tokio::test]
    async fn all_stages_from_model() {
        let mock = Arc::new(
            MockLlm::new("openrouter")
                .with_response(SUMMARY)
                .with_response(MARKET)
                .with_response(COMPETITORS)
                .with_response(BUSINESS)
                .with_response(RISK),
        );
        let outcome = Validator::new(mock.clone()).validate(&idea()).await;

        assert!(!outcome.degraded);
        assert!(outcome.fallback_stages.is_empty());
        assert_eq!(outcome.provider, "openrouter");

        let result = outcome.result;
        assert_eq!(result.viability_score, 8.2);
        assert_eq!(result.tam_data.total_market, 2_000_000_000.0);
        assert_eq!(result.som_data.obtainable_market, 2_000_000_000.0 * fallback::SOM_SHARE);
        assert_eq!(result.market_trends.len(), 5);
        assert_eq!(result.competitor_analysis.direct_competitors[0].name, "Fundbox");
        assert_eq!(result.risks_recommendations.risks, ["credit risk"]);
        assert_eq!(result.risks_recommendations.recommendations, ["partner with banks"]);
        assert_eq!(result.business_plan, "Promising.");

        let requests = mock.requests();
        let models: Vec<_> = requests.iter().map(|r| r.model.clone().unwrap()).collect();
        let expected: Vec<_> = Stage::ALL.iter().map(|s| s.default_model().to_string()).collect();
        assert_eq!(models, expected);
        assert!(requests[1].messages[0].content.contains("Late invoices"));
        assert!(requests[0].messages[0].content.ends_with(prompts::JSON_ONLY_SUFFIX));
        assert_eq!(requests[0].temperature, Some(0.7));
        assert_eq!(requests[0].max_tokens, Some(2000));
    }

    #[tokio::test]
    async fn failed_stages_are_flagged() {
        let mock = Arc::new(
            MockLlm::new("openrouter")
                .with_response(SUMMARY)
                .with_failure("chat completion error (503 Service Unavailable, retryable)")
                .with_response("not json at all")
                .with_response(BUSINESS)
                .with_response(RISK),
        );
        let outcome = Validator::new(mock).validate(&idea()).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.fallback_stages, [Stage::Market, Stage::Competitors]);
        assert_eq!(outcome.provider, MIXED_PROVIDER);
        assert_eq!(outcome.result.tam_data.total_market, 124_000_000_000.0);
        assert_eq!(outcome.result.competitor_analysis.direct_competitors.len(), 3);
    }

    #[tokio::test]
    async fn offline_uses_fallback_everywhere() {
        let outcome = Validator::offline().validate(&idea()).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.fallback_stages, Stage::ALL);
        assert_eq!(outcome.provider, FALLBACK_PROVIDER);
        let score = outcome.result.viability_score;
        assert!((7.0..10.0).contains(&score));
        assert!(outcome.result.business_plan.starts_with("Based on comprehensive analysis"));
    }

    #[tokio::test]
    async fn override_applies_to_every_stage() {
        let mock = Arc::new(MockLlm::new("openrouter"));
        let validator = Validator::new(mock.clone()).with_model("openai/gpt-4o-mini");
        let outcome = validator.validate(&idea()).await;

        assert_eq!(outcome.provider, FALLBACK_PROVIDER);
        assert!(mock.requests().iter().all(|r| r.model.as_deref() == Some("openai/gpt-4o-mini")));
    }

    #[tokio::test]
    async fn override_model_is_reported_as_provider() {
        let validator = Validator::new(with_risk_reply(RISK)).with_model("openai/gpt-4o-mini");
        let outcome = validator.validate(&idea()).await;

        assert!(!outcome.degraded);
        assert_eq!(outcome.provider, "openai/gpt-4o-mini");
    }

    fn with_risk_reply(reply: &str) -> Arc<MockLlm> {
        Arc::new(
            MockLlm::new("openrouter")
                .with_response(SUMMARY)
                .with_response(MARKET)
                .with_response(COMPETITORS)
                .with_response(BUSINESS)
                .with_response(reply),
        )
    }

    #[tokio::test]
    async fn unscored_risk_reply_falls_back() {
        let mock = with_risk_reply(r#"{"note": "I could not score this idea"}"#);
        let outcome = Validator::new(mock).validate(&idea()).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.fallback_stages, [Stage::Risk]);
        assert_eq!(outcome.provider, MIXED_PROVIDER);
        assert!((7.0..10.0).contains(&outcome.result.viability_score));
        assert_eq!(outcome.result.risks_recommendations.risks, fallback::risks());
    }

    #[tokio::test]
    async fn partial_risk_reply_keeps_score_but_is_flagged() {
        let mock = with_risk_reply(r#"{"viability_score": 6.0, "risks": ["churn"]}"#);
        let outcome = Validator::new(mock).validate(&idea()).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.fallback_stages, [Stage::Risk]);
        assert_eq!(outcome.result.viability_score, 6.0);
        assert_eq!(outcome.result.risks_recommendations.risks, ["churn"]);
        assert_eq!(
            outcome.result.risks_recommendations.recommendations,
            fallback::recommendations()
        );
        assert!(outcome.result.business_plan.contains("moderate potential"));
    }

    #[tokio::test]
    async fn out_of_range_score_is_clamped() {
        let mock = with_risk_reply(
            r#"{"viability_score": 85, "risks": ["r"], "recommendations": ["x"],
                "executive_summary": "Strong."}"#,
        );
        let outcome = Validator::new(mock).validate(&idea()).await;
        assert!(!outcome.degraded);
        assert_eq!(outcome.result.viability_score, 10.0);
    }
}
