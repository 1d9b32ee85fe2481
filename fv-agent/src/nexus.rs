//! Research-document analysis: one call, one fixed fallback.

use crate::fallback;
use crate::prompts;
use crate::validator::FALLBACK_PROVIDER;
use fv_core::{ChatMessage, ChatRequest, Llm, NewResearch, NexusAnalysis};
use fv_model::parse_model_json;
use fv_telemetry::{Instrument, warn};
use std::sync::Arc;

pub const DEFAULT_NEXUS_MODEL: &str = "deepseek/deepseek-r1";

const NEXUS_TEMPERATURE: f32 = 0.7;
const NEXUS_MAX_TOKENS: u32 = 2500;

#[derive(Debug, Clone)]
pub struct NexusOutcome {
    pub analysis: NexusAnalysis,
    pub provider: String,
    pub degraded: bool,
}

#[derive(Clone)]
pub struct NexusAnalyst {
    llm: Option<Arc<dyn Llm>>,
    model: String,
}

impl Default for NexusAnalyst {
    fn default() -> Self {
        Self { llm: None, model: DEFAULT_NEXUS_MODEL.to_string() }
    }
}

impl NexusAnalyst {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm: Some(llm), ..Default::default() }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// `research_id` only labels the tracing span.
    pub async fn analyze(&self, research_id: &str, research: &NewResearch) -> NexusOutcome {
        let source_firm = research.source_firm.as_deref();

        let analysis = match &self.llm {
            Some(llm) => {
                let request = ChatRequest::new(vec![
                    ChatMessage::system(prompts::NEXUS_SYSTEM_PROMPT),
                    ChatMessage::user(prompts::nexus_user(
                        research.document_type,
                        source_firm,
                        &research.document_content,
                    )),
                ])
                .with_model(&self.model)
                .with_temperature(NEXUS_TEMPERATURE)
                .with_max_tokens(NEXUS_MAX_TOKENS);

                let outcome = async {
                    let response = llm.complete(request).await?;
                    parse_model_json::<NexusAnalysis>(&response.content)
                }
                .instrument(fv_telemetry::nexus_span(research_id))
                .await;

                match outcome {
                    Ok(analysis) => Some(analysis),
                    Err(error) => {
                        warn!(
                            research.id = research_id,
                            error = %error,
                            "research analysis failed; using fallback"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        match analysis {
            Some(mut analysis) => {
                analysis.startup_potential_score =
                    analysis.startup_potential_score.clamp(0.0, 100.0);
                NexusOutcome { analysis, provider: self.model.clone(), degraded: false }
            }
            None => NexusOutcome {
                analysis: fallback::nexus_analysis(research.document_type, source_firm),
                provider: FALLBACK_PROVIDER.to_string(),
                degraded: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_core::DocumentType;
    use fv_model::MockLlm;

    fn research() -> NewResearch {
        NewResearch {
            title: "Future of Work 2026".into(),
            document_type: DocumentType::ConsultingReport,
            source_firm: Some("Deloitte".into()),
            document_url: None,
            document_content: "Hybrid work keeps growing.".into(),
        }
    }

    #[tokio::test]
    async fn parses_model_analysis() {
        let reply = r#"{
            "summary": "Hybrid work is durable.",
            "emerging_trends": ["async tooling"],
            "startup_ideas": [
                {"title": "Desk booking", "description": "Book desks", "viability_score": 7.1}
            ],
            "market_calculations": {"total_addressable_market": 1e10,
                "serviceable_addressable_market": 2e9, "growth_rate": 9.0},
            "strategic_recommendations": ["Sell to HR"],
            "startup_potential_score": 72
        }"#;
        let mock = Arc::new(MockLlm::new("m").with_response(reply));
        let outcome = NexusAnalyst::new(mock.clone()).analyze("r1", &research()).await;

        assert!(!outcome.degraded);
        assert_eq!(outcome.provider, DEFAULT_NEXUS_MODEL);
        assert_eq!(outcome.analysis.startup_ideas[0].title, "Desk booking");
        assert_eq!(outcome.analysis.startup_potential_score, 72.0);

        let requests = mock.requests();
        let request = &requests[0];
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[1].content.contains("consulting report from Deloitte"));
        assert_eq!(request.max_tokens, Some(2500));
    }

    #[tokio::test]
    async fn falls_back_on_bad_reply() {
        let mock = Arc::new(MockLlm::new("m").with_response("Here are some thoughts..."));
        let outcome = NexusAnalyst::new(mock).analyze("r1", &research()).await;

        assert!(outcome.degraded);
        assert_eq!(outcome.provider, FALLBACK_PROVIDER);
        assert_eq!(
            outcome.analysis.market_calculations.total_addressable_market,
            89_000_000_000.0
        );
    }

    #[tokio::test]
    async fn offline_is_degraded() {
        let outcome = NexusAnalyst::offline().analyze("r1", &research()).await;
        assert!(outcome.degraded);
        assert_eq!(outcome.analysis.startup_potential_score, 84.0);
    }
}
