//! Prompt text for each stage. Every prompt names the JSON keys its stage parses.

use crate::stages::{BusinessPlan, CompetitorLandscape, IdeaSummary, MarketAnalysis};
use fv_core::{DocumentType, IdeaFields};
use serde::Serialize;

/// Appended to every stage prompt.
pub const JSON_ONLY_SUFFIX: &str = "Return ONLY valid JSON format without any markdown formatting.";

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn billions(value: f64) -> String {
    format!("${:.1}B", value / 1_000_000_000.0)
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Wraps a stage prompt with the JSON-only instruction.
pub fn with_json_suffix(prompt: &str) -> String {
    format!("{}\n\n{JSON_ONLY_SUFFIX}", prompt.trim_end())
}

pub fn summarize(idea: &IdeaFields) -> String {
    format!(
        "As an expert startup analyst, analyze and structure this startup idea:

Title: {title}
Description: {description}
Industry: {industry}
Target Market: {target_market}
Revenue Model: {revenue_model}
Key Features: {key_features}
Problem Solving: {problem_solving}
Competitive Advantage: {competitive_advantage}

Provide a structured summary with these keys:
- core_problem: the core problem being solved
- target_customer: the target customer profile
- value_proposition: the value proposition
- key_differentiators: list of key differentiators
- market_category: the market category",
        title = idea.title,
        description = field(&idea.description),
        industry = field(&idea.industry),
        target_market = field(&idea.target_market),
        revenue_model = field(&idea.revenue_model),
        key_features = field(&idea.key_features),
        problem_solving = field(&idea.problem_solving),
        competitive_advantage = field(&idea.competitive_advantage),
    )
}

pub fn market(summary: &IdeaSummary, industry: &str) -> String {
    format!(
        "As a market research expert, analyze the market for this startup idea in the {industry} industry:

Core Problem: {core_problem}
Target Customer: {target_customer}
Market Category: {market_category}

Provide comprehensive market analysis with realistic numbers in USD:
- tam: {{ total_market, growth_rate (percent), year, currency }}
- sam: {{ serviceable_market, penetration_rate (percent), target_segments (list) }}
- market_trends: projected market size keyed by year for the next 5 years",
        core_problem = summary.core_problem,
        target_customer = summary.target_customer,
        market_category = summary.market_category,
    )
}

pub fn competitors(summary: &IdeaSummary, market: &MarketAnalysis) -> String {
    format!(
        "As a competitive intelligence expert, analyze the competitive landscape for this startup:

Idea: {core_problem}
Market Category: {market_category}
Value Proposition: {value_proposition}
Key Differentiators: {differentiators}
Market Size: {market_size}

Provide:
- competitors: top 3-5 direct competitors as {{ name, market_share (percent), strengths (list) }}
- competitive_advantage: competitive advantage analysis
- swot: {{ strengths, weaknesses, opportunities, threats }} as lists",
        core_problem = summary.core_problem,
        market_category = summary.market_category,
        value_proposition = summary.value_proposition,
        differentiators = to_json(&summary.key_differentiators),
        market_size = billions(market.tam.total_market),
    )
}

pub fn business(
    summary: &IdeaSummary,
    market: &MarketAnalysis,
    landscape: &CompetitorLandscape,
) -> String {
    format!(
        "As a business strategy consultant, create a comprehensive business plan for this startup:

Idea: {core_problem}
Market Size: {market_size} TAM
Growth Rate: {growth:.1}%
Competitive Advantage: {advantage}
Key Differentiators: {differentiators}

Provide:
- business_model: detailed business model recommendation
- revenue_streams: list of revenue streams
- usp: refined unique selling proposition
- gtm_strategy: go-to-market strategy
- monetization: monetization approach",
        core_problem = summary.core_problem,
        market_size = billions(market.tam.total_market),
        growth = market.tam.growth_rate,
        advantage = landscape.competitive_advantage,
        differentiators = to_json(&summary.key_differentiators),
    )
}

pub fn risk(
    summary: &IdeaSummary,
    market: &MarketAnalysis,
    landscape: &CompetitorLandscape,
    plan: &BusinessPlan,
) -> String {
    format!(
        "As a startup investment analyst, provide final validation and scoring for this startup idea:

Structured Idea: {summary}
Market Data: {market}
Competitor Analysis: {landscape}
Business Plan: {plan}

Provide:
- viability_score: overall viability score from 0 to 10
- risks: list of key risks
- recommendations: list of mitigation and investment recommendations
- executive_summary: a short executive summary",
        summary = to_json(summary),
        market = to_json(market),
        landscape = to_json(landscape),
        plan = to_json(plan),
    )
}

/// System prompt for research-document analysis.
pub const NEXUS_SYSTEM_PROMPT: &str = r#"You are Nexus, an AI research analyst specializing in extracting startup opportunities from consulting reports and research papers.

Analyze the provided document and return a JSON response with this structure:
{
  "summary": "Executive summary of the document",
  "emerging_trends": ["trend1", "trend2", "trend3"],
  "startup_ideas": [
    {
      "title": "Startup Idea Title",
      "description": "Detailed description",
      "market_opportunity": "Market size and opportunity",
      "viability_score": 8.5
    }
  ],
  "market_calculations": {
    "total_addressable_market": 50000000000,
    "serviceable_addressable_market": 15000000000,
    "growth_rate": 12.5
  },
  "strategic_recommendations": ["recommendation1", "recommendation2"],
  "startup_potential_score": 85
}"#;

pub fn nexus_user(document_type: DocumentType, source_firm: Option<&str>, content: &str) -> String {
    format!(
        "Analyze this {label} from {source}:

{content}

Extract startup opportunities, emerging trends, and market insights. Focus on actionable business ideas that entrepreneurs can build.",
        label = document_type.label(),
        source = source_firm.filter(|s| !s.trim().is_empty()).unwrap_or("research source"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> IdeaSummary {
        IdeaSummary {
            core_problem: "Freelancers get paid late".into(),
            target_customer: "Freelancers".into(),
            value_proposition: "Instant invoice financing".into(),
            key_differentiators: vec!["Same-day payout".into()],
            market_category: "fintech".into(),
        }
    }

    #[test]
    fn summarize_includes_idea_fields() {
        let idea = IdeaFields::new("PayNow")
            .with_description("Invoice advances")
            .with_industry("fintech");
        let prompt = summarize(&idea);
        assert!(prompt.contains("Title: PayNow"));
        assert!(prompt.contains("Industry: fintech"));
        assert!(prompt.contains("Target Market: \n"));
    }

    #[test]
    fn market_prompt_embeds_summary() {
        let prompt = market(&summary(), "fintech");
        assert!(prompt.contains("in the fintech industry"));
        assert!(prompt.contains("Freelancers get paid late"));
    }

    #[test]
    fn suffix_is_appended_once() {
        let wrapped = with_json_suffix("Analyze.\n\n");
        assert!(wrapped.ends_with(JSON_ONLY_SUFFIX));
        assert_eq!(wrapped.matches(JSON_ONLY_SUFFIX).count(), 1);
    }

    #[test]
    fn market_size_in_billions() {
        assert_eq!(billions(124_000_000_000.0), "$124.0B");
        assert_eq!(billions(26_700_000_000.0), "$26.7B");
    }

    #[test]
    fn nexus_user_defaults_source() {
        let prompt = nexus_user(DocumentType::ConsultingReport, None, "Body");
        assert!(prompt.starts_with("Analyze this consulting report from research source:"));
        let prompt = nexus_user(DocumentType::MarketStudy, Some("McKinsey"), "Body");
        assert!(prompt.contains("market study from McKinsey"));
    }
}
