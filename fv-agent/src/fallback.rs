//! Local stand-ins for each stage, used whenever the model call or its parse fails.
//!
//! Numbers come from a fixed industry table plus uniform noise. The randomness source is a
//! parameter so tests can seed it.

use crate::stages::{
    BusinessPlan, CompetitorLandscape, IdeaSummary, MarketAnalysis, RiskAssessment,
};
use fv_core::{
    Competitor, DocumentType, IdeaFields, MarketCalculations, MarketTrends, NexusAnalysis,
    SamData, SomData, StartupIdea, SwotAnalysis, TamData,
};
use rand::Rng;

/// TAM for industries missing from [`INDUSTRY_TAM`].
pub const DEFAULT_TAM: f64 = 50_000_000_000.0;

pub const SAM_SHARE: f64 = 0.3;
pub const SOM_SHARE: f64 = 0.05;

/// Growth applied to TAM for the current year and the four after it.
pub const TREND_MULTIPLIERS: [f64; 5] = [1.0, 1.15, 1.32, 1.52, 1.75];

/// Lowercase industry name -> total addressable market in USD.
pub const INDUSTRY_TAM: [(&str, f64); 12] = [
    ("fintech", 124_000_000_000.0),
    ("healthtech", 89_000_000_000.0),
    ("edtech", 45_000_000_000.0),
    ("ecommerce", 156_000_000_000.0),
    ("saas", 78_000_000_000.0),
    ("marketplace", 67_000_000_000.0),
    ("social", 34_000_000_000.0),
    ("gaming", 23_000_000_000.0),
    ("cleantech", 89_000_000_000.0),
    ("food & beverage", 45_000_000_000.0),
    ("technology", 95_000_000_000.0),
    ("ai", 180_000_000_000.0),
];

pub fn industry_tam(industry: &str) -> f64 {
    let key = industry.trim().to_lowercase();
    INDUSTRY_TAM
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, tam)| *tam)
        .unwrap_or(DEFAULT_TAM)
}

pub fn project_trends(tam: f64, start_year: i32) -> MarketTrends {
    TREND_MULTIPLIERS
        .iter()
        .enumerate()
        .map(|(offset, multiplier)| ((start_year + offset as i32).to_string(), tam * multiplier))
        .collect()
}

/// Splits a comma-separated free-text field into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

pub fn som(tam: f64) -> SomData {
    SomData {
        obtainable_market: tam * SOM_SHARE,
        realistic_capture: 0.5,
        timeframe: "5_years".to_string(),
    }
}

pub fn summary(idea: &IdeaFields) -> IdeaSummary {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    IdeaSummary {
        core_problem: format!("Solving {}", text(&idea.problem_solving)).trim_end().to_string(),
        target_customer: text(&idea.target_market),
        value_proposition: text(&idea.competitive_advantage),
        key_differentiators: split_list(idea.key_features.as_deref().unwrap_or("")),
        market_category: text(&idea.industry),
    }
}

pub fn market(summary: &IdeaSummary, industry: &str, year: i32, rng: &mut impl Rng) -> MarketAnalysis {
    let tam = industry_tam(industry);
    MarketAnalysis {
        tam: TamData {
            total_market: tam,
            growth_rate: rng.random_range(8.0..23.0),
            year,
            currency: "USD".to_string(),
        },
        sam: SamData {
            serviceable_market: tam * SAM_SHARE,
            penetration_rate: rng.random_range(5.0..15.0),
            target_segments: split_list(&summary.target_customer),
        },
        market_trends: project_trends(tam, year),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn competitors(summary: &IdeaSummary, rng: &mut impl Rng) -> CompetitorLandscape {
    CompetitorLandscape {
        competitors: vec![
            Competitor {
                name: "Market Leader A".to_string(),
                market_share: rng.random_range(10.0..30.0),
                strengths: strings(&["Brand recognition", "Large user base", "Strong funding"]),
            },
            Competitor {
                name: "Emerging Player B".to_string(),
                market_share: rng.random_range(5.0..20.0),
                strengths: strings(&["Innovation", "Agile development", "Niche focus"]),
            },
            Competitor {
                name: "Enterprise Solution C".to_string(),
                market_share: rng.random_range(8.0..20.0),
                strengths: strings(&[
                    "Enterprise relationships",
                    "Comprehensive features",
                    "Reliability",
                ]),
            },
        ],
        competitive_advantage: summary.value_proposition.clone(),
        swot: SwotAnalysis {
            strengths: strings(&[
                "Innovative technology approach",
                "Clear value proposition",
                "Identified market gap",
                "Strong founding vision",
            ]),
            weaknesses: strings(&[
                "Limited brand recognition",
                "Need for significant investment",
                "Unproven market traction",
                "Regulatory compliance requirements",
            ]),
            opportunities: strings(&[
                "Growing market demand",
                "Technology advancement trends",
                "Partnership opportunities",
                "Global expansion potential",
            ]),
            threats: strings(&[
                "Established competitor response",
                "Economic uncertainty impact",
                "Regulatory changes",
                "Technology disruption",
            ]),
        },
    }
}

pub fn business_plan(summary: &IdeaSummary) -> BusinessPlan {
    let differentiators = if summary.key_differentiators.is_empty() {
        "its core features".to_string()
    } else {
        summary.key_differentiators.join(", ")
    };
    BusinessPlan {
        business_model: "Freemium SaaS model with tiered pricing, enterprise solutions, and strategic partnerships"
            .to_string(),
        revenue_streams: strings(&[
            "Subscription fees (primary)",
            "Premium feature upgrades",
            "Enterprise licensing",
            "Partnership commissions",
        ]),
        usp: format!(
            "First-to-market solution combining {differentiators} with superior user experience"
        ),
        gtm_strategy:
            "Direct-to-consumer digital marketing, strategic partnerships, and content-driven growth"
                .to_string(),
        monetization: "Freemium model converting 5-10% to paid plans at $9.99-49.99/month"
            .to_string(),
    }
}

/// Whole-number score in `[7, 10)`.
pub fn viability_score(rng: &mut impl Rng) -> f64 {
    f64::from(rng.random_range(7..10))
}

pub fn risks() -> Vec<String> {
    strings(&[
        "Market competition intensity",
        "Customer acquisition challenges",
        "Technology development risks",
        "Regulatory compliance requirements",
    ])
}

pub fn recommendations() -> Vec<String> {
    strings(&[
        "Focus on unique value proposition",
        "Build strategic partnerships early",
        "Ensure regulatory compliance",
        "Develop multiple revenue streams",
    ])
}

/// Executive summary used when the risk stage does not supply one.
pub fn executive_summary(score: f64, market: &MarketAnalysis, plan: &BusinessPlan) -> String {
    let potential = if score >= 7.0 { "strong" } else { "moderate" };
    let market_kind = if market.tam.growth_rate > 10.0 { "rapidly growing" } else { "stable" };
    format!(
        "Based on comprehensive analysis, this startup idea shows {potential} potential in a \
         {market_kind} market. Key success factors include {} and effective execution of the \
         {} strategy.",
        plan.usp, plan.gtm_strategy
    )
}

/// Full risk stage output for when the model gave none.
pub fn risk_assessment(
    market: &MarketAnalysis,
    plan: &BusinessPlan,
    rng: &mut impl Rng,
) -> RiskAssessment {
    let viability_score = viability_score(rng);
    RiskAssessment {
        viability_score,
        risks: risks(),
        recommendations: recommendations(),
        executive_summary: executive_summary(viability_score, market, plan),
    }
}

const NEXUS_TRENDS: [&str; 5] = [
    "AI-powered automation",
    "Sustainable technology adoption",
    "Remote work infrastructure",
    "Digital health solutions",
    "Fintech innovation",
];

/// Fixed research analysis used when the model is unavailable.
pub fn nexus_analysis(document_type: DocumentType, source_firm: Option<&str>) -> NexusAnalysis {
    let source = source_firm.filter(|s| !s.trim().is_empty()).unwrap_or("leading research firm");
    NexusAnalysis {
        summary: format!(
            "This {} from {source} provides comprehensive insights into emerging market trends \
             and technological disruptions. The analysis reveals significant opportunities in \
             automation, sustainability, and digital transformation sectors, with particular \
             emphasis on AI-driven solutions and environmental technology.",
            document_type.label()
        ),
        emerging_trends: strings(&NEXUS_TRENDS),
        startup_ideas: vec![
            StartupIdea {
                title: "AI-Powered Business Process Optimizer".to_string(),
                description: "Automated workflow optimization using machine learning to identify \
                              inefficiencies and suggest improvements for enterprise operations."
                    .to_string(),
                market_opportunity: "Enterprise automation market valued at $12B with 25% annual growth"
                    .to_string(),
                viability_score: 8.7,
            },
            StartupIdea {
                title: "Sustainable Supply Chain Platform".to_string(),
                description: "End-to-end supply chain transparency platform helping companies \
                              track and reduce their carbon footprint while optimizing logistics."
                    .to_string(),
                market_opportunity: "Green supply chain market expected to reach $41B by 2027"
                    .to_string(),
                viability_score: 8.2,
            },
            StartupIdea {
                title: "Remote Team Analytics Dashboard".to_string(),
                description: "Comprehensive analytics platform for distributed teams, providing \
                              insights on productivity, collaboration patterns, and team health \
                              metrics."
                    .to_string(),
                market_opportunity: "Remote work software market growing at 23% CAGR, reaching $16B"
                    .to_string(),
                viability_score: 7.9,
            },
        ],
        market_calculations: MarketCalculations {
            total_addressable_market: 89_000_000_000.0,
            serviceable_addressable_market: 26_700_000_000.0,
            growth_rate: 18.5,
        },
        strategic_recommendations: strings(&[
            "Focus on AI-first solutions with clear ROI metrics",
            "Prioritize sustainability features in product development",
            "Build for remote-first and hybrid work environments",
            "Ensure regulatory compliance from day one",
            "Develop strategic partnerships with enterprise clients",
        ]),
        startup_potential_score: 84.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn industry_lookup_is_case_insensitive() {
        assert_eq!(industry_tam("FinTech"), 124_000_000_000.0);
        assert_eq!(industry_tam(" Food & Beverage "), 45_000_000_000.0);
        assert_eq!(industry_tam("AI"), 180_000_000_000.0);
        assert_eq!(industry_tam("underwater basket weaving"), DEFAULT_TAM);
        assert_eq!(industry_tam(""), DEFAULT_TAM);
    }

    #[test]
    fn trends_cover_five_years() {
        let trends = project_trends(100.0, 2026);
        let years: Vec<_> = trends.keys().cloned().collect();
        assert_eq!(years, ["2026", "2027", "2028", "2029", "2030"]);
        assert_eq!(trends["2026"], 100.0);
        assert!((trends["2030"] - 175.0).abs() < 1e-9);
    }

    #[test]
    fn summary_from_idea_fields() {
        let idea = IdeaFields {
            problem_solving: Some("late payments".into()),
            key_features: Some("instant payout, , low fees".into()),
            industry: Some("fintech".into()),
            ..IdeaFields::new("PayNow")
        };
        let summary = summary(&idea);
        assert_eq!(summary.core_problem, "Solving late payments");
        assert_eq!(summary.key_differentiators, ["instant payout", "low fees"]);
        assert_eq!(summary.market_category, "fintech");
        assert_eq!(summary.target_customer, "");
    }

    #[test]
    fn market_uses_shares_of_tam() {
        let mut rng = StdRng::seed_from_u64(7);
        let summary = summary(&IdeaFields::new("x").with_target_market("SMBs, freelancers"));
        let market = market(&summary, "saas", 2026, &mut rng);
        assert_eq!(market.tam.total_market, 78_000_000_000.0);
        assert_eq!(market.sam.serviceable_market, 78_000_000_000.0 * SAM_SHARE);
        assert_eq!(market.sam.target_segments, ["SMBs", "freelancers"]);
        assert_eq!(market.tam.year, 2026);
    }

    #[test]
    fn business_plan_mentions_differentiators() {
        let mut summary = summary(&IdeaFields::new("x"));
        assert!(business_plan(&summary).usp.contains("its core features"));
        summary.key_differentiators = vec!["speed".into(), "price".into()];
        assert!(business_plan(&summary).usp.contains("speed, price"));
    }

    #[test]
    fn nexus_fallback_is_fixed() {
        let analysis = nexus_analysis(DocumentType::ResearchPaper, Some("Bain"));
        assert_eq!(analysis.emerging_trends.len(), 5);
        assert_eq!(analysis.startup_ideas.len(), 3);
        assert_eq!(analysis.startup_potential_score, 84.0);
        assert!(analysis.summary.contains("research paper from Bain"));
    }
}
