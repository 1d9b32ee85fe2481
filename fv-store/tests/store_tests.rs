use fv_core::{
    Competitor, CompetitorAnalysis, DocumentType, EntityType, FvError, IdeaFields, IdeaStatus,
    MarketCalculations, NewActivity, NewResearch, NexusAnalysis, ProcessingStatus,
    RisksRecommendations, SamData, SomData, SwotAnalysis, TamData, TeamRole, UpsertUser, User,
    ValidationResult,
};
use fv_store::Database;
use serde_json::json;
use std::collections::BTreeMap;

async fn db() -> Database {
    let db = Database::connect_in_memory().await.unwrap();
    db.migrate().await.unwrap();
    db
}

async fn user(db: &Database, email: &str) -> User {
    db.upsert_user(&UpsertUser { email: email.into(), ..Default::default() }).await.unwrap()
}

fn fields() -> IdeaFields {
    IdeaFields::new("Desk booking")
        .with_description("Book a desk from your phone")
        .with_industry("SaaS")
        .with_target_market("Hybrid offices")
}

fn result(score: f64) -> ValidationResult {
    let tam = 78_000_000_000.0;
    ValidationResult {
        viability_score: score,
        tam_data: TamData {
            total_market: tam,
            growth_rate: 12.0,
            year: 2026,
            currency: "USD".into(),
        },
        sam_data: SamData {
            serviceable_market: tam * 0.3,
            penetration_rate: 8.0,
            target_segments: vec!["Offices".into()],
        },
        som_data: SomData {
            obtainable_market: tam * 0.05,
            realistic_capture: 5.0,
            timeframe: "3-5 years".into(),
        },
        swot_analysis: SwotAnalysis::default(),
        competitor_analysis: CompetitorAnalysis {
            direct_competitors: vec![Competitor {
                name: "Deskly".into(),
                market_share: 12.0,
                strengths: vec![],
            }],
            competitive_advantage: "Faster".into(),
        },
        market_trends: BTreeMap::from([("2026".to_string(), tam)]),
        usp: "One tap".into(),
        business_model: "Subscription".into(),
        risks_recommendations: RisksRecommendations::default(),
        business_plan: "Sell to facilities teams".into(),
    }
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let db = db().await;
    db.migrate().await.unwrap();
    db.ping().await.unwrap();
}

#[tokio::test]
async fn upsert_user_keeps_one_row_per_email() {
    let db = db().await;
    let first = db
        .upsert_user(&UpsertUser {
            email: "ada@example.com".into(),
            full_name: Some("Ada".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    let second = user(&db, "ada@example.com").await;

    assert_eq!(first.id, second.id);
    assert_eq!(second.full_name.as_deref(), Some("Ada"));
    assert_eq!(second.max_ideas_allowed, 10);
    assert_eq!(second.ideas_validated, 0);
}

#[tokio::test]
async fn draft_round_trips() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;

    let draft = db.create_idea(&owner.id, &fields()).await.unwrap();
    let fetched = db.get_idea(&draft.id).await.unwrap().unwrap();

    assert_eq!(fetched.fields, fields());
    assert_eq!(fetched.status, IdeaStatus::Draft);
    assert!(fetched.is_draft);
    assert!(fetched.share_token.is_none());

    let edited = db
        .update_draft(&draft.id, &owner.id, &fields().with_key_features("QR check-in"))
        .await
        .unwrap();
    assert_eq!(edited.fields.key_features.as_deref(), Some("QR check-in"));
}

#[tokio::test]
async fn other_users_cannot_touch_an_idea() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let other = user(&db, "bob@example.com").await;
    let draft = db.create_idea(&owner.id, &fields()).await.unwrap();

    assert!(matches!(
        db.update_draft(&draft.id, &other.id, &fields()).await,
        Err(FvError::NotFound(_))
    ));
    assert!(!db.delete_idea(&draft.id, &other.id).await.unwrap());
    assert!(db.delete_idea(&draft.id, &owner.id).await.unwrap());
    assert!(db.get_idea(&draft.id).await.unwrap().is_none());
}

#[tokio::test]
async fn validation_lifecycle_completes_once() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let draft = db.create_idea(&owner.id, &fields()).await.unwrap();

    let idea = db.begin_validation(&owner.id, &fields(), Some(&draft.id)).await.unwrap();
    assert_eq!(idea.id, draft.id);
    assert_eq!(idea.status, IdeaStatus::Validating);
    assert_eq!(idea.validation_progress, 25);
    let token = idea.share_token.clone().unwrap();

    db.set_progress(&idea.id, 50).await.unwrap();
    let report = db.complete_validation(&idea.id, &result(8.0), "fallback", 1200).await.unwrap();
    assert_eq!(report.result, result(8.0));
    assert_eq!(report.processing_time, 1200);

    let done = db.get_idea(&idea.id).await.unwrap().unwrap();
    assert_eq!(done.status, IdeaStatus::Completed);
    assert_eq!(done.validation_progress, 100);
    assert_eq!(done.share_token.as_deref(), Some(token.as_str()));
    assert_eq!(db.get_user_by_id(&owner.id).await.unwrap().unwrap().ideas_validated, 1);

    // Terminal states never move.
    assert!(matches!(
        db.complete_validation(&idea.id, &result(8.0), "fallback", 1).await,
        Err(FvError::InvalidTransition { .. })
    ));
    assert!(matches!(db.mark_failed(&idea.id).await, Err(FvError::InvalidTransition { .. })));
    assert!(matches!(
        db.update_draft(&idea.id, &owner.id, &fields()).await,
        Err(FvError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn begin_validation_requires_title_and_description() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let err = db.begin_validation(&owner.id, &IdeaFields::new("Only a title"), None).await;
    assert!(matches!(err, Err(FvError::Validation(_))));
}

#[tokio::test]
async fn completion_over_the_limit_writes_no_report() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    db.set_max_ideas_allowed(&owner.id, 1).await.unwrap();

    let first = db.begin_validation(&owner.id, &fields(), None).await.unwrap();
    let second = db.begin_validation(&owner.id, &fields(), None).await.unwrap();
    db.complete_validation(&first.id, &result(8.0), "m", 10).await.unwrap();

    let err = db.complete_validation(&second.id, &result(9.0), "m", 10).await;
    assert!(matches!(err, Err(FvError::LimitReached { used: 1, allowed: 1 })));

    assert!(db.get_report_for_idea(&second.id).await.unwrap().is_none());
    let failed = db.get_idea(&second.id).await.unwrap().unwrap();
    assert_eq!(failed.status, IdeaStatus::Failed);
    assert_eq!(failed.validation_progress, 0);
    assert_eq!(db.get_user_by_id(&owner.id).await.unwrap().unwrap().ideas_validated, 1);
}

#[tokio::test]
async fn share_token_resolves_completed_ideas_only() {
    let db = db().await;
    let owner = db
        .upsert_user(&UpsertUser {
            email: "ada@example.com".into(),
            full_name: Some("Ada Lovelace".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let idea = db.begin_validation(&owner.id, &fields(), None).await.unwrap();
    let token = idea.share_token.clone().unwrap();
    assert!(db.get_shared_idea(&token).await.unwrap().is_none());

    db.complete_validation(&idea.id, &result(7.5), "m", 10).await.unwrap();
    let shared = db.get_shared_idea(&token).await.unwrap().unwrap();
    assert_eq!(shared.idea.id, idea.id);
    assert_eq!(shared.report.result.viability_score, 7.5);
    assert_eq!(shared.owner_name, "Ada Lovelace");

    assert!(db.get_shared_idea("not-a-token").await.unwrap().is_none());
}

#[tokio::test]
async fn listing_embeds_reports_newest_first() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let draft = db.create_idea(&owner.id, &fields()).await.unwrap();
    let validated = db.begin_validation(&owner.id, &fields(), None).await.unwrap();
    db.complete_validation(&validated.id, &result(8.0), "m", 10).await.unwrap();

    let listed = db.list_ideas_with_reports(&owner.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].idea.id, validated.id);
    assert!(listed[0].validation_report.is_some());
    assert_eq!(listed[1].idea.id, draft.id);
    assert!(listed[1].validation_report.is_none());
}

#[tokio::test]
async fn teams_create_join_and_list() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let member = user(&db, "bob@example.com").await;

    let team = db.create_team(&owner, Some("Founders")).await.unwrap();
    assert_eq!(team.name, "ada's Team");
    assert!(team.team_code.starts_with("TEAM-"));
    let owner = db.get_user_by_id(&owner.id).await.unwrap().unwrap();
    assert_eq!(owner.team_code.as_deref(), Some(team.team_code.as_str()));

    let joined = db.join_team(&team.team_code.to_lowercase(), &member.id).await.unwrap();
    assert_eq!(joined.id, team.id);
    db.join_team(&team.team_code, &member.id).await.unwrap();

    // A repeated join never demotes the owner.
    db.join_team(&team.team_code, &owner.id).await.unwrap();

    let members = db.list_members(&team.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].role, TeamRole::Owner);
    assert_eq!(members[1].role, TeamRole::Member);
    assert_eq!(members[1].email.as_deref(), Some("bob@example.com"));

    db.add_member(&team.id, &member.id, TeamRole::Admin).await.unwrap();
    let members = db.list_members(&team.id).await.unwrap();
    assert_eq!(members[1].role, TeamRole::Admin);

    assert_eq!(db.list_teams_for_user(&member.id).await.unwrap().len(), 1);
    assert!(matches!(db.join_team("TEAM-NOPE00", &member.id).await, Err(FvError::NotFound(_))));
}

#[tokio::test]
async fn research_lifecycle() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    let input = NewResearch {
        title: "Future of Work".into(),
        document_type: DocumentType::MarketStudy,
        source_firm: Some("McKinsey".into()),
        document_url: None,
        document_content: "Hybrid work keeps growing.".into(),
    };

    let record = db.create_research(&owner.id, &input).await.unwrap();
    assert_eq!(record.processing_status, ProcessingStatus::Processing);
    assert!(record.analysis.is_none());

    let analysis = NexusAnalysis {
        summary: "Durable shift".into(),
        emerging_trends: vec!["async tooling".into()],
        startup_ideas: vec![],
        market_calculations: MarketCalculations {
            total_addressable_market: 1e10,
            serviceable_addressable_market: 3e9,
            growth_rate: 9.0,
        },
        strategic_recommendations: vec![],
        startup_potential_score: 70.0,
    };
    let done = db.complete_research(&record.id, &analysis).await.unwrap();
    assert_eq!(done.processing_status, ProcessingStatus::Completed);
    assert_eq!(done.analysis, Some(analysis));
    assert_eq!(done.document_type, DocumentType::MarketStudy);

    assert!(matches!(db.fail_research(&record.id).await, Err(FvError::NotFound(_))));

    let other = db.create_research(&owner.id, &input).await.unwrap();
    db.fail_research(&other.id).await.unwrap();
    let listed = db.list_research_for_user(&owner.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].processing_status, ProcessingStatus::Failed);
}

#[tokio::test]
async fn activity_is_newest_first_and_limited() {
    let db = db().await;
    let owner = user(&db, "ada@example.com").await;
    for n in 0..3 {
        db.log_activity(
            &NewActivity::new(&owner.id, EntityType::Idea, format!("idea-{n}"), "idea_created")
                .with_details(json!({ "n": n })),
        )
        .await
        .unwrap();
    }

    let all = db.list_activity(&owner.id, None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].entity_id, "idea-2");
    assert_eq!(all[0].details, json!({ "n": 2 }));

    let limited = db.list_activity(&owner.id, Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(db.list_activity(&owner.id, Some(0)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn activity_requires_an_existing_user() {
    let db = db().await;
    let err = db
        .log_activity(&NewActivity::new("ghost", EntityType::Team, "t1", "team_created"))
        .await;
    assert!(matches!(
        err,
        Err(FvError::Database { kind: fv_core::DatabaseErrorKind::ForeignKeyViolation, .. })
    ));
}

#[tokio::test]
async fn waitlist_ignores_duplicates() {
    let db = db().await;
    assert!(db.add_to_waitlist("founder@startup.io", None).await.unwrap());
    assert!(!db.add_to_waitlist("Founder@startup.io ", Some("footer")).await.unwrap());

    let entries = db.list_waitlist().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, "homepage");
    assert_eq!(entries[0].masked_email(), "fo***@startup.io");
}

#[tokio::test]
async fn admin_stats_summarize_everything() {
    let db = db().await;
    let empty = db.admin_stats().await.unwrap();
    assert_eq!(empty.total_ideas, 0);
    assert_eq!(empty.avg_score, 0.0);

    let ada = user(&db, "ada@example.com").await;
    let bob = user(&db, "bob@example.com").await;
    let a = db.begin_validation(&ada.id, &fields(), None).await.unwrap();
    let b = db.begin_validation(&bob.id, &fields(), None).await.unwrap();
    db.create_idea(&bob.id, &fields()).await.unwrap();
    db.complete_validation(&a.id, &result(8.0), "m", 10).await.unwrap();
    db.complete_validation(&b.id, &result(9.0), "m", 10).await.unwrap();

    let stats = db.admin_stats().await.unwrap();
    assert_eq!(stats.total_ideas, 3);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.completed_validations, 2);
    assert_eq!(stats.avg_score, 8.5);

    let rows = db.list_all_ideas().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|row| row.viability_score.is_some()).count(), 2);
    assert!(rows.iter().any(|row| row.user_email == "bob@example.com"));
}
