use super::ideas::{UserIdQuery, require_user_id};
use crate::auth::Caller;
use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use axum::{Json, extract::State, http::StatusCode};
use fv_core::{EntityType, FvError, NewActivity, Team, TeamMember};
use fv_store::Database;
use fv_telemetry::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone)]
pub struct TeamsController {
    database: Database,
}

impl TeamsController {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// `action` is one of `create`, `join`, or `get_members`.
#[derive(Debug, Deserialize)]
pub struct TeamActionRequest {
    pub action: String,
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinTeamRequest {
    #[serde(default)]
    pub team_code: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub members: Vec<TeamMember>,
}

fn required<'a>(value: Option<&'a str>, message: &str) -> ApiResult<&'a str> {
    value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| ApiError::validation(message))
}

async fn record(database: &Database, user_id: &str, team: &Team, action: &str) {
    let entry = NewActivity::new(user_id, EntityType::Team, &team.id, action)
        .with_details(json!({ "team_code": team.team_code, "team_name": team.name }));
    if let Err(error) = database.log_activity(&entry).await {
        warn!(team.id = %team.id, error = %error, "could not record team activity");
    }
}

pub async fn list_teams(
    State(controller): State<TeamsController>,
    ApiQuery(query): ApiQuery<UserIdQuery>,
) -> ApiResult<Json<TeamsResponse>> {
    let user_id = require_user_id(query.user_id.as_deref())?;
    let teams = controller.database.list_teams_for_user(user_id).await?;
    Ok(Json(TeamsResponse { teams }))
}

pub async fn team_action(
    State(controller): State<TeamsController>,
    caller: Caller,
    ApiJson(req): ApiJson<TeamActionRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let database = &controller.database;
    let user = caller.user(database).await?;

    match req.action.as_str() {
        "create" => {
            let team = database.create_team(&user, req.description.as_deref()).await?;
            record(database, &user.id, &team, "team_created").await;
            Ok((StatusCode::CREATED, Json(json!(TeamResponse { team }))))
        }
        "join" => {
            let code = required(req.team_code.as_deref(), "Team code is required")?;
            let team = database.join_team(code, &user.id).await?;
            record(database, &user.id, &team, "team_joined").await;
            Ok((StatusCode::OK, Json(json!(TeamResponse { team }))))
        }
        "get_members" => {
            let team_id = required(req.team_id.as_deref(), "team_id is required")?;
            let members = database.list_members(team_id).await?;
            if !members.iter().any(|member| member.user_id == user.id) {
                return Err(FvError::Forbidden.into());
            }
            Ok((StatusCode::OK, Json(json!(MembersResponse { members }))))
        }
        _ => Err(ApiError::validation("Invalid action")),
    }
}

/// Join by code on behalf of an explicit user id.
pub async fn join_team(
    State(controller): State<TeamsController>,
    ApiJson(req): ApiJson<JoinTeamRequest>,
) -> ApiResult<Json<TeamResponse>> {
    let code = required(req.team_code.as_deref(), "Team code is required")?;
    let user_id = require_user_id(req.user_id.as_deref())?;
    let database = &controller.database;

    let team = database.join_team(code, user_id).await?;
    record(database, user_id, &team, "team_joined").await;
    Ok(Json(TeamResponse { team }))
}
