use crate::Database;
use crate::codec::{get, get_enum, get_time, new_id, now};
use crate::error::{db_err, is_unique_violation};
use crate::tokens::generate_team_code;
use fv_core::{FvError, Result, Team, TeamMember, TeamRole, User, normalize_team_code};
use sqlx::sqlite::SqliteRow;

const TEAM_CODE_ATTEMPTS: usize = 3;

const TEAM_COLUMNS: &str = "t.id, t.name, t.team_code, t.owner_id, t.description, t.created_at";

fn team_from_row(row: &SqliteRow) -> Result<Team> {
    Ok(Team {
        id: get(row, "id")?,
        name: get(row, "name")?,
        team_code: get(row, "team_code")?,
        owner_id: get(row, "owner_id")?,
        description: get(row, "description")?,
        created_at: get_time(row, "created_at")?,
    })
}

fn member_from_row(row: &SqliteRow) -> Result<TeamMember> {
    Ok(TeamMember {
        team_id: get(row, "team_id")?,
        user_id: get(row, "user_id")?,
        role: get_enum(row, "role", TeamRole::parse)?,
        joined_at: get_time(row, "joined_at")?,
        email: get(row, "email")?,
        full_name: get(row, "full_name")?,
        avatar_url: get(row, "avatar_url")?,
    })
}

impl Database {
    /// Creates a team named after its owner, adds the owner as `owner`, and stores the new
    /// code on the owner's profile.
    pub async fn create_team(&self, owner: &User, description: Option<&str>) -> Result<Team> {
        let name = format!("{}'s Team", owner.display_name());
        let id = new_id();

        let mut attempt = 1;
        loop {
            match self.insert_team(&id, &name, owner, description).await {
                Err(error) if is_unique_violation(&error) && attempt < TEAM_CODE_ATTEMPTS => {
                    fv_telemetry::debug!(attempt, "team code collision; retrying");
                    attempt += 1;
                }
                Err(error) => return Err(error),
                Ok(()) => break,
            }
        }

        self.get_team(&id).await?.ok_or_else(|| FvError::not_found("Team"))
    }

    async fn insert_team(
        &self,
        id: &str,
        name: &str,
        owner: &User,
        description: Option<&str>,
    ) -> Result<()> {
        let code = generate_team_code();
        let (_, at) = now();
        let mut tx = self.pool.begin().await.map_err(|e| db_err("transaction failed", e))?;

        sqlx::query(
            "INSERT INTO teams (id, name, team_code, owner_id, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(&code)
        .bind(&owner.id)
        .bind(description)
        .bind(&at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("insert team failed", e))?;

        sqlx::query(
            "INSERT INTO team_members (team_id, user_id, role, joined_at) VALUES (?, ?, 'owner', ?)",
        )
        .bind(id)
        .bind(&owner.id)
        .bind(&at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("insert team member failed", e))?;

        sqlx::query("UPDATE users SET team_code = ? WHERE id = ?")
            .bind(&code)
            .bind(&owner.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("update user failed", e))?;

        tx.commit().await.map_err(|e| db_err("commit failed", e))
    }

    pub async fn get_team(&self, id: &str) -> Result<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("team lookup failed", e))?;
        row.as_ref().map(team_from_row).transpose()
    }

    /// Codes match case-insensitively.
    pub async fn get_team_by_code(&self, code: &str) -> Result<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.team_code = ?"))
            .bind(normalize_team_code(code))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("team lookup failed", e))?;
        row.as_ref().map(team_from_row).transpose()
    }

    /// Joins as `member`. Joining a team twice keeps the existing role.
    pub async fn join_team(&self, code: &str, user_id: &str) -> Result<Team> {
        let team = self.get_team_by_code(code).await?.ok_or_else(|| FvError::not_found("Team"))?;
        let (_, at) = now();

        sqlx::query(
            "INSERT OR IGNORE INTO team_members (team_id, user_id, role, joined_at) \
             VALUES (?, ?, 'member', ?)",
        )
        .bind(&team.id)
        .bind(user_id)
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("join team failed", e))?;

        Ok(team)
    }

    /// Adds a member or changes the role of an existing one.
    pub async fn add_member(&self, team_id: &str, user_id: &str, role: TeamRole) -> Result<()> {
        let (_, at) = now();
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(team_id, user_id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(&at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("add team member failed", e))?;
        Ok(())
    }

    /// Teams the user belongs to, newest first.
    pub async fn list_teams_for_user(&self, user_id: &str) -> Result<Vec<Team>> {
        let rows = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams t \
             JOIN team_members m ON m.team_id = t.id \
             WHERE m.user_id = ? ORDER BY t.created_at DESC, t.rowid DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list teams failed", e))?;
        rows.iter().map(team_from_row).collect()
    }

    /// Members in join order, with their profile fields.
    pub async fn list_members(&self, team_id: &str) -> Result<Vec<TeamMember>> {
        let rows = sqlx::query(
            "SELECT m.team_id, m.user_id, m.role, m.joined_at, u.email, u.full_name, u.avatar_url \
             FROM team_members m LEFT JOIN users u ON u.id = m.user_id \
             WHERE m.team_id = ? ORDER BY m.joined_at ASC, m.rowid ASC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("list team members failed", e))?;
        rows.iter().map(member_from_row).collect()
    }
}
