//! DDL run by `Database::migrate`. Timestamps are RFC 3339 text; JSON columns are text.

pub(crate) const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT,
        avatar_url TEXT,
        provider TEXT NOT NULL DEFAULT 'email',
        subscription_tier TEXT NOT NULL DEFAULT 'free',
        ideas_validated INTEGER NOT NULL DEFAULT 0,
        max_ideas_allowed INTEGER NOT NULL DEFAULT 10,
        team_code TEXT,
        created_at TEXT NOT NULL,
        last_login TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ideas (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        industry TEXT,
        target_market TEXT,
        revenue_model TEXT,
        key_features TEXT,
        problem_solving TEXT,
        competitive_advantage TEXT,
        market_size_estimate TEXT,
        timeline TEXT,
        status TEXT NOT NULL DEFAULT 'draft'
            CHECK (status IN ('draft', 'validating', 'completed', 'failed')),
        is_draft INTEGER NOT NULL DEFAULT 1,
        validation_progress INTEGER NOT NULL DEFAULT 0,
        share_token TEXT UNIQUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ideas_user ON ideas(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS validation_reports (
        id TEXT PRIMARY KEY,
        idea_id TEXT NOT NULL UNIQUE REFERENCES ideas(id) ON DELETE CASCADE,
        viability_score REAL NOT NULL,
        tam_data TEXT NOT NULL,
        sam_data TEXT NOT NULL,
        som_data TEXT NOT NULL,
        swot_analysis TEXT NOT NULL,
        competitor_analysis TEXT NOT NULL,
        market_trends TEXT NOT NULL,
        usp TEXT NOT NULL,
        business_model TEXT NOT NULL,
        risks_recommendations TEXT NOT NULL,
        business_plan TEXT NOT NULL,
        ai_provider TEXT NOT NULL,
        processing_time INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teams (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        team_code TEXT NOT NULL UNIQUE,
        owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS team_members (
        team_id TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role TEXT NOT NULL DEFAULT 'member' CHECK (role IN ('owner', 'admin', 'member')),
        joined_at TEXT NOT NULL,
        PRIMARY KEY (team_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nexus_research (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        source_firm TEXT,
        document_type TEXT NOT NULL,
        document_url TEXT,
        document_content TEXT NOT NULL,
        summary TEXT,
        emerging_trends TEXT,
        startup_ideas TEXT,
        market_calculations TEXT,
        strategic_recommendations TEXT,
        startup_potential_score REAL,
        processing_status TEXT NOT NULL DEFAULT 'processing'
            CHECK (processing_status IN ('processing', 'completed', 'failed')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_nexus_user ON nexus_research(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS activity_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        action TEXT NOT NULL,
        details TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_activity_user ON activity_logs(user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS waitlist (
        email TEXT PRIMARY KEY,
        source TEXT NOT NULL DEFAULT 'homepage',
        created_at TEXT NOT NULL
    )
    "#,
];
