use crate::cli::ServeArgs;
use anyhow::{Context, Result};
use fv_agent::{NexusAnalyst, Validator};
use fv_core::Llm;
use fv_model::{OpenRouterClient, OpenRouterConfig, RetryConfig};
use fv_server::{ServerConfig, create_app};
use fv_store::Database;
use fv_telemetry::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Builds the model client, or `None` when no API key is configured.
fn model_client(args: &ServeArgs) -> Result<Option<Arc<dyn Llm>>> {
    let Some(api_key) = args.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
        return Ok(None);
    };

    let mut config = OpenRouterConfig {
        api_key: api_key.to_string(),
        ..Default::default()
    }
    .with_timeout(Duration::from_secs(args.llm_timeout_secs));
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(base_url) = &args.llm_base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(app_url) = &args.app_url {
        config = config.with_app_url(app_url);
    }

    let client = OpenRouterClient::new(config)
        .context("failed to build the model client")?
        .with_retry_config(RetryConfig::default().with_max_retries(args.llm_max_retries));
    Ok(Some(Arc::new(client)))
}

pub async fn run_serve(database: Database, args: ServeArgs) -> Result<()> {
    database.migrate().await.context("failed to create the database schema")?;

    let (validator, analyst) = match model_client(&args)? {
        Some(llm) => {
            let mut validator = Validator::new(llm.clone());
            let mut analyst = NexusAnalyst::new(llm);
            if let Some(model) = &args.model {
                validator = validator.with_model(model);
                analyst = analyst.with_model(model);
            }
            (validator, analyst)
        }
        None => {
            warn!("OPENROUTER_API_KEY is not set; every analysis will use fallback output");
            (Validator::offline(), NexusAnalyst::offline())
        }
    };

    if args.admin_emails.is_empty() {
        warn!("no admin emails configured; the admin report is unreachable");
    }

    let config = ServerConfig::new(database)
        .with_validator(validator)
        .with_analyst(analyst)
        .with_admin_emails(&args.admin_emails)
        .with_allowed_origins(args.allowed_origins.clone())
        .with_error_details(args.expose_error_details);

    let app = create_app(config);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "FutureValidate API listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
