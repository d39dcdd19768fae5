mod domain;
mod services;
mod state;
mod store;
mod web;

use crate::state::SharedState;
use anyhow::Context;
use axum::{routing::get_service, Router};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{services::ServeDir, services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY missing, plans will come from the built-in fallback generator");
    }
    let coach = Arc::new(services::coach::CoachService::new(api_key));

    let session_key = match std::env::var("SESSION_KEY") {
        Ok(b64) => general_purpose::STANDARD
            .decode(b64)
            .context("SESSION_KEY must be base64")?,
        Err(_) => {
            tracing::warn!("SESSION_KEY missing, generated a random key; sessions reset on restart");
            let mut key = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            key
        }
    };

    let plans = store::PlanStore::new(256, chrono::Duration::hours(web::session::SESSION_HOURS));

    let shared: SharedState = Arc::new(state::AppState {
        coach,
        plans: plans.clone(),
        session_key,
    });

    // Hourly sweep of expired plan sessions
    let scheduler = JobScheduler::new().await?;
    let plans_for_cleanup = plans.clone();
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            let store = plans_for_cleanup.clone();
            Box::pin(async move {
                let removed = store.cleanup().await;
                if removed > 0 {
                    tracing::info!("Cleaned up {} expired plan sessions", removed);
                }
            })
        })?)
        .await?;
    scheduler.start().await?;

    let static_handler =
        ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .fallback_service(get_service(static_handler))
        .layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("0.0.0.0:{}", port)
    });
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
