use crate::domain::habits::HabitList;
use crate::domain::plan::Plan;
use crate::state::SharedState;
use crate::store::StoredPlan;
use crate::web::session::{self, PlanSession};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(submit).get(results).delete(reset))
        .with_state(state)
}

#[derive(Deserialize)]
struct SubmitPlanPayload {
    #[serde(default)]
    habits: Vec<String>,
}

#[derive(Serialize)]
struct PlanResponse {
    session_id: Uuid,
    habits: Vec<String>,
    plan: Plan,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct PlanErrorResponse {
    error: String,
    message: String,
}

async fn submit(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitPlanPayload>,
) -> Result<impl IntoResponse, (StatusCode, Json<PlanErrorResponse>)> {
    let habits = HabitList::new(payload.habits).map_err(|err| {
        tracing::debug!("Rejected habit submission: {}", err);
        (
            StatusCode::BAD_REQUEST,
            Json(PlanErrorResponse {
                error: "invalid_habits".to_string(),
                message: "Please enter at least one habit!".to_string(),
            }),
        )
    })?;

    let plan = state.coach.generate_plan(&habits).await;
    let created_at = Utc::now();

    let session_id = state
        .plans
        .insert(StoredPlan {
            habits: habits.to_vec(),
            plan: plan.clone(),
            created_at,
        })
        .await;

    let token = session::sign_session(session_id, &state.session_key).map_err(|err| {
        tracing::error!("Failed to sign plan session: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PlanErrorResponse {
                error: "session_error".to_string(),
                message: "Something went wrong. Please try again.".to_string(),
            }),
        )
    })?;

    tracing::info!(
        "Generated plan {} for {} habit(s)",
        session_id,
        habits.len()
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::SET_COOKIE,
        session_cookie(&token).parse().unwrap(),
    );

    Ok((
        headers,
        Json(PlanResponse {
            session_id,
            habits: habits.to_vec(),
            plan,
            created_at,
        }),
    ))
}

async fn results(
    PlanSession(plan_id): PlanSession,
    State(state): State<SharedState>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<PlanErrorResponse>)> {
    let stored = state.plans.get(plan_id).await.ok_or((
        StatusCode::NOT_FOUND,
        Json(PlanErrorResponse {
            error: "not_found".to_string(),
            message: "No habit plan found. Please submit your habits first.".to_string(),
        }),
    ))?;

    Ok(Json(PlanResponse {
        session_id: plan_id,
        habits: stored.habits,
        plan: stored.plan,
        created_at: stored.created_at,
    }))
}

/// Best-effort: drops the stored plan when the cookie verifies, always
/// clears the cookie so the client can start over.
async fn reset(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session::extract_token(&headers) {
        if let Ok(claims) = session::verify_session(&token, &state.session_key) {
            state.plans.remove(claims.plan_id).await;
        }
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        axum::http::header::SET_COOKIE,
        "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
            .parse()
            .unwrap(),
    );
    (StatusCode::NO_CONTENT, response_headers)
}

fn session_cookie(token: &str) -> String {
    // Secure flag only where TLS terminates in front of us
    let is_production = std::env::var("RAILWAY_ENVIRONMENT").is_ok()
        || std::env::var("RENDER").is_ok()
        || std::env::var("FLY_APP_NAME").is_ok()
        || std::env::var("PRODUCTION").is_ok();
    let secure_flag = if is_production { "; Secure" } else { "" };
    format!("session={token}; HttpOnly; SameSite=Lax; Path=/{secure_flag}")
}
