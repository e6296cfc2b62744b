use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use actix_web::{delete, get, http::header, post, put, web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::inference::{ModelInference, PredictionSource};
use crate::models::{ApiResponse, Field, FormInput, SelectField, Selection};
use crate::render::render_session;
use crate::session::{FormSession, SessionStore};

type Model = web::Data<Arc<ModelInference>>;
type Sessions = web::Data<SessionStore>;

#[derive(Debug, Deserialize)]
pub struct FieldValue {
    pub value: String,
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct Stats {
    pub sessions_created: u64,
    pub active_sessions: usize,
    pub session_submits: u64,
    pub stateless_predictions: u64,
}

fn session_op<R>(
    sessions: &SessionStore,
    id: Uuid,
    f: impl FnOnce(&mut FormSession) -> R,
) -> Result<R, ApiError> {
    sessions
        .with_session(id, f)
        .ok_or(ApiError::SessionNotFound(id))
}

fn parse_selection(field: SelectField, value: &str) -> Result<Selection, ApiError> {
    Selection::parse(field, value).ok_or_else(|| ApiError::InvalidOption {
        field,
        value: value.to_string(),
    })
}

// ---- JSON API ----

#[get("/api/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[get("/api/model-info")]
async fn model_info(model: Model) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success(model.get_model_info()))
}

#[get("/api/stats")]
async fn stats(model: Model, sessions: Sessions) -> impl Responder {
    let predictions = model.get_stats();
    HttpResponse::Ok().json(ApiResponse::success(Stats {
        sessions_created: sessions.created(),
        active_sessions: sessions.active(),
        session_submits: predictions.session_submits,
        stateless_predictions: predictions.stateless_predictions,
    }))
}

/// Stateless prediction for a complete form.
#[post("/api/predict")]
async fn predict(model: Model, req: web::Json<FormInput>) -> impl Responder {
    let start_time = Instant::now();
    let result = model.predict(&req, PredictionSource::Stateless);
    info!(
        "Prediction served: magnitude={} depth={}",
        result.predicted_magnitude, result.expected_depth
    );

    let mut response = ApiResponse::success(result);
    response.execution_time_ms = Some(start_time.elapsed().as_millis() as u64);
    HttpResponse::Ok().json(response)
}

#[post("/api/sessions")]
async fn create_session(sessions: Sessions) -> Result<HttpResponse, ApiError> {
    let snapshot = sessions.create().ok_or(ApiError::SessionLimit)?;
    info!("Session {} opened", snapshot.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(snapshot)))
}

#[get("/api/sessions/{id}")]
async fn get_session(sessions: Sessions, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let snapshot = session_op(&sessions, id, |session| session.snapshot(id))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}

#[post("/api/sessions/{id}/ready")]
async fn mark_ready(sessions: Sessions, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let snapshot = session_op(&sessions, id, |session| {
        session.mark_ready();
        session.snapshot(id)
    })?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}

#[put("/api/sessions/{id}/fields/{field}")]
async fn update_field(
    sessions: Sessions,
    path: web::Path<(Uuid, Field)>,
    body: web::Json<FieldValue>,
) -> Result<HttpResponse, ApiError> {
    let (id, field) = path.into_inner();
    let value = body.into_inner().value;
    let snapshot = session_op(&sessions, id, |session| {
        session.update_field(field, value);
        session.snapshot(id)
    })?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}

#[put("/api/sessions/{id}/selections/{field}")]
async fn select_field(
    sessions: Sessions,
    path: web::Path<(Uuid, SelectField)>,
    body: web::Json<FieldValue>,
) -> Result<HttpResponse, ApiError> {
    let (id, field) = path.into_inner();
    let selection = parse_selection(field, &body.value)?;
    let snapshot = session_op(&sessions, id, |session| {
        session.select_field(selection);
        session.snapshot(id)
    })?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}

#[post("/api/sessions/{id}/submit")]
async fn submit(
    model: Model,
    sessions: Sessions,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let snapshot = session_op(&sessions, id, |session| {
        session.submit(&model);
        session.snapshot(id)
    })?;
    info!("Session {} submitted", id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(snapshot)))
}

#[delete("/api/sessions/{id}")]
async fn end_session(sessions: Sessions, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    if sessions.remove(id) {
        info!("Session {} closed", id);
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

// ---- HTML pages ----

/// Opens a session for the browser and sends it to its page. The page load
/// is the client's readiness signal.
#[get("/")]
async fn index(sessions: Sessions) -> Result<HttpResponse, ApiError> {
    let id = sessions.create().ok_or(ApiError::SessionLimit)?.id;
    session_op(&sessions, id, FormSession::mark_ready)?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/sessions/{id}")))
        .finish())
}

fn page_response(id: Uuid, session: &FormSession) -> HttpResponse {
    match render_session(id, session) {
        Some(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        None => HttpResponse::NoContent().finish(),
    }
}

#[get("/sessions/{id}")]
async fn page(sessions: Sessions, id: web::Path<Uuid>) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    session_op(&sessions, id, |session| page_response(id, session))
}

/// Applies every posted field, then submits.
#[post("/sessions/{id}")]
async fn submit_form(
    model: Model,
    sessions: Sessions,
    id: web::Path<Uuid>,
    form: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let posted = form.into_inner();

    let mut selections = Vec::new();
    for field in [SelectField::Country, SelectField::City] {
        match posted.get(field.field().name()) {
            Some(value) if !value.is_empty() => selections.push(parse_selection(field, value)?),
            _ => {}
        }
    }

    session_op(&sessions, id, |session| {
        for field in Field::TEXT {
            if let Some(value) = posted.get(field.name()) {
                session.update_field(field, value.clone());
            }
        }
        for selection in selections {
            session.select_field(selection);
        }
        session.submit(&model);
        page_response(id, session)
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().limit(64 * 1024).error_handler(|err, _| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::FormConfig::default().limit(64 * 1024).error_handler(|err, _| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .service(health_check)
    .service(model_info)
    .service(stats)
    .service(predict)
    .service(create_session)
    .service(get_session)
    .service(mark_ready)
    .service(update_field)
    .service(select_field)
    .service(submit)
    .service(end_session)
    .service(index)
    .service(page)
    .service(submit_form);
}
