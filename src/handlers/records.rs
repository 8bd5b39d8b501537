use crate::error::AppError;
use crate::models::record::{ClassifierOutputRequest, SubmissionRequest};
use crate::services::{events, records};
use crate::state::AppState;
use ntex::web::{self, HttpResponse};

pub async fn submit_record(
    state: web::types::State<AppState>,
    body: web::types::Json<SubmissionRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = events::handle_submission(&state, &req.channel_id, req.candidate)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn submit_classifier_output(
    state: web::types::State<AppState>,
    body: web::types::Json<ClassifierOutputRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = events::handle_classifier_output(&state, &req.channel_id, &req.output)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn get_record(
    state: web::types::State<AppState>,
    path: web::types::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let record = state
        .db
        .with_conn(|conn| records::get_by_id(conn, id))?
        .ok_or_else(|| AppError::NotFound(format!("Record {} does not exist", id)))?;
    Ok(HttpResponse::Ok().json(&record))
}
