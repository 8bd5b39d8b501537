use crate::error::AppError;
use crate::models::command::CommandRequest;
use crate::services::events;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};

pub async fn run_command(
    state: web::types::State<AppState>,
    body: web::types::Json<CommandRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let response = events::handle_command(&state, &req.channel_id, &req.text)?;
    Ok(HttpResponse::Ok().json(&response))
}
