//! Per-event orchestration: run one mutation, then let the ranking engine
//! decide whether the channel gets a fresh leaderboard. Every failure stays
//! inside its own event and is reported back to the requester.

use crate::error::AppError;
use crate::models::command::{Command, CommandResponse};
use crate::models::correction::CorrectionResult;
use crate::models::record::{RawCandidate, SubmissionResult};
use crate::notifier::deliver;
use crate::services::{correction, ranking, submission};
use crate::state::AppState;

const HELP_TEXT: &str =
    "No image found. Post a result screenshot, or use !top16 or !fix <id> <field> <value>";

fn report(state: &AppState, channel_id: &str, err: &AppError) {
    match err {
        AppError::Db(e) => tracing::error!("Store failure, event abandoned: {}", e),
        AppError::ExternalService(e) => tracing::error!("Classifier failure: {}", e),
        other => tracing::warn!("Rejected event: {}", other),
    }
    deliver(state.notifier.as_ref(), channel_id, &err.user_message());
}

/// Refreshes and posts the table when it changed. The post happens under the
/// ranking lock. A failed refresh is logged only; the mutation before it
/// already succeeded.
fn publish_if_changed(state: &AppState, channel_id: &str, force: bool) -> Option<String> {
    let posted = state.ranking.refresh_with(&state.db, force, |snapshot| {
        deliver(state.notifier.as_ref(), channel_id, &ranking::format_table(snapshot));
    });
    match posted {
        Ok(Some(snapshot)) => Some(ranking::format_table(&snapshot)),
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Leaderboard refresh failed: {}", e);
            None
        }
    }
}

/// `candidate` is `None` when the classifier found no record in the image.
pub fn handle_submission(
    state: &AppState,
    channel_id: &str,
    candidate: Option<RawCandidate>,
) -> Result<SubmissionResult, AppError> {
    let result = candidate
        .ok_or_else(|| AppError::ExternalService("classifier found no record".into()))
        .and_then(|candidate| submission::submit(&state.db, candidate));

    let record = match result {
        Ok(record) => record,
        Err(e) => {
            report(state, channel_id, &e);
            return Err(e);
        }
    };

    let leaderboard = publish_if_changed(state, channel_id, false);
    let message = submission::acceptance_message(&record);
    deliver(state.notifier.as_ref(), channel_id, &message);

    Ok(SubmissionResult {
        record,
        message,
        leaderboard,
    })
}

/// Decodes raw classifier text, then submits it.
pub fn handle_classifier_output(
    state: &AppState,
    channel_id: &str,
    output: &str,
) -> Result<SubmissionResult, AppError> {
    match RawCandidate::from_classifier_output(output) {
        Ok(candidate) => handle_submission(state, channel_id, Some(candidate)),
        Err(e) => {
            report(state, channel_id, &e);
            Err(e)
        }
    }
}

pub fn handle_correction(
    state: &AppState,
    channel_id: &str,
    id: i64,
    field: &str,
    value: &str,
) -> Result<CorrectionResult, AppError> {
    let record = match correction::correct(&state.db, id, field, value) {
        Ok(record) => record,
        Err(e) => {
            report(state, channel_id, &e);
            return Err(e);
        }
    };

    let leaderboard = publish_if_changed(state, channel_id, false);
    let message = correction::confirmation_message(&record, field);
    deliver(state.notifier.as_ref(), channel_id, &message);

    Ok(CorrectionResult {
        record,
        message,
        leaderboard,
    })
}

pub fn handle_command(
    state: &AppState,
    channel_id: &str,
    text: &str,
) -> Result<CommandResponse, AppError> {
    let command = match Command::parse(text) {
        Ok(command) => command,
        Err(e) => {
            report(state, channel_id, &e);
            return Err(e);
        }
    };

    match command {
        Command::ShowLeaderboard => {
            let forced = state.ranking.refresh_with(&state.db, true, |snapshot| {
                deliver(state.notifier.as_ref(), channel_id, &ranking::format_table(snapshot));
            });
            match forced {
                Ok(snapshot) => Ok(CommandResponse {
                    message: ranking::format_table(&snapshot.unwrap_or_default()),
                }),
                Err(e) => {
                    report(state, channel_id, &e);
                    Err(e)
                }
            }
        }
        Command::Fix { id, field, value } => {
            let result = handle_correction(state, channel_id, id, &field, &value)?;
            Ok(CommandResponse {
                message: result.message,
            })
        }
        Command::Unknown => {
            deliver(state.notifier.as_ref(), channel_id, HELP_TEXT);
            Ok(CommandResponse {
                message: HELP_TEXT.to_string(),
            })
        }
    }
}
