use crate::ports::TimeProvider;
use crate::records::{Complaint, ComplaintStatus, Sender};
use crate::state;
use crate::stats;
use crate::templates;

use axum::extract::Form;
use axum::extract::Path as AxumPath;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Deserialize;

use super::auth::sanitize_next;
use super::complaints::MessageForm;

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardQuery {
    updated: Option<String>,
    responded: Option<String>,
}

pub(crate) async fn dashboard(
    State(state): State<state::AppState>,
    Query(query): Query<DashboardQuery>,
) -> templates::AdminDashboardTemplate {
    let complaints = state.complaints.load_all();
    let total = complaints.len();
    let status_counts = stats::status_counts(&complaints);
    let category_counts = stats::category_counts(&complaints);
    let recent = recent_complaints(complaints);

    templates::AdminDashboardTemplate {
        app_name: state.config.app_name,
        total,
        status_counts,
        category_counts,
        recent,
        toast: action_toast(&query),
    }
}

/// The five newest complaints, newest first.
fn recent_complaints(mut complaints: Vec<Complaint>) -> Vec<Complaint> {
    complaints.sort_by_key(|complaint| std::cmp::Reverse(complaint.created_at));
    complaints.truncate(5);
    complaints
}

fn action_toast(query: &DashboardQuery) -> Option<templates::Toast> {
    if let Some(status) = query.updated.as_deref() {
        let label = ComplaintStatus::parse(status)
            .map(|status| status.label())
            .unwrap_or(status);
        return Some(templates::Toast::success(
            "Status Updated",
            format!("Complaint status changed to {label}"),
        ));
    }
    if query.responded.is_some() {
        return Some(templates::Toast::success(
            "Response Sent",
            "Your response has been recorded and the complaint resolved.".to_string(),
        ));
    }
    None
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusForm {
    status: String,
    next: Option<String>,
}

pub(crate) async fn update_status(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let status = ComplaintStatus::parse(form.status.trim())
        .ok_or((StatusCode::BAD_REQUEST, "invalid status"))?;

    let updated = state.complaints.set_status(id, status).map_err(|err| {
        tracing::warn!("failed to update complaint {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    if updated.is_none() {
        return Err((StatusCode::NOT_FOUND, "complaint not found"));
    }

    let next = sanitize_next(form.next.as_deref()).unwrap_or_else(|| "/admin".to_string());
    Ok(Redirect::to(&format!(
        "{next}?updated={}",
        status.as_str()
    )))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseForm {
    response: String,
    next: Option<String>,
}

pub(crate) async fn respond(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    Form(form): Form<ResponseForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let next = sanitize_next(form.next.as_deref()).unwrap_or_else(|| "/admin".to_string());
    let response = form.response.trim();
    if response.is_empty() {
        return Ok(Redirect::to(&next));
    }

    let updated = state.complaints.respond(id, response).map_err(|err| {
        tracing::warn!("failed to record response for complaint {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;
    if updated.is_none() {
        return Err((StatusCode::NOT_FOUND, "complaint not found"));
    }

    Ok(Redirect::to(&format!("{next}?responded=1")))
}

pub(crate) async fn conversations(
    State(state): State<state::AppState>,
) -> templates::AdminConversationsTemplate {
    let entries = state
        .complaints
        .load_all()
        .into_iter()
        .map(|complaint| {
            let unread = state.messages.unread_count(complaint.id);
            templates::ConversationEntry { complaint, unread }
        })
        .collect();

    templates::AdminConversationsTemplate {
        app_name: state.config.app_name,
        entries,
    }
}

pub(crate) async fn conversation(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    Query(query): Query<DashboardQuery>,
) -> Result<templates::AdminConversationTemplate, (StatusCode, &'static str)> {
    let complaint = state
        .complaints
        .find(id)
        .ok_or((StatusCode::NOT_FOUND, "complaint not found"))?;

    // Opening the conversation is what marks the thread read.
    if let Err(err) = state.messages.mark_thread_read(complaint.id) {
        tracing::warn!("failed to mark thread {id} read: {err}");
    }

    Ok(templates::AdminConversationTemplate {
        app_name: state.config.app_name,
        messages: state.messages.thread(complaint.id),
        revision: state.messages.revision(),
        complaint,
        toast: action_toast(&query),
    })
}

pub(crate) async fn send_message(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let complaint = state
        .complaints
        .find(id)
        .ok_or((StatusCode::NOT_FOUND, "complaint not found"))?;

    let body = form.message.trim();
    if !body.is_empty() {
        state.time.sleep(state.config.message_delay).await;
        state
            .messages
            .send(complaint.id, Sender::Admin, "Admin", body, state.time.now())
            .map_err(|err| {
                tracing::warn!("failed to persist admin message: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            })?;
    }

    Ok(Redirect::to(&format!("/admin/messages/{}", complaint.id)))
}
