use crate::ports::TimeProvider;
use crate::records::Sender;
use crate::repositories::NewComplaint;
use crate::session::Role;
use crate::state;
use crate::templates;

use axum::extract::Form;
use axum::extract::Path as AxumPath;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Deserialize;

/// The category choices offered on the submission form. Stored complaints
/// keep whatever string was submitted; the list is a form affordance, not a
/// storage constraint.
pub(crate) const CATEGORIES: &[&str] = &[
    "Maintenance",
    "Plumbing",
    "Electrical",
    "Noise Complaint",
    "Security",
    "Cleanliness",
    "Other",
];

fn current_user(
    state: &state::AppState,
    headers: &HeaderMap,
) -> Result<String, (StatusCode, &'static str)> {
    state
        .sessions
        .current(Role::User, headers)
        .ok_or((StatusCode::UNAUTHORIZED, "unauthorized"))
}

pub(crate) async fn user_dashboard(
    State(state): State<state::AppState>,
    headers: HeaderMap,
) -> Result<templates::UserDashboardTemplate, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;
    let complaints = state.complaints.for_user(&user_name);

    Ok(templates::UserDashboardTemplate {
        app_name: state.config.app_name,
        user_name,
        complaints,
    })
}

pub(crate) async fn complaint_form(
    State(state): State<state::AppState>,
    headers: HeaderMap,
) -> Result<templates::ComplaintFormTemplate, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;

    Ok(templates::ComplaintFormTemplate {
        app_name: state.config.app_name,
        user_name,
        categories: CATEGORIES,
        error: String::new(),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComplaintForm {
    building_code: String,
    category: String,
    complaint: String,
}

pub(crate) async fn complaint_submit(
    State(state): State<state::AppState>,
    headers: HeaderMap,
    Form(form): Form<ComplaintForm>,
) -> Result<Redirect, (StatusCode, templates::ComplaintFormTemplate)> {
    let user_name = match current_user(&state, &headers) {
        Ok(user_name) => user_name,
        Err(_) => {
            return Err(form_error(
                &state,
                String::new(),
                StatusCode::UNAUTHORIZED,
                "Session expired. Please sign in again.",
            ));
        }
    };

    let building_code = form.building_code.trim();
    let category = form.category.trim();
    let complaint = form.complaint.trim();
    if building_code.is_empty() || category.is_empty() || complaint.is_empty() {
        return Err(form_error(
            &state,
            user_name,
            StatusCode::BAD_REQUEST,
            "Please fill in all required fields",
        ));
    }

    // Simulated network latency; cosmetic only.
    state.time.sleep(state.config.submit_delay).await;

    let submitted = state
        .complaints
        .submit(
            NewComplaint {
                name: user_name.clone(),
                building_code: building_code.to_string(),
                category: category.to_string(),
                complaint: complaint.to_string(),
            },
            state.time.now(),
        )
        .map_err(|err| {
            tracing::warn!("failed to persist complaint: {err}");
            form_error(
                &state,
                user_name,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error.",
            )
        })?;

    Ok(Redirect::to(&format!(
        "/user/complaints/{}/submitted",
        submitted.id
    )))
}

pub(crate) async fn complaint_success(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
) -> Result<templates::ComplaintSuccessTemplate, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;
    let complaint = state
        .complaints
        .find(id)
        .filter(|complaint| complaint.name == user_name)
        .ok_or((StatusCode::NOT_FOUND, "complaint not found"))?;

    Ok(templates::ComplaintSuccessTemplate {
        app_name: state.config.app_name,
        short_id: complaint.short_id(),
    })
}

pub(crate) async fn user_conversations(
    State(state): State<state::AppState>,
    headers: HeaderMap,
) -> Result<templates::UserConversationsTemplate, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;
    let complaints = state.complaints.for_user(&user_name);

    Ok(templates::UserConversationsTemplate {
        app_name: state.config.app_name,
        complaints,
    })
}

pub(crate) async fn user_conversation(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
) -> Result<templates::UserConversationTemplate, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;
    let complaint = state
        .complaints
        .find(id)
        .filter(|complaint| complaint.name == user_name)
        .ok_or((StatusCode::NOT_FOUND, "complaint not found"))?;
    let messages = state.messages.thread(complaint.id);

    Ok(templates::UserConversationTemplate {
        app_name: state.config.app_name,
        complaint,
        messages,
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageForm {
    pub(crate) message: String,
}

pub(crate) async fn user_send_message(
    State(state): State<state::AppState>,
    AxumPath(id): AxumPath<i64>,
    headers: HeaderMap,
    Form(form): Form<MessageForm>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let user_name = current_user(&state, &headers)?;
    let complaint = state
        .complaints
        .find(id)
        .filter(|complaint| complaint.name == user_name)
        .ok_or((StatusCode::NOT_FOUND, "complaint not found"))?;

    let body = form.message.trim();
    if !body.is_empty() {
        state.time.sleep(state.config.message_delay).await;
        state
            .messages
            .send(complaint.id, Sender::User, &user_name, body, state.time.now())
            .map_err(|err| {
                tracing::warn!("failed to persist message: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            })?;
    }

    Ok(Redirect::to(&format!("/user/messages/{}", complaint.id)))
}

fn form_error(
    state: &state::AppState,
    user_name: String,
    status: StatusCode,
    message: &str,
) -> (StatusCode, templates::ComplaintFormTemplate) {
    (
        status,
        templates::ComplaintFormTemplate {
            app_name: state.config.app_name.clone(),
            user_name,
            categories: CATEGORIES,
            error: message.to_string(),
        },
    )
}
