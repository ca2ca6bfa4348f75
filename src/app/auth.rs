use crate::repositories::{SignUpError, verify_password};
use crate::session::Role;
use crate::state;
use crate::templates;

use axum::Json;
use axum::body::Body;
use axum::extract::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize)]
struct AuthErrorResponse {
    error: &'static str,
}

/// Routes under each portal require that portal's session; API routes get a
/// JSON 401 instead of a redirect.
pub(crate) async fn auth_middleware(
    State(state): State<state::AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if is_public_path(path) {
        return next.run(req).await;
    }

    if path.starts_with("/api/") {
        if state.sessions.current(Role::Admin, req.headers()).is_some() {
            return next.run(req).await;
        }
        return (
            StatusCode::UNAUTHORIZED,
            Json(AuthErrorResponse {
                error: "unauthorized",
            }),
        )
            .into_response();
    }

    if path == "/admin" || path.starts_with("/admin/") {
        if state.sessions.current(Role::Admin, req.headers()).is_some() {
            return next.run(req).await;
        }
        return Redirect::to("/admin/login").into_response();
    }

    if path == "/user" || path.starts_with("/user/") {
        if state.sessions.current(Role::User, req.headers()).is_some() {
            return next.run(req).await;
        }
        return Redirect::to("/user/login").into_response();
    }

    next.run(req).await
}

fn is_public_path(path: &str) -> bool {
    path == "/"
        || path == "/health"
        || path == "/user/login"
        || path == "/user/signup"
        || path == "/admin/login"
        || path.starts_with("/static/")
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    name: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignUpForm {
    name: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    created: Option<String>,
}

pub(crate) async fn user_login_form(
    State(state): State<state::AppState>,
    Query(query): Query<LoginQuery>,
) -> templates::UserLoginTemplate {
    let notice = if query.created.is_some() {
        "Account created successfully! Please sign in.".to_string()
    } else {
        String::new()
    };
    templates::UserLoginTemplate {
        app_name: state.config.app_name,
        signup: false,
        error: String::new(),
        notice,
    }
}

pub(crate) async fn user_login_submit(
    State(state): State<state::AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, templates::UserLoginTemplate)> {
    let name = form.name.trim();
    if name.is_empty() || form.password.trim().is_empty() {
        return Err(user_login_error(&state.config.app_name));
    }

    let Some(user) = state.users.verify_login(name, &form.password) else {
        return Err(user_login_error(&state.config.app_name));
    };

    logged_in_response(&state, Role::User, &user.name, "/user").map_err(|err| {
        tracing::warn!("failed to issue user session: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::UserLoginTemplate {
                app_name: state.config.app_name,
                signup: false,
                error: "Failed to sign in.".to_string(),
                notice: String::new(),
            },
        )
    })
}

pub(crate) async fn user_signup_form(
    State(state): State<state::AppState>,
) -> templates::UserLoginTemplate {
    templates::UserLoginTemplate {
        app_name: state.config.app_name,
        signup: true,
        error: String::new(),
        notice: String::new(),
    }
}

pub(crate) async fn user_signup_submit(
    State(state): State<state::AppState>,
    Form(form): Form<SignUpForm>,
) -> Result<Redirect, (StatusCode, templates::UserLoginTemplate)> {
    let name = form.name.trim();
    if name.is_empty() || form.password.is_empty() {
        return Err(signup_error(
            &state.config.app_name,
            StatusCode::BAD_REQUEST,
            "Please fill in all fields",
        ));
    }
    if form.password != form.confirm_password {
        return Err(signup_error(
            &state.config.app_name,
            StatusCode::BAD_REQUEST,
            "Passwords do not match",
        ));
    }

    match state.users.sign_up(name, &form.password) {
        Ok(_) => Ok(Redirect::to("/user/login?created=1")),
        Err(SignUpError::UserExists) => Err(signup_error(
            &state.config.app_name,
            StatusCode::CONFLICT,
            "User already exists",
        )),
        Err(SignUpError::Storage(err)) => {
            tracing::warn!("failed to persist sign-up: {err}");
            Err(signup_error(
                &state.config.app_name,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error.",
            ))
        }
    }
}

pub(crate) async fn user_logout(State(state): State<state::AppState>) -> Response {
    logged_out_response(&state, Role::User, "/user/login")
}

pub(crate) async fn admin_login_form(
    State(state): State<state::AppState>,
) -> templates::AdminLoginTemplate {
    templates::AdminLoginTemplate {
        app_name: state.config.app_name,
        error: String::new(),
    }
}

pub(crate) async fn admin_login_submit(
    State(state): State<state::AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, templates::AdminLoginTemplate)> {
    let name = form.name.trim();
    let admin = &state.config.admin;
    if name != admin.name || !verify_password(&form.password, &admin.password_hash) {
        return Err((
            StatusCode::UNAUTHORIZED,
            templates::AdminLoginTemplate {
                app_name: state.config.app_name.clone(),
                error: "Invalid name or password.".to_string(),
            },
        ));
    }

    logged_in_response(&state, Role::Admin, &admin.name, "/admin").map_err(|err| {
        tracing::warn!("failed to issue admin session: {err}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            templates::AdminLoginTemplate {
                app_name: state.config.app_name.clone(),
                error: "Failed to sign in.".to_string(),
            },
        )
    })
}

pub(crate) async fn admin_logout(State(state): State<state::AppState>) -> Response {
    logged_out_response(&state, Role::Admin, "/admin/login")
}

fn logged_in_response(
    state: &state::AppState,
    role: Role,
    subject: &str,
    destination: &str,
) -> Result<Response, crate::session::SessionError> {
    let cookie = state.sessions.login_cookie(role, subject)?;
    let mut response = Redirect::to(destination).into_response();
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).expect("session cookie header"),
    );
    Ok(response)
}

fn logged_out_response(state: &state::AppState, role: Role, destination: &str) -> Response {
    let mut response = Redirect::to(destination).into_response();
    let cookie = state.sessions.clear_cookie(role);
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).expect("logout cookie header"),
    );
    response
}

fn user_login_error(app_name: &str) -> (StatusCode, templates::UserLoginTemplate) {
    (
        StatusCode::UNAUTHORIZED,
        templates::UserLoginTemplate {
            app_name: app_name.to_string(),
            signup: false,
            error: "Invalid name or password.".to_string(),
            notice: String::new(),
        },
    )
}

fn signup_error(
    app_name: &str,
    status: StatusCode,
    message: &str,
) -> (StatusCode, templates::UserLoginTemplate) {
    (
        status,
        templates::UserLoginTemplate {
            app_name: app_name.to_string(),
            signup: true,
            error: message.to_string(),
            notice: String::new(),
        },
    )
}

pub(crate) fn sanitize_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    if next.is_empty() {
        return None;
    }
    if !next.starts_with('/') || next.starts_with("//") || next.contains("://") {
        return None;
    }
    Some(next.to_string())
}
