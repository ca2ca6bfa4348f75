use crate::adapters;
use crate::assets;
use crate::config;
use crate::repositories::{ComplaintsRepository, MessagesRepository, UsersRepository};
use crate::session;
use crate::state;
use crate::store;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;

mod admin;
mod api;
mod auth;
mod complaints;
mod portal;

pub fn app(config: config::AppConfig) -> Router {
    let sessions = session::SessionKeys::from_config(&config)
        .unwrap_or_else(|err| panic!("invalid session configuration: {err}"));
    let store = store::Store::open(&config.data_dir)
        .unwrap_or_else(|err| panic!("failed to open data directory: {err}"));
    let state = state::AppState {
        users: UsersRepository::new(store.clone()),
        complaints: ComplaintsRepository::new(store.clone()),
        messages: MessagesRepository::new(store),
        sessions,
        time: adapters::TokioTimeProvider,
        config,
    };
    Router::new()
        .route("/", get(portal::landing))
        .route("/user", get(complaints::user_dashboard))
        .route(
            "/user/login",
            get(auth::user_login_form).post(auth::user_login_submit),
        )
        .route(
            "/user/signup",
            get(auth::user_signup_form).post(auth::user_signup_submit),
        )
        .route("/user/logout", post(auth::user_logout))
        .route("/user/complaints/new", get(complaints::complaint_form))
        .route("/user/complaints", post(complaints::complaint_submit))
        .route(
            "/user/complaints/{id}/submitted",
            get(complaints::complaint_success),
        )
        .route("/user/messages", get(complaints::user_conversations))
        .route(
            "/user/messages/{id}",
            get(complaints::user_conversation).post(complaints::user_send_message),
        )
        .route("/admin", get(admin::dashboard))
        .route(
            "/admin/login",
            get(auth::admin_login_form).post(auth::admin_login_submit),
        )
        .route("/admin/logout", post(auth::admin_logout))
        .route("/admin/complaints/{id}/status", post(admin::update_status))
        .route("/admin/complaints/{id}/response", post(admin::respond))
        .route("/admin/messages", get(admin::conversations))
        .route(
            "/admin/messages/{id}",
            get(admin::conversation).post(admin::send_message),
        )
        .route("/api/complaints/{id}/messages", get(api::thread_messages))
        .route("/static/style.css", get(assets::stylesheet))
        .route(
            "/static/features/poll_messages.js",
            get(assets::poll_messages_script),
        )
        .route("/health", get(health))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
