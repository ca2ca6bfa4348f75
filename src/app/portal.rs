use crate::state;
use crate::templates;

use axum::extract::State;

pub(crate) async fn landing(State(state): State<state::AppState>) -> templates::LandingTemplate {
    templates::LandingTemplate {
        app_name: state.config.app_name,
    }
}
