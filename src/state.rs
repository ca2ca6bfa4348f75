use crate::adapters::TokioTimeProvider;
use crate::config::AppConfig;
use crate::repositories::{ComplaintsRepository, MessagesRepository, UsersRepository};
use crate::session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionKeys,
    pub users: UsersRepository,
    pub complaints: ComplaintsRepository,
    pub messages: MessagesRepository,
    pub time: TokioTimeProvider,
}
