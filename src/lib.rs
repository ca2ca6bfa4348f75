use std::net::SocketAddr;

pub mod adapters;
mod app;
mod assets;
pub mod config;
pub mod ports;
pub mod records;
pub mod repositories;
pub mod session;
mod state;
pub mod stats;
pub mod store;
pub mod telemetry;
mod templates;

pub use app::app;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app(config)).await.expect("server error");
}
