mod cli;

#[tokio::main]
async fn main() {
    complaintdesk::telemetry::init_tracing();

    match cli::run() {
        cli::RunOutcome::Serve { addr, config } => {
            tracing::info!("listening on http://{addr}");
            complaintdesk::serve(addr, config).await;
        }
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    }
}
