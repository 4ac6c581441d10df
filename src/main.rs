use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(e) = zchain_systest::app::run_cli().await {
        error!("{e:#}");
        eprintln!("systest: {e:#}");
        std::process::exit(1);
    }
}
