use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    poll_watch::logging::init_logging();
    poll_watch::cli::run().await
}
