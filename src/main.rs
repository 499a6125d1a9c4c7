use anyhow::Result;
use coursecal::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
