#[tokio::main]
async fn main() -> anyhow::Result<()> {
    courier_rs::cli::run().await
}
