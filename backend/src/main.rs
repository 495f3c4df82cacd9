#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tempo_server::start_server().await
}
