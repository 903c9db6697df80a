use jix_blog::api::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::run_server().await
}
