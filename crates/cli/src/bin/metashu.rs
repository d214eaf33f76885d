use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    metashu_cli::main_entry().await
}
