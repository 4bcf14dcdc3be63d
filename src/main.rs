/*
 * Responsibility
 * - tokio runtime entry point
 * - app::run() の呼び出し（ロジックは置かない）
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    secure_api::app::run().await
}
