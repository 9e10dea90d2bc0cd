use anyhow::{Result, bail};

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};
use crate::knowledge::{generate_embedding, insert_snippet};

pub async fn run(path: String) -> Result<()> {
    let config = AppConfig::default();
    if config.openai_api_key.is_empty() {
        bail!("OPENAI_API_KEY is not configured");
    }

    let db = async_db(&config.knowledge_db_path).await?;
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await?;

    let text = std::fs::read_to_string(&path)?;
    let mut stored = 0;
    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let embedding = generate_embedding(
            &config.openai_api_hostname,
            &config.openai_api_key,
            &config.embedding_model,
            block,
        )
        .await?;
        let id = insert_snippet(&db, block, embedding).await?;
        println!("Stored snippet {}", id);
        stored += 1;
    }

    println!("Stored {} snippets from {}", stored, path);
    Ok(())
}
