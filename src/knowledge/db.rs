//! Snippet storage and similarity lookup backed by sqlite-vec.

use anyhow::{Result, ensure};
use serde::Serialize;
use tokio_rusqlite::Connection;
use zerocopy::IntoBytes;

/// Dimensions of `text-embedding-3-small` vectors
pub const EMBEDDING_DIM: usize = 1536;

/// One ranked result from the similarity store
#[derive(Clone, Debug, Serialize)]
pub struct KnowledgeMatch {
    pub content: String,
    pub similarity: f32,
}

/// Store a snippet and its embedding, returning the new row id
pub async fn insert_snippet(db: &Connection, content: &str, embedding: Vec<f32>) -> Result<i64> {
    ensure!(
        embedding.len() == EMBEDDING_DIM,
        "Expected {} embedding dimensions, got {}",
        EMBEDDING_DIM,
        embedding.len()
    );
    let content = content.to_string();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO website_content (content) VALUES (?1)",
            [&content],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO vec_website_content (rowid, embedding) VALUES (?1, ?2)",
            rusqlite::params![id, embedding.as_bytes()],
        )?;
        tx.commit()?;
        Ok(id)
    })
    .await
    .map_err(|e| e.into())
}

/// Remove a snippet by id. Returns true when a row was deleted.
pub async fn delete_snippet(db: &Connection, id: i64) -> Result<bool> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM website_content WHERE id = ?1", [id])?;
        tx.execute("DELETE FROM vec_website_content WHERE rowid = ?1", [id])?;
        tx.commit()?;
        Ok(deleted > 0)
    })
    .await
    .map_err(|e| e.into())
}

/// KNN lookup against the vec0 table, ranked by the store and filtered by
/// `threshold`. Ranking and nearest-neighbor selection belong to
/// sqlite-vec; this function only converts distances to similarities.
pub async fn match_snippets(
    db: &Connection,
    query_embedding: &[f32],
    threshold: f32,
    count: usize,
) -> Result<Vec<KnowledgeMatch>> {
    let blob = query_embedding.as_bytes().to_vec();
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            r"
          SELECT
            w.content,
            knn.distance
          FROM (
            SELECT rowid, distance
            FROM vec_website_content
            WHERE embedding MATCH ?1
            ORDER BY distance
            LIMIT ?2
          ) AS knn
          JOIN website_content w ON w.id = knn.rowid
          ORDER BY knn.distance
        ",
        )?;
        let rows = stmt.query_map(rusqlite::params![blob, count as i64], |row| {
            let content: String = row.get(0)?;
            let distance: f64 = row.get(1)?;
            Ok((content, distance))
        })?;

        let mut matches = Vec::new();
        for row in rows {
            let (content, distance) = row?;
            // Embeddings are unit length, so L2 distance maps onto cosine
            // similarity: sim = 1 - d^2 / 2
            let similarity = (1.0 - (distance * distance) / 2.0) as f32;
            if similarity >= threshold {
                matches.push(KnowledgeMatch {
                    content,
                    similarity,
                });
            }
        }
        Ok(matches)
    })
    .await
    .map_err(|e| e.into())
}
