use ragserve::database::Database;
use ragserve::AppConfig;
use ragserve::Result;
use serde_json::json;

async fn setup_test_db() -> Result<(Database, AppConfig)> {
    let config = AppConfig::load()?;
    let db = Database::from_config(&config).await?;
    db.init_schema(&config).await?;
    Ok((db, config))
}

fn fake_embedding(dimension: usize, seed: f32) -> Vec<f32> {
    (0..dimension).map(|i| seed + i as f32 * 0.001).collect()
}

#[tokio::test]
#[ignore = "Requires a running Postgres with pgvector"]
async fn test_insert_and_search_documents() -> Result<()> {
    let (db, config) = setup_test_db().await?;
    let dimension = config.embedding_dimension();
    let collection = "integration_test";

    let before = db.count_documents(collection).await?;

    let id = db
        .insert_document(
            collection,
            "A tense thriller set in rural Korea.",
            &json!({"movie_id": "m-100", "rating": 9}),
            fake_embedding(dimension, 0.5),
        )
        .await?;

    let after = db.count_documents(collection).await?;
    assert_eq!(after, before + 1);

    let stored = db.get_document(id).await?.expect("document just inserted");
    assert_eq!(stored.collection, collection);
    assert_eq!(stored.metadata["rating"], 9);
    assert!(stored.created_at <= chrono::Utc::now());

    let matches = db
        .similarity_search(collection, fake_embedding(dimension, 0.5), 3)
        .await?;
    assert!(!matches.is_empty());
    assert!(matches[0].content.contains("thriller"));
    assert_eq!(matches[0].metadata["movie_id"], "m-100");

    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running Postgres with pgvector"]
async fn test_batch_insert_is_atomic() -> Result<()> {
    let (db, config) = setup_test_db().await?;
    let dimension = config.embedding_dimension();
    let collection = "integration_test_batch";

    let before = db.count_documents(collection).await?;

    // The second row's embedding has the wrong dimension, so the whole
    // batch must roll back.
    let result = db
        .insert_documents(
            collection,
            vec![
                ("good row".to_string(), json!({}), fake_embedding(dimension, 0.1)),
                ("bad row".to_string(), json!({}), fake_embedding(dimension / 2, 0.2)),
            ],
        )
        .await;
    assert!(result.is_err());

    let after = db.count_documents(collection).await?;
    assert_eq!(after, before);

    Ok(())
}

#[tokio::test]
#[ignore = "Requires a running server on localhost:8000"]
async fn test_health_endpoint() {
    let response = reqwest::get("http://localhost:8000/health").await.unwrap();
    assert!(response.status().is_success());

    let health: ragserve::api::types::HealthResponse = response.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(!health.store.collection.is_empty());
}

#[test]
fn test_wire_shapes_roundtrip() {
    // The loader and the API must agree on the batch request shape
    let request = ragserve::api::types::DocumentListRequest {
        documents: vec![ragserve::api::types::DocumentRequest {
            content: "review text".to_string(),
            metadata: Some(json!({"source": "reviews.json"})),
        }],
    };
    let encoded = serde_json::to_value(&request).unwrap();
    assert_eq!(encoded["documents"][0]["content"], "review text");

    let decoded: ragserve::api::types::DocumentListRequest =
        serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded.documents.len(), 1);
}
