//! Persistence tests against a file-backed SQLite database

use application::ports::QueryRecordStore;
use domain::{CallerId, Confidence, NewQueryRecord, QueryRecord};
use infrastructure::config::DatabaseConfig;
use infrastructure::{AsyncDatabase, AsyncDatabaseConfig, SqliteQueryRecordStore};

async fn open(url: &str) -> AsyncDatabase {
    let config = AsyncDatabaseConfig::from_app_config(&DatabaseConfig {
        url: url.to_string(),
        max_connections: 2,
        run_migrations: true,
    })
    .unwrap();
    let db = AsyncDatabase::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    db
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("krishi.db").display());

    let record = QueryRecord::create(
        NewQueryRecord::new(
            CallerId::new("+91999").unwrap(),
            "what is the weather for paddy today",
            "ഇന്ന് നെല്ലിന് നേരിയ ജലസേചനം മതി.",
        )
        .with_sources(vec![
            "banana_leaf_spot".to_string(),
            "pesticide_rotation".to_string(),
        ])
        .with_confidence(Confidence::UNKNOWN),
    );

    {
        let db = open(&url).await;
        SqliteQueryRecordStore::new(db.pool().clone())
            .insert(&record)
            .await
            .unwrap();
        db.close().await;
    }

    let db = open(&url).await;
    let listed = SqliteQueryRecordStore::new(db.pool().clone())
        .list_newest_first(None)
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), record.id());
    assert_eq!(listed[0].answer(), record.answer());
    assert_eq!(listed[0].sources(), record.sources());
    db.close().await;
}

#[tokio::test]
async fn concurrent_inserts_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(dir.path().join("krishi.db").to_str().unwrap()).await;
    let store = SqliteQueryRecordStore::new(db.pool().clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let record = QueryRecord::create(NewQueryRecord::new(
                CallerId::api_user(),
                format!("question {i}"),
                "answer",
            ));
            store.insert(&record).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.list_newest_first(None).await.unwrap().len(), 8);
    assert_eq!(store.list_newest_first(Some(3)).await.unwrap().len(), 3);
    db.close().await;
}
