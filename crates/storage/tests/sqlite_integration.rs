use storage::repository::KeyValueStore;
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_values_survive_reconnect() {
    let url = "sqlite:file:memdb_kv_reconnect?mode=memory&cache=shared";
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("moduleProgress").await.unwrap(), None);
    repo.set("moduleProgress", r#"{"Vida":{"totalQuestions":3,"history":[67]}}"#)
        .await
        .unwrap();

    // Second pool on the same shared in-memory database while the first is alive.
    let again = SqliteRepository::connect(url).await.expect("reconnect");
    again.migrate().await.expect("migrate is idempotent");
    let stored = again.get("moduleProgress").await.unwrap();
    assert_eq!(
        stored.as_deref(),
        Some(r#"{"Vida":{"totalQuestions":3,"history":[67]}}"#)
    );
}

#[tokio::test]
async fn sqlite_set_overwrites_existing_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set("moduleProgress", "{}").await.unwrap();
    repo.set("moduleProgress", r#"{"Autos":{}}"#).await.unwrap();
    repo.set("other", "x").await.unwrap();

    assert_eq!(
        repo.get("moduleProgress").await.unwrap().as_deref(),
        Some(r#"{"Autos":{}}"#)
    );
    assert_eq!(repo.get("other").await.unwrap().as_deref(), Some("x"));
}
