use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::AnyConnection;

use rolodex::RolodexError;
use rolodex::config::Config;
use rolodex::db::{Db, EngineChoice, contacts, get_engine};

fn temp_database(tag: &str) -> (PathBuf, String) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "rolodex-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    (path, url)
}

async fn test_db(tag: &str) -> (Db, PathBuf) {
    let (path, url) = temp_database(tag);
    let mut cfg = Config::default();
    cfg.database_url = url;
    let db = Db::connect(&cfg).expect("engine construction failed");
    contacts::init_schema(&db).await.expect("schema init failed");
    (db, path)
}

#[tokio::test]
async fn engine_without_managed_vars_is_local_sqlite() {
    let cfg = Config::default();
    let engine = get_engine(&cfg).expect("engine construction failed");
    assert!(engine.url().starts_with("sqlite"));
    assert_eq!(engine.choice(), EngineChoice::Local);
}

#[tokio::test]
async fn engine_with_all_managed_vars_is_managed_mysql() {
    let mut cfg = Config::default();
    cfg.instance_connection_name = Some("proj:region:instance".to_string());
    cfg.db_user = Some("app".to_string());
    cfg.db_pass = Some("p@ss:word/#".to_string());
    cfg.db_name = Some("contacts".to_string());

    let engine = get_engine(&cfg).expect("engine construction failed");
    assert_eq!(engine.choice(), EngineChoice::Managed);
    assert!(engine.url().starts_with("mysql"));
    assert!(engine.url().contains("cloudsql"));
}

#[tokio::test]
async fn engine_with_partial_managed_vars_is_local() {
    let mut cfg = Config::default();
    cfg.instance_connection_name = Some("proj:region:instance".to_string());
    cfg.db_user = Some("app".to_string());
    // db_pass and db_name missing

    let engine = get_engine(&cfg).expect("engine construction failed");
    assert_eq!(engine.choice(), EngineChoice::Local);
    assert!(engine.url().starts_with("sqlite"));
}

#[tokio::test]
async fn contact_round_trip() {
    let (db, path) = test_db("round-trip").await;

    let (id, fetched) = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move {
                let id =
                    contacts::insert(conn, "John Doe", "123 Main Street, New York, NY 10001")
                        .await?;
                let fetched = contacts::get_by_id(conn, id).await?;
                Ok((id, fetched))
            })
        })
        .await
        .expect("session failed");

    assert!(id > 0);
    let contact = fetched.expect("contact not found after insert");
    assert_eq!(contact.id, id);
    assert_eq!(contact.name, "John Doe");
    assert_eq!(contact.address, "123 Main Street, New York, NY 10001");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn delete_is_idempotent_for_missing_ids() {
    let (db, path) = test_db("delete-idempotent").await;

    let removed = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::delete_by_id(conn, 999).await })
        })
        .await
        .expect("session failed");
    assert!(!removed);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn failed_session_rolls_back_pending_writes() {
    let (db, path) = test_db("rollback").await;

    let result: Result<(), RolodexError> = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move {
                contacts::insert(conn, "Jane Smith", "456 Oak Avenue").await?;
                Err(RolodexError::Database(sqlx::Error::RowNotFound))
            })
        })
        .await;
    assert!(result.is_err());

    let count = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::count(conn).await })
        })
        .await
        .expect("count failed");
    assert_eq!(count, 0);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn committed_session_keeps_writes() {
    let (db, path) = test_db("commit").await;

    db.with_session(|conn: &mut AnyConnection| {
        Box::pin(async move {
            contacts::insert(conn, "Jane Smith", "456 Oak Avenue").await?;
            Ok(())
        })
    })
    .await
    .expect("session failed");

    let count = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::count(conn).await })
        })
        .await
        .expect("count failed");
    assert_eq!(count, 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn one_acquisition_failure_rebuilds_pool_once_and_succeeds() {
    let (db, path) = test_db("retry-once").await;

    // Poison the first attempt: a closed pool fails at begin.
    db.engine().pool.close().await;
    assert_eq!(db.rebuild_count(), 0);

    let count = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::count(conn).await })
        })
        .await
        .expect("retry did not recover");
    assert_eq!(count, 0);
    assert_eq!(db.rebuild_count(), 1);

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn exhausted_retries_surface_the_error() {
    // Unreachable storage: parent directory does not exist, so every
    // acquisition attempt fails, including after the rebuild.
    let mut cfg = Config::default();
    let mut path = std::env::temp_dir();
    path.push(format!("rolodex-missing-retry-{}", std::process::id()));
    path.push("retry.sqlite");
    cfg.database_url = format!("sqlite://{}?mode=rwc", path.display());
    cfg.acquire_timeout_secs = 1;

    let db = Db::connect(&cfg).expect("engine construction failed");
    let result = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::count(conn).await })
        })
        .await;

    assert!(matches!(result, Err(RolodexError::Database(_))));
    // the rebuild happened on the first failure only
    assert_eq!(db.rebuild_count(), 1);
}

#[tokio::test]
async fn seed_populates_empty_database_once() {
    let (db, path) = test_db("seed").await;

    contacts::seed(&db).await.expect("seed failed");
    contacts::seed(&db).await.expect("second seed failed");

    let all = db
        .with_session(|conn: &mut AnyConnection| {
            Box::pin(async move { contacts::list_all(conn).await })
        })
        .await
        .expect("list failed");
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|c| c.name == "John Doe"));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn close_is_idempotent() {
    let (db, path) = test_db("close").await;
    db.close().await;
    db.close().await;

    let _ = std::fs::remove_file(&path);
}
