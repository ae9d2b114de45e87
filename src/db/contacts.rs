//! Contact store operations.
//!
//! Row-level operations take `&mut AnyConnection` so they compose inside a
//! session opened by `Db::with_session`; schema and seeding helpers manage
//! their own scope.

use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Row};
use tracing::info;

use crate::db::engine::{Backend, Db};
use crate::db::models::Contact;
use crate::db::schema::{MYSQL_INIT, SQLITE_INIT};
use crate::error::RolodexError;

pub async fn list_all(conn: &mut AnyConnection) -> Result<Vec<Contact>, RolodexError> {
    let rows = sqlx::query("SELECT id, name, address FROM contacts")
        .fetch_all(&mut *conn)
        .await?;
    rows.into_iter().map(row_to_contact).collect()
}

pub async fn get_by_id(conn: &mut AnyConnection, id: i64) -> Result<Option<Contact>, RolodexError> {
    let row = sqlx::query("SELECT id, name, address FROM contacts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(row_to_contact).transpose()
}

/// Insert a contact and return the storage-assigned id.
pub async fn insert(
    conn: &mut AnyConnection,
    name: &str,
    address: &str,
) -> Result<i64, RolodexError> {
    let result = sqlx::query("INSERT INTO contacts (name, address) VALUES (?, ?)")
        .bind(name)
        .bind(address)
        .execute(&mut *conn)
        .await?;
    result
        .last_insert_id()
        .ok_or_else(|| RolodexError::Database(sqlx::Error::Protocol(
            "driver reported no insert id".to_string(),
        )))
}

/// Delete by id. Returns whether a row was removed; deleting a nonexistent
/// id is a no-op, not an error.
pub async fn delete_by_id(conn: &mut AnyConnection, id: i64) -> Result<bool, RolodexError> {
    let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(conn: &mut AnyConnection) -> Result<i64, RolodexError> {
    let row = sqlx::query("SELECT COUNT(*) FROM contacts")
        .fetch_one(&mut *conn)
        .await?;
    Ok(row.try_get(0)?)
}

fn row_to_contact(row: AnyRow) -> Result<Contact, RolodexError> {
    Ok(Contact {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
    })
}

/// Initialize the schema by executing the backend-appropriate DDL.
pub async fn init_schema(db: &Db) -> Result<(), RolodexError> {
    let engine = db.engine();
    let ddl = match engine.backend() {
        Backend::Sqlite => SQLITE_INIT,
        Backend::MySql => MYSQL_INIT,
    };
    // execute statement by statement; sqlx::query takes a single command
    for stmt in ddl.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(&engine.pool).await?;
    }
    Ok(())
}

const SAMPLE_CONTACTS: [(&str, &str); 3] = [
    ("John Doe", "123 Main Street, New York, NY 10001"),
    ("Jane Smith", "456 Oak Avenue, Los Angeles, CA 90210"),
    ("Mike Johnson", "789 Pine Road, Chicago, IL 60601"),
];

/// Add sample contacts iff the table is empty.
pub async fn seed(db: &Db) -> Result<(), RolodexError> {
    db.with_session(|conn: &mut AnyConnection| {
        Box::pin(async move {
            let existing = count(conn).await?;
            if existing > 0 {
                info!(existing, "database already seeded");
                return Ok(());
            }
            for (name, address) in SAMPLE_CONTACTS {
                insert(conn, name, address).await?;
            }
            info!(count = SAMPLE_CONTACTS.len(), "sample contacts added");
            Ok(())
        })
    })
    .await
}
