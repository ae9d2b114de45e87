//! SQL DDL for initializing the contact table, per backend.

/// SQLite schema: rowid-backed autoincrementing primary key, NOT NULL
/// enforced on both attributes.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name VARCHAR(100) NOT NULL,
    address VARCHAR(500) NOT NULL
);
"#;

/// MySQL schema for the managed backend. BIGINT keeps ids decoding as i64
/// through the `Any` driver.
pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id BIGINT NOT NULL AUTO_INCREMENT,
    name VARCHAR(100) NOT NULL,
    address VARCHAR(500) NOT NULL,
    PRIMARY KEY (id)
);
"#;
