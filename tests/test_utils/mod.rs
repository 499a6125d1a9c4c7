//! Shared helpers for integration tests

#![allow(dead_code)]

use rusqlite::Connection;
use tempfile::TempDir;

use coursecal::core::AppConfig;

/// A scratch section database with the registrar schema. Dropping it
/// removes the backing directory.
pub struct FixtureDb {
    pub dir: TempDir,
    pub path: String,
}

pub fn fixture_db() -> FixtureDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir
        .path()
        .join("classes.sql")
        .to_string_lossy()
        .into_owned();
    let conn = Connection::open(&path).expect("Failed to create fixture db");
    conn.execute_batch(
        "CREATE TABLE term (id INTEGER PRIMARY KEY, semester INTEGER);
         CREATE TABLE class (department TEXT, code TEXT);
         CREATE TABLE section (
             uid INTEGER PRIMARY KEY,
             term INTEGER,
             department TEXT,
             code TEXT,
             startDate TEXT,
             startTime TEXT,
             endTime TEXT,
             endDate TEXT,
             days TEXT,
             location TEXT,
             title TEXT
         );
         INSERT INTO term (id, semester) VALUES (1, 201808), (2, 201901);",
    )
    .expect("Failed to create fixture schema");
    FixtureDb { dir, path }
}

/// Insert a class and a section row using the fall 2018 sample times.
/// `term` 1 is the pinned semester, 2 is a different one.
pub fn insert_section(db: &FixtureDb, uid: i64, term: i64, department: &str, code: &str, days: &str) {
    let conn = Connection::open(&db.path).expect("Failed to open fixture db");
    conn.execute(
        "INSERT INTO class (department, code) VALUES (?1, ?2)",
        (department, code),
    )
    .expect("Failed to insert class row");
    conn.execute(
        "INSERT INTO section (uid, term, department, code, startDate, startTime, \
                              endTime, endDate, days, location, title)
         VALUES (?1, ?2, ?3, ?4, '2018-08-27', '09:00', '09:50', '2018-12-10', ?5, \
                 'Main Hall 101', 'Intro to Computing')",
        (uid, term, department, code, days),
    )
    .expect("Failed to insert section row");
}

pub fn test_config(db_path: &str) -> AppConfig {
    AppConfig {
        db_path: db_path.to_string(),
        token_path: "token.json".to_string(),
        credentials_path: "credentials.json".to_string(),
        calendar_id: "primary".to_string(),
    }
}
