//! Read-only access to the class-section database

use anyhow::{Context, Result, ensure};
use rusqlite::{Connection, OpenFlags, params_from_iter};

/// Registrar term this tool is pinned to
pub const TERM: i64 = 201808;

/// Departments with known-bad rows in the source database
pub const EXCLUDED_DEPARTMENTS: [&str; 2] = ["ELCT", "EDCE"];

/// One row of the joined section query. Plain value type, never written
/// back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub start_date: String,
    pub start_time: String,
    pub end_time: String,
    pub end_date: String,
    pub days: String,
    pub location: String,
    pub title: String,
    pub department: String,
    pub code: String,
}

fn section_sql(id_count: usize) -> String {
    let placeholders = vec!["?"; id_count].join(", ");
    format!(
        "SELECT startDate, startTime, endTime, endDate, days, location, \
                title, class.department, section.code \
         FROM section \
         INNER JOIN term ON section.term = term.id \
         INNER JOIN class ON class.department = section.department \
                         AND class.code = section.code \
         WHERE section.uid IN ({placeholders}) \
           AND semester = {TERM} \
           AND class.department NOT IN ('{}', '{}')",
        EXCLUDED_DEPARTMENTS[0], EXCLUDED_DEPARTMENTS[1],
    )
}

/// Substitute the ids into the placeholders, for display only
fn render_sql(sql: &str, ids: &[i64]) -> String {
    let mut rendered = sql.to_string();
    for id in ids {
        rendered = rendered.replacen('?', &id.to_string(), 1);
    }
    rendered
}

/// Fetch the sections matching `ids` for the pinned term. The connection
/// is scoped to this call and closed when it returns.
pub fn query_sections(db_path: &str, ids: &[i64]) -> Result<Vec<SectionRecord>> {
    ensure!(!ids.is_empty(), "At least one section id is required");

    let sql = section_sql(ids.len());
    println!("{}", render_sql(&sql, ids));

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open section database at {}", db_path))?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            Ok(SectionRecord {
                start_date: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                end_date: row.get(3)?,
                days: row.get(4)?,
                location: row.get(5)?,
                title: row.get(6)?,
                department: row.get(7)?,
                code: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
