//! v001 -- Document table.
//!
//! Every collection shares one table; a record is its JSON body keyed by
//! `(collection, id)`. `seq` preserves insertion order for unsorted lists.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,                 -- e.g. 'projects', 'team-members'
    id         TEXT NOT NULL,                 -- canonical string id
    body       TEXT NOT NULL,                 -- JSON object, includes "id"

    UNIQUE (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
