//! v002 -- Uniqueness invariants.
//!
//! One team membership and one rating per (user, project); one pending
//! invite per (project, invitee email).

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_documents_project
    ON documents(collection, CAST(json_extract(body, '$.projectId') AS TEXT));

CREATE UNIQUE INDEX IF NOT EXISTS idx_team_members_unique
    ON documents(
        CAST(json_extract(body, '$.userId') AS TEXT),
        CAST(json_extract(body, '$.projectId') AS TEXT)
    )
    WHERE collection = 'team-members';

CREATE UNIQUE INDEX IF NOT EXISTS idx_project_ratings_unique
    ON documents(
        CAST(json_extract(body, '$.userId') AS TEXT),
        CAST(json_extract(body, '$.projectId') AS TEXT)
    )
    WHERE collection = 'project-ratings';

CREATE UNIQUE INDEX IF NOT EXISTS idx_team_invites_pending_unique
    ON documents(
        CAST(json_extract(body, '$.projectId') AS TEXT),
        lower(json_extract(body, '$.inviteeEmail'))
    )
    WHERE collection = 'team-invites' AND json_extract(body, '$.status') = 'pending';
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
