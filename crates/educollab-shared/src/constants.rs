/// Application name
pub const APP_NAME: &str = "EduCollab";

/// Default base URL of the REST resource backend
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Default HTTP port of the resource server
pub const DEFAULT_HTTP_PORT: u16 = 3001;

/// File holding the persisted session inside the data directory
pub const SESSION_FILE: &str = "session.json";

/// Default SQLite database file name
pub const DATABASE_FILE: &str = "educollab.db";

/// Team size offered by the project creation form
pub const DEFAULT_MAX_TEAM_SIZE: u32 = 5;

/// Inclusive rating bounds
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Star glyphs used to render an average rating
pub const STAR_FILLED: char = '★';
pub const STAR_EMPTY: char = '☆';
