use rusqlite::Connection;

pub mod tables {
    pub const TRACKS: &str = "tracks";

    #[cfg(test)]
    pub const ALL_TABLES: &[&str] = &[TRACKS];
}

pub mod columns {
    pub const TRACK_ID: &str = "track_id";
    pub const SONG_TITLE: &str = "song_title";
    pub const ARTIST_NAME: &str = "artist_name";
    pub const ALBUM_NAME: &str = "album_name";
    pub const GENRE: &str = "genre";
    pub const DURATION: &str = "duration";
    pub const RELEASE_YEAR: &str = "release_year";
}

pub use columns::*;
pub use tables::*;

// AUTOINCREMENT keeps ids of deleted tracks from being handed out again
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tracks (
    track_id INTEGER PRIMARY KEY AUTOINCREMENT,
    song_title TEXT NOT NULL,
    artist_name TEXT NOT NULL,
    album_name TEXT NOT NULL,
    genre TEXT NOT NULL,
    duration INTEGER,
    release_year INTEGER
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
