use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{
    config,
    domain::track::{NewTrack, Track, TrackId, TrackPatch, TrackValidationError},
    storage::{
        db,
        error::StorageError,
        schema::{self, *},
    },
};

use anyhow::anyhow;

/// Main structure that implements all storage logic
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

fn select_tracks() -> String {
    format!(
        "SELECT {TRACK_ID}, {SONG_TITLE}, {ARTIST_NAME}, {ALBUM_NAME}, {GENRE}, {DURATION}, {RELEASE_YEAR} FROM {TRACKS}"
    )
}

fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
    Ok(Track {
        track_id: row.get(0)?,
        song_title: row.get(1)?,
        artist_name: row.get(2)?,
        album_name: row.get(3)?,
        genre: row.get(4)?,
        duration: row.get(5)?,
        release_year: row.get(6)?,
    })
}

fn find_in(conn: &Connection, track_id: TrackId) -> rusqlite::Result<Option<Track>> {
    conn.query_row(
        &format!("{} WHERE {TRACK_ID} = ?1", select_tracks()),
        params![track_id],
        track_from_row,
    )
    .optional()
}

fn insert_into(conn: &Connection, track: &NewTrack) -> rusqlite::Result<Track> {
    conn.execute(
        &format!(
            "INSERT INTO {TRACKS} ({SONG_TITLE}, {ARTIST_NAME}, {ALBUM_NAME}, {GENRE}, {DURATION}, {RELEASE_YEAR})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ),
        params![
            track.song_title,
            track.artist_name,
            track.album_name,
            track.genre,
            track.duration,
            track.release_year
        ],
    )?;

    Ok(Track {
        track_id: conn.last_insert_rowid(),
        song_title: track.song_title.clone(),
        artist_name: track.artist_name.clone(),
        album_name: track.album_name.clone(),
        genre: track.genre.clone(),
        duration: track.duration,
        release_year: track.release_year,
    })
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// creates the tracks table if it is not there yet, existing rows are kept
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        schema::init(&self.db)?;
        Ok(())
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 =
            self.db
                .query_row(&format!("SELECT COUNT(*) FROM {TRACKS}"), [], |row| {
                    row.get(0)
                })?;

        usize::try_from(count).map_err(|e| {
            StorageError::Internal(anyhow!(
                "Strange conversion error to usize after select count: {e}"
            ))
        })
    }

    /// all tracks, oldest first
    pub fn find_all(&self) -> Result<Vec<Track>, StorageError> {
        let mut stmt = self
            .db
            .prepare(&format!("{} ORDER BY {TRACK_ID}", select_tracks()))?;

        let tracks = stmt
            .query_map([], track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    pub fn find_by_id(&self, track_id: TrackId) -> Result<Option<Track>, StorageError> {
        Ok(find_in(&self.db, track_id)?)
    }

    /// validates the track and stores it under a freshly assigned id
    pub fn insert(&mut self, track: &NewTrack) -> Result<Track, StorageError> {
        track.validate()?;
        let created = insert_into(&self.db, track)?;
        log::debug!("inserted track {}", created.track_id);
        Ok(created)
    }

    /// Inserts a batch of tracks.
    ///
    /// Every record is validated before anything is written, and the batch
    /// goes in a single transaction: either all tracks are stored or none.
    pub fn insert_many(&mut self, tracks: &[NewTrack]) -> Result<Vec<Track>, StorageError> {
        for (index, track) in tracks.iter().enumerate() {
            track
                .validate()
                .map_err(|e| TrackValidationError::InBatch {
                    index,
                    source: Box::new(e),
                })?;
        }

        let tx = self.db.transaction()?;

        let created = tracks
            .iter()
            .map(|track| insert_into(&tx, track))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit()?;
        log::debug!("inserted {} tracks", created.len());
        Ok(created)
    }

    /// Merges the patch onto the stored track and writes it back.
    ///
    /// Only explicit nulls on required fields are rejected; emptiness is not re-checked.
    pub fn update(&mut self, track_id: TrackId, patch: &TrackPatch) -> Result<Track, StorageError> {
        let tx = self.db.transaction()?;

        let mut track = find_in(&tx, track_id)?.ok_or(StorageError::TrackNotFound(track_id))?;
        patch.apply(&mut track)?;

        tx.execute(
            &format!(
                "UPDATE {TRACKS}
                 SET {SONG_TITLE} = ?1, {ARTIST_NAME} = ?2, {ALBUM_NAME} = ?3, {GENRE} = ?4,
                     {DURATION} = ?5, {RELEASE_YEAR} = ?6
                 WHERE {TRACK_ID} = ?7"
            ),
            params![
                track.song_title,
                track.artist_name,
                track.album_name,
                track.genre,
                track.duration,
                track.release_year,
                track_id
            ],
        )?;

        tx.commit()?;
        log::debug!("updated track {track_id}");
        Ok(track)
    }

    /// removes the track permanently
    pub fn delete(&mut self, track_id: TrackId) -> Result<(), StorageError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {TRACKS} WHERE {TRACK_ID} = ?1"),
            params![track_id],
        )?;

        if removed == 0 {
            return Err(StorageError::TrackNotFound(track_id));
        }
        log::debug!("deleted track {track_id}");
        Ok(())
    }
}
