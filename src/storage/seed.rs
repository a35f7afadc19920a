//! Sample data for populating an empty library

use crate::{
    domain::track::{NewTrack, Track},
    storage::{error::StorageError, operations::Storage},
};

#[derive(Debug)]
pub enum SeedOutcome {
    Inserted(Vec<Track>),
    /// store already had this many tracks
    Skipped(usize),
}

fn sample(
    title: &str,
    artist: &str,
    album: &str,
    genre: &str,
    duration: i64,
    year: i64,
) -> NewTrack {
    NewTrack {
        song_title: title.to_string(),
        artist_name: artist.to_string(),
        album_name: album.to_string(),
        genre: genre.to_string(),
        duration: Some(duration),
        release_year: Some(year),
    }
}

pub fn sample_tracks() -> Vec<NewTrack> {
    vec![
        sample("Blue Skies", "Alicia Rose", "Morning Light", "Pop", 215, 2019),
        sample("Midnight Drive", "The Highwaymen", "Open Road", "Rock", 248, 2017),
        sample("Ocean Whisper", "Luna Sea", "Tides", "Ambient", 190, 2021),
    ]
}

/// Inserts the sample batch.
///
/// Does nothing when the store already holds tracks, unless `force` is set.
pub fn seed(storage: &mut Storage, force: bool) -> Result<SeedOutcome, StorageError> {
    storage.ensure_schema()?;

    let existing = storage.count()?;
    if existing > 0 && !force {
        log::info!("library already has {existing} tracks, skipping seed");
        return Ok(SeedOutcome::Skipped(existing));
    }

    let created = storage.insert_many(&sample_tracks())?;
    log::info!("seeded {} sample tracks", created.len());
    Ok(SeedOutcome::Inserted(created))
}
