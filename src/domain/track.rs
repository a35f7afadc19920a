use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Identifier assigned by the database when a track is created.
pub type TrackId = i64;

pub const SONG_TITLE: &str = "songTitle";
pub const ARTIST_NAME: &str = "artistName";
pub const ALBUM_NAME: &str = "albumName";
pub const GENRE: &str = "genre";
pub const DURATION: &str = "duration";

/// Represent a music track as it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub track_id: TrackId,
    pub song_title: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre: String,
    /// length in seconds
    pub duration: Option<i64>,
    pub release_year: Option<i64>,
}

/// A track that passed validation and has no id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub song_title: String,
    pub artist_name: String,
    pub album_name: String,
    pub genre: String,
    pub duration: Option<i64>,
    pub release_year: Option<i64>,
}

/// Body of a create request.
///
/// Every field is optional so that all missing ones can be reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    pub song_title: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub release_year: Option<i64>,
}

/// Body of an update request.
///
/// Outer `None` leaves the field as is, `Some(None)` is an explicit null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPatch {
    #[serde(default, deserialize_with = "explicit_null")]
    pub song_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub artist_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub album_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub duration: Option<Option<i64>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub release_year: Option<Option<i64>>,
}

fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("required fields cannot be null: {}", .0.join(", "))]
    NullFields(Vec<&'static str>),

    #[error("duration must be a non-negative number of seconds, got {0}")]
    NegativeDuration(i64),

    #[error("record {index} is invalid: {source}")]
    InBatch {
        index: usize,
        #[source]
        source: Box<TrackValidationError>,
    },
}

impl TrackValidationError {
    /// names of the fields that caused the error
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::MissingFields(fields) | Self::NullFields(fields) => fields.clone(),
            Self::NegativeDuration(_) => vec![DURATION],
            Self::InBatch { source, .. } => source.fields(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn check_duration(duration: Option<i64>) -> Result<(), TrackValidationError> {
    match duration {
        Some(secs) if secs < 0 => Err(TrackValidationError::NegativeDuration(secs)),
        _ => Ok(()),
    }
}

impl TrackInput {
    /// Checks required fields and turns the input into an insertable track.
    ///
    /// Reports every missing or empty required field, in declaration order.
    pub fn validate(self) -> Result<NewTrack, TrackValidationError> {
        let missing = [
            (SONG_TITLE, &self.song_title),
            (ARTIST_NAME, &self.artist_name),
            (ALBUM_NAME, &self.album_name),
            (GENRE, &self.genre),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(TrackValidationError::MissingFields(missing));
        }
        check_duration(self.duration)?;

        Ok(NewTrack {
            song_title: self.song_title.unwrap_or_default(),
            artist_name: self.artist_name.unwrap_or_default(),
            album_name: self.album_name.unwrap_or_default(),
            genre: self.genre.unwrap_or_default(),
            duration: self.duration,
            release_year: self.release_year,
        })
    }
}

impl NewTrack {
    pub fn validate(&self) -> Result<(), TrackValidationError> {
        let missing = [
            (SONG_TITLE, &self.song_title),
            (ARTIST_NAME, &self.artist_name),
            (ALBUM_NAME, &self.album_name),
            (GENRE, &self.genre),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(TrackValidationError::MissingFields(missing));
        }
        check_duration(self.duration)
    }
}

impl TrackPatch {
    /// Merges supplied fields onto `track`.
    ///
    /// Text fields are not checked for emptiness here, but the required ones
    /// cannot be set to null since the column does not allow it.
    pub fn apply(&self, track: &mut Track) -> Result<(), TrackValidationError> {
        let nulls = [
            (SONG_TITLE, &self.song_title),
            (ARTIST_NAME, &self.artist_name),
            (ALBUM_NAME, &self.album_name),
            (GENRE, &self.genre),
        ]
        .into_iter()
        .filter(|(_, value)| matches!(value, Some(None)))
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if !nulls.is_empty() {
            return Err(TrackValidationError::NullFields(nulls));
        }

        if let Some(Some(title)) = &self.song_title {
            track.song_title = title.clone();
        }
        if let Some(Some(artist)) = &self.artist_name {
            track.artist_name = artist.clone();
        }
        if let Some(Some(album)) = &self.album_name {
            track.album_name = album.clone();
        }
        if let Some(Some(genre)) = &self.genre {
            track.genre = genre.clone();
        }
        if let Some(duration) = self.duration {
            track.duration = duration;
        }
        if let Some(year) = self.release_year {
            track.release_year = year;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.song_title.is_none()
            && self.artist_name.is_none()
            && self.album_name.is_none()
            && self.genre.is_none()
            && self.duration.is_none()
            && self.release_year.is_none()
    }
}
