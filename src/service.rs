//! Validated CRUD operations over tracks, independent of the transport

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use thiserror::Error;

use crate::{
    domain::track::{Track, TrackId, TrackInput, TrackPatch, TrackValidationError},
    storage::{error::StorageError, operations::Storage},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(TrackValidationError),

    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TrackNotFound(id) => ServiceError::NotFound(id),
            StorageError::Validation(e) => ServiceError::Validation(e),
            other => ServiceError::StorageUnavailable(other),
        }
    }
}

impl From<TrackValidationError> for ServiceError {
    fn from(err: TrackValidationError) -> Self {
        ServiceError::Validation(err)
    }
}

/// Shares one storage connection between all callers
#[derive(Clone)]
pub struct TrackService {
    storage: Arc<Mutex<Storage>>,
}

impl TrackService {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    fn storage(&self) -> Result<MutexGuard<'_, Storage>, ServiceError> {
        self.storage.lock().map_err(|e| {
            ServiceError::StorageUnavailable(StorageError::Internal(anyhow!(
                "Could not access track storage under lock: {e}"
            )))
        })
    }

    pub fn list_tracks(&self) -> Result<Vec<Track>, ServiceError> {
        Ok(self.storage()?.find_all()?)
    }

    pub fn get_track(&self, track_id: TrackId) -> Result<Track, ServiceError> {
        self.storage()?
            .find_by_id(track_id)?
            .ok_or(ServiceError::NotFound(track_id))
    }

    /// Validates the input before touching storage, then stores it.
    pub fn create_track(&self, input: TrackInput) -> Result<Track, ServiceError> {
        let track = input.validate()?;
        Ok(self.storage()?.insert(&track)?)
    }

    /// Applies a partial update. A patch with no fields writes nothing.
    pub fn update_track(&self, track_id: TrackId, patch: TrackPatch) -> Result<Track, ServiceError> {
        if patch.is_empty() {
            return self.get_track(track_id);
        }
        Ok(self.storage()?.update(track_id, &patch)?)
    }

    /// returns the id of the removed track
    pub fn delete_track(&self, track_id: TrackId) -> Result<TrackId, ServiceError> {
        self.storage()?.delete(track_id)?;
        Ok(track_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::{schema, seed};

    fn setup_service() -> anyhow::Result<TrackService> {
        let conn = rusqlite::Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(TrackService::new(Storage::from_existing_conn(conn)))
    }

    fn input(title: &str) -> TrackInput {
        TrackInput {
            song_title: Some(title.to_string()),
            artist_name: Some("Alicia Rose".to_string()),
            album_name: Some("Morning Light".to_string()),
            genre: Some("Pop".to_string()),
            duration: Some(215),
            release_year: Some(2019),
        }
    }

    #[test]
    fn test_list_empty() -> anyhow::Result<()> {
        let service = setup_service()?;

        assert!(service.list_tracks()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_create_then_get_returns_same_track() -> anyhow::Result<()> {
        let service = setup_service()?;

        let created = service.create_track(input("Blue Skies"))?;

        assert_eq!(service.get_track(created.track_id)?, created);
        assert_eq!(created.song_title, "Blue Skies");
        Ok(())
    }

    #[test]
    fn test_created_ids_are_unique() -> anyhow::Result<()> {
        let service = setup_service()?;

        let ids = (0..5)
            .map(|i| service.create_track(input(&format!("song {i}"))))
            .map(|r| r.map(|t| t.track_id))
            .collect::<Result<HashSet<_>, _>>()?;

        assert_eq!(ids.len(), 5);
        Ok(())
    }

    #[test]
    fn test_create_reports_all_missing_fields() -> anyhow::Result<()> {
        let service = setup_service()?;
        let request = TrackInput {
            song_title: None,
            genre: Some(String::new()),
            ..input("unused")
        };

        let err = service.create_track(request).unwrap_err();

        match err {
            ServiceError::Validation(e) => assert_eq!(e.fields(), vec!["songTitle", "genre"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.list_tracks()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_update_changes_only_given_field() -> anyhow::Result<()> {
        let service = setup_service()?;
        let created = service.create_track(input("Blue Skies"))?;

        let patch: TrackPatch = serde_json::from_str(r#"{"duration": 300}"#)?;
        let updated = service.update_track(created.track_id, patch)?;

        assert_eq!(
            updated,
            Track {
                duration: Some(300),
                ..created.clone()
            }
        );
        assert_eq!(service.get_track(created.track_id)?, updated);
        Ok(())
    }

    #[test]
    fn test_update_without_fields_returns_stored_track() -> anyhow::Result<()> {
        let service = setup_service()?;
        let created = service.create_track(input("Blue Skies"))?;

        let patch: TrackPatch = serde_json::from_str(r#"{"trackId": 42}"#)?;
        let unchanged = service.update_track(created.track_id, patch)?;

        assert_eq!(unchanged, created);
        assert_eq!(service.get_track(created.track_id)?, created);
        Ok(())
    }

    #[test]
    fn test_delete_then_get_is_not_found() -> anyhow::Result<()> {
        let service = setup_service()?;
        let created = service.create_track(input("Blue Skies"))?;

        assert_eq!(service.delete_track(created.track_id)?, created.track_id);

        assert!(matches!(
            service.get_track(created.track_id),
            Err(ServiceError::NotFound(id)) if id == created.track_id
        ));
        Ok(())
    }

    #[test]
    fn test_missing_id_is_not_found_everywhere() -> anyhow::Result<()> {
        let service = setup_service()?;

        assert!(matches!(
            service.get_track(404),
            Err(ServiceError::NotFound(404))
        ));
        assert!(matches!(
            service.update_track(404, TrackPatch::default()),
            Err(ServiceError::NotFound(404))
        ));
        assert!(matches!(
            service.delete_track(404),
            Err(ServiceError::NotFound(404))
        ));
        Ok(())
    }

    #[test]
    fn test_list_after_seed() -> anyhow::Result<()> {
        let conn = rusqlite::Connection::open_in_memory()?;
        schema::init(&conn)?;
        let mut storage = Storage::from_existing_conn(conn);
        seed::seed(&mut storage, false)?;
        let service = TrackService::new(storage);

        let tracks = service.list_tracks()?;

        assert_eq!(tracks.len(), 3);
        let titles = tracks
            .iter()
            .map(|t| t.song_title.as_str())
            .collect::<HashSet<_>>();
        assert_eq!(
            titles,
            HashSet::from(["Blue Skies", "Midnight Drive", "Ocean Whisper"])
        );
        let ids = tracks.iter().map(|t| t.track_id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), 3);
        Ok(())
    }

    #[test]
    fn test_storage_failure_is_unavailable() -> anyhow::Result<()> {
        let conn = rusqlite::Connection::open_in_memory()?;
        // no schema: every query fails
        let service = TrackService::new(Storage::from_existing_conn(conn));

        assert!(matches!(
            service.list_tracks(),
            Err(ServiceError::StorageUnavailable(_))
        ));
        Ok(())
    }
}
