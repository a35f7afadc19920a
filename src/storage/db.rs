use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

const IN_MEMORY: &str = ":memory:";

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Connection::open(path).map_err(|source| StorageError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Opens the configured database and makes sure the schema exists.
///
/// A file that exists but is not a usable database fails here, not on the first query.
pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let (db, location) = match config.file_path() {
        None => (open_in_memory()?, PathBuf::from(IN_MEMORY)),
        Some(path) => (open_from_file(&path)?, path),
    };
    schema::init(&db).map_err(|source| StorageError::Open {
        path: location.clone(),
        source,
    })?;
    log::debug!("database ready at {}", location.display());
    Ok(db)
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Database,
        storage::{db::open, error::StorageError, schema},
    };

    fn table_names(db: &rusqlite::Connection) -> Vec<String> {
        let mut stmt = db
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();

        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn open_in_memory_db_initializes_schema() {
        let db = open(&Database::in_memory()).unwrap();

        let tables = table_names(&db);

        for table in schema::tables::ALL_TABLES {
            assert!(tables.contains(&table.to_string()));
        }
    }

    #[test]
    fn open_file_db_creates_parent_dirs() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("music_library.db");

        let db = open(&Database::from_path(&path))?;

        assert!(path.exists());
        assert!(table_names(&db).contains(&schema::TRACKS.to_string()));
        Ok(())
    }

    #[test]
    fn open_corrupt_file_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("music_library.db");
        std::fs::write(&path, "this is not a sqlite database, just some text. ".repeat(10))?;

        let result = open(&Database::from_path(&path));

        assert!(matches!(result, Err(StorageError::Open { .. })));
        Ok(())
    }
}
