use std::{
    future::Future,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, warn};

use super::activity::Activity;

/// State reconstructed from durable storage on a cold start.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PersistedState {
    pub current: Option<Activity>,
    pub history: Vec<Activity>,
}

/// Interface for abstracting durable storage of the store state. There are
/// two logical keys: the current activity pointer and the bounded history
/// list.
pub trait StateStorage {
    /// Reconstructs the persisted state. Missing or corrupt data degrades to
    /// the empty state instead of failing the process.
    fn load(&self) -> impl Future<Output = Result<PersistedState>>;

    /// Durably persists both keys. This is called on every mutation, so the
    /// history handed in is already capped.
    fn save(
        &self,
        current: Option<&Activity>,
        history: &[Activity],
    ) -> impl Future<Output = Result<()>>;
}

const CURRENT_FILE: &str = "current.json";
const HISTORY_FILE: &str = "history.jsonl";

/// The main realization of [StateStorage]. The current activity pointer lives
/// in its own JSON file and is removed while no activity is set. History is
/// stored as one JSON record per line, most recent first.
pub struct FileStateStorage {
    state_dir: PathBuf,
}

impl FileStateStorage {
    pub fn new(state_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&state_dir)?;

        Ok(Self { state_dir })
    }

    async fn load_current(&self) -> Result<Option<Activity>> {
        let path = self.state_dir.join(CURRENT_FILE);
        debug!("Loading {path:?}");
        let mut file = match File::open(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let read = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        read?;

        match serde_json::from_str::<Activity>(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                // A corrupt pointer is treated as absence.
                warn!("Found illegal json string in {path:?} {raw}: {e}");
                Ok(None)
            }
        }
    }

    async fn load_history(&self) -> Result<Vec<Activity>> {
        let path = self.state_dir.join(HISTORY_FILE);
        debug!("Loading {path:?}");
        let file = match File::open(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let buffer = BufReader::new(file);
        let mut lines = buffer.lines();
        let mut history = vec![];
        while let Ok(Some(line)) = lines.next_line().await {
            match serde_json::from_str::<Activity>(&line) {
                Ok(v) => history.push(v),
                Err(e) => {
                    // ignore illegal values. Might happen after shutdowns
                    warn!(
                        "During parsing in path {:?} found illegal json string {}:  {e}",
                        path, &line
                    )
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        Ok(history)
    }

    async fn save_current(&self, current: Option<&Activity>) -> Result<()> {
        let path = self.state_dir.join(CURRENT_FILE);
        let Some(current) = current else {
            return match tokio::fs::remove_file(&path).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        };

        let buffer = serde_json::to_vec(current)?;
        Self::overwrite(&path, &buffer).await
    }

    async fn save_history(&self, history: &[Activity]) -> Result<()> {
        let path = self.state_dir.join(HISTORY_FILE);

        let mut buffer = Vec::<u8>::new();
        for activity in history {
            serde_json::to_writer(&mut buffer, activity)?;
            buffer.push(b'\n');
        }

        Self::overwrite(&path, &buffer).await
    }

    /// Replaces the file contents under an exclusive lock. The files are
    /// bounded by the history cap, so rewriting them whole keeps I/O flat.
    async fn overwrite(path: &std::path::Path, buffer: &[u8]) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;

        file.lock_exclusive()?;
        let result = Self::write_with_file(&mut file, buffer).await;
        file.unlock_async().await?;
        result
    }

    async fn write_with_file(file: &mut File, buffer: &[u8]) -> Result<()> {
        file.write_all(buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl StateStorage for FileStateStorage {
    async fn load(&self) -> Result<PersistedState> {
        Ok(PersistedState {
            current: self.load_current().await?,
            history: self.load_history().await?,
        })
    }

    async fn save(&self, current: Option<&Activity>, history: &[Activity]) -> Result<()> {
        self.save_current(current).await?;
        self.save_history(history).await?;
        Ok(())
    }
}
