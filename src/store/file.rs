use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::execution::{UserBlockState, UserJourneyRun};

use super::{block_state_key, check_revision, run_key, JourneyStore, StoreError};

/// Stores every run and block state as its own JSON document:
///
/// ```text
/// <root>/runs/<run_id>.json
/// <root>/block_states/<run_id>/<block_id>.json
/// <root>/run_sequence
/// ```
///
/// Run documents carry a creation sequence drawn from `run_sequence`, so
/// runs created within the same second still list in creation order.
///
/// Writes go through a temp file and a rename. A process-wide lock serialises
/// the revision check with the write; it does not guard against other
/// processes sharing the directory.
pub struct FileJourneyStore {
    root: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileJourneyStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("runs")).map_err(storage)?;
        std::fs::create_dir_all(root.join("block_states")).map_err(storage)?;
        Ok(Self {
            root,
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn run_path(&self, run_id: &str) -> PathBuf {
        self.root
            .join("runs")
            .join(format!("{}.json", encode_name(run_id)))
    }

    fn sequence_path(&self) -> PathBuf {
        self.root.join("run_sequence")
    }

    /// Allocate the next creation sequence. Caller holds `write_lock`.
    async fn next_sequence(&self) -> Result<u64, StoreError> {
        let path = self.sequence_path();
        let last = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text.trim().parse::<u64>().map_err(|e| {
                StoreError::Corrupted(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(storage(e)),
        };
        let next = last + 1;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, next.to_string()).await.map_err(storage)?;
        tokio::fs::rename(&tmp, &path).await.map_err(storage)?;
        Ok(next)
    }

    fn block_dir(&self, run_id: &str) -> PathBuf {
        self.root.join("block_states").join(encode_name(run_id))
    }

    fn block_path(&self, run_id: &str, block_id: &str) -> PathBuf {
        self.block_dir(run_id)
            .join(format!("{}.json", encode_name(block_id)))
    }
}

#[async_trait]
impl JourneyStore for FileJourneyStore {
    async fn create_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.run_path(&run.id);
        if read_json::<StoredRun>(&path).await?.is_some() {
            return Err(StoreError::AlreadyExists(run_key(&run.id)));
        }
        let mut stored = StoredRun {
            sequence: self.next_sequence().await?,
            run: run.clone(),
        };
        stored.run.revision = 1;
        write_json(&path, &stored).await?;
        Ok(1)
    }

    async fn save_run(&self, run: &UserJourneyRun) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.run_path(&run.id);
        let current = read_json::<StoredRun>(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(run_key(&run.id)))?;
        let revision = check_revision(run_key(&run.id), run.revision, current.run.revision)?;
        let mut stored = StoredRun {
            sequence: current.sequence,
            run: run.clone(),
        };
        stored.run.revision = revision;
        write_json(&path, &stored).await?;
        Ok(revision)
    }

    async fn load_run(&self, run_id: &str) -> Result<Option<UserJourneyRun>, StoreError> {
        Ok(read_json::<StoredRun>(&self.run_path(run_id))
            .await?
            .map(|stored| stored.run))
    }

    /// Scans the run directory; ordered by creation sequence.
    async fn runs_for(
        &self,
        user_id: &str,
        journey_version_id: &str,
    ) -> Result<Vec<UserJourneyRun>, StoreError> {
        let mut runs: Vec<StoredRun> = read_dir_json::<StoredRun>(&self.root.join("runs"))
            .await?
            .into_iter()
            .filter(|stored| {
                stored.run.user_id == user_id && stored.run.journey_version_id == journey_version_id
            })
            .collect();
        // Documents written without a sequence fall back to timestamp order.
        runs.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.run.created_at.cmp(&b.run.created_at))
                .then_with(|| a.run.id.cmp(&b.run.id))
        });
        Ok(runs.into_iter().map(|stored| stored.run).collect())
    }

    async fn load_block_state(
        &self,
        run_id: &str,
        block_id: &str,
    ) -> Result<Option<UserBlockState>, StoreError> {
        read_json(&self.block_path(run_id, block_id)).await
    }

    async fn save_block_state(&self, state: &UserBlockState) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.block_path(&state.run_id, &state.block_id);
        let found = read_json::<UserBlockState>(&path)
            .await?
            .map(|s| s.revision)
            .unwrap_or(0);
        let revision = check_revision(
            block_state_key(&state.run_id, &state.block_id),
            state.revision,
            found,
        )?;
        tokio::fs::create_dir_all(self.block_dir(&state.run_id))
            .await
            .map_err(storage)?;
        let mut stored = state.clone();
        stored.revision = revision;
        write_json(&path, &stored).await?;
        Ok(revision)
    }

    async fn block_states(&self, run_id: &str) -> Result<Vec<UserBlockState>, StoreError> {
        let mut states: Vec<UserBlockState> = read_dir_json(&self.block_dir(run_id)).await?;
        states.sort_by(|a, b| a.block_id.cmp(&b.block_id));
        Ok(states)
    }
}

/// On-disk form of a run.
#[derive(Serialize, Deserialize)]
struct StoredRun {
    #[serde(default)]
    sequence: u64,
    #[serde(flatten)]
    run: UserJourneyRun,
}

fn storage(e: std::io::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

/// Percent-encode anything outside `[A-Za-z0-9_-]` so ids map to distinct,
/// safe file names.
fn encode_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage(e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))
}

async fn read_dir_json<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, StoreError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(storage(e)),
    };
    let mut out = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(storage)? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&path).await? {
            out.push(item);
        }
    }
    Ok(out)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await.map_err(storage)?;
    tokio::fs::rename(&tmp, path).await.map_err(storage)
}
