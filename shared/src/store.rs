use crate::model::FlightHistory;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const HISTORY_FILE: &str = "flight_history.json";
pub const QUAKES_FILE: &str = "earthquake_data.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),
    #[error("artifact serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed artifact store read by the rendering collaborator. Each save
/// is a full overwrite of the current artifact; there is no merge and no
/// versioning.
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn save_history(&self, history: &FlightHistory) -> Result<(), StoreError> {
        self.write_artifact(HISTORY_FILE, history)
    }

    pub fn save_quake_features(&self, features: &[Value]) -> Result<(), StoreError> {
        self.write_artifact(QUAKES_FILE, features)
    }

    pub fn load_history(&self) -> Result<FlightHistory, StoreError> {
        let bytes = fs::read(self.data_dir.join(HISTORY_FILE))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn load_quake_features(&self) -> Result<Vec<Value>, StoreError> {
        let bytes = fs::read(self.data_dir.join(QUAKES_FILE))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    // Serialize first, then write a sibling temp file and rename into place;
    // a failed save must leave the prior artifact readable.
    fn write_artifact<T: Serialize + ?Sized>(
        &self,
        name: &str,
        artifact: &T,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(artifact)?;
        let tmp = self.data_dir.join(format!("{name}.tmp"));
        fs::write(&tmp, body)?;
        fs::rename(&tmp, self.data_dir.join(name))?;
        Ok(())
    }
}
