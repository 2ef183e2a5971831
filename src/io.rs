//! Parameter snapshot serialization
//!
//! JSON snapshots of the transfer network's parameter vectors, in parameter
//! order. The format carries no stability promise; it exists so a run's
//! trained state survives the process.

use crate::model::Param;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ParamState {
    values: Vec<Vec<f32>>,
}

/// Save parameter data (gradients are not persisted).
pub fn save_params(params: &[Param], path: impl AsRef<Path>) -> Result<()> {
    let state = ParamState {
        values: params.iter().map(|p| p.data().to_vec()).collect(),
    };
    let file = File::create(path.as_ref())?;
    serde_json::to_writer(BufWriter::new(file), &state)
        .map_err(|e| Error::Serialization(format!("JSON write failed: {e}")))
}

/// Load parameters saved by [`save_params`].
pub fn load_params(path: impl AsRef<Path>) -> Result<Vec<Param>> {
    let file = File::open(path.as_ref())?;
    let state: ParamState = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::Serialization(format!("JSON read failed: {e}")))?;
    Ok(state.values.into_iter().map(Param::from_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_parameter_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");

        let params = vec![Param::from_vec(vec![0.5, -1.5]), Param::ones(4)];
        save_params(&params, &path).unwrap();

        let loaded = load_params(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].data().to_vec(), vec![0.5, -1.5]);
        assert_eq!(loaded[1].data().to_vec(), vec![1.0; 4]);
        assert!(loaded[0].grad().is_none());
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_params(&path), Err(Error::Serialization(_))));
    }
}
