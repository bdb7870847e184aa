use crate::fine_tune::error::FineTuneError;
use crate::model::artifact::{encode_compact, encode_native};
use crate::model::composite::{CompositeModel, InferenceModel};
use crate::types::metadata::ModelMetadata;
use crate::utils::stage_file;
use log::warn;
use std::path::{Path, PathBuf};

/// Destination paths for the three persisted forms of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBundle {
    pub native: PathBuf,
    pub metadata: PathBuf,
    pub compact: PathBuf,
}

impl ArtifactBundle {
    /// Writes the native, metadata and compact forms, all derived from `model`.
    ///
    /// Either all three files end up in place or none of them do: every form is encoded
    /// and staged next to its destination first, and files already moved into place are
    /// removed again if a later one fails.
    pub fn export(
        &self,
        model: &CompositeModel,
        metadata: &ModelMetadata,
    ) -> Result<(), FineTuneError> {
        let forms = [
            (&self.native, encode_native(model)?),
            (&self.metadata, metadata.to_json()?),
            (&self.compact, encode_compact(&InferenceModel::from(model))?),
        ];
        let mut staged = Vec::with_capacity(forms.len());
        for (path, bytes) in &forms {
            let temp_file = stage_file(path, bytes)
                .map_err(|e| FineTuneError::ArtifactWrite(path.to_path_buf(), e))?;
            staged.push((*path, temp_file));
        }

        let mut written: Vec<&Path> = Vec::with_capacity(staged.len());
        for (path, temp_file) in staged {
            if let Err(e) = temp_file.persist(path) {
                remove_written(&written);
                return Err(FineTuneError::ArtifactWrite(path.to_path_buf(), e.error));
            }
            written.push(path);
        }
        Ok(())
    }
}

fn remove_written(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove partial export {}: {}", path.display(), e);
        }
    }
}
