//! Dataset assembly and artifact management.
//!
//! This module turns the three linguistic source files into the single
//! compiled dataset the decliner loads at startup, validates the
//! cross-section invariants, and reads/writes the JSON artifact.

use crate::compile::{compile_lemmas, compile_models, compile_tag_names};
use crate::error::{FlexioError, Result};
use crate::models::{Dataset, Scansions};
use log::info;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Compiles the three sources into a validated dataset.
///
/// Two paradigm tables are produced from the same model source: one keeping
/// the original quantity diacritics (`scansions.models`), one ASCII-folded
/// (`models`, the engine's default path).
pub fn build_dataset(
    models_source: &str,
    lemmas_source: &str,
    tag_names_source: &str,
) -> Result<Dataset> {
    let morph_names = compile_tag_names(tag_names_source);
    let scansion_models = compile_models(models_source, false)?;
    let models = compile_models(models_source, true)?;
    let lemmas = compile_lemmas(lemmas_source)?;

    let dataset = Dataset {
        morph_names,
        scansions: Scansions {
            models: scansion_models,
        },
        models,
        lemmas,
    };
    validate(&dataset)?;
    info!(
        "Compiled dataset: {} tag names, {} paradigms, {} lemmas",
        dataset.morph_names.len(),
        dataset.models.len(),
        dataset.lemmas.len()
    );
    Ok(dataset)
}

/// Checks the invariants that span dataset sections: every ending table
/// references a defined root, every tag indexes into the tag-name list,
/// and every lemma's paradigm exists.
fn validate(dataset: &Dataset) -> Result<()> {
    let max_tag = dataset.morph_names.keys().next_back().copied().unwrap_or(0);
    let tag_known = |tag: u32| tag >= 1 && tag <= max_tag;

    for (name, paradigm) in &dataset.models {
        for (tag, entry) in &paradigm.des {
            if !paradigm.roots.contains_key(&entry.root) {
                return Err(FlexioError::InvalidDataset(format!(
                    "model `{name}` endings for tag {tag} reference undefined root `{}`",
                    entry.root
                )));
            }
            if !tag_known(*tag) {
                return Err(FlexioError::InvalidDataset(format!(
                    "model `{name}` endings tag {tag} has no morphological name"
                )));
            }
        }
        for tag in paradigm.abs.iter().chain(paradigm.suf.keys()) {
            if !tag_known(*tag) {
                return Err(FlexioError::InvalidDataset(format!(
                    "model `{name}` suffix or absence tag {tag} has no morphological name"
                )));
            }
        }
    }

    for (key, entry) in &dataset.lemmas {
        if !dataset.models.contains_key(&entry.model) {
            return Err(FlexioError::InvalidDataset(format!(
                "lemma `{key}` references unknown model `{}`",
                entry.model
            )));
        }
    }

    Ok(())
}

/// Writes the dataset artifact as a JSON document.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    info!("Wrote dataset artifact to {:?}", path);
    Ok(())
}

/// Loads a dataset artifact written by [`write_dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let reader = BufReader::new(File::open(path)?);
    let dataset = serde_json::from_reader(reader)?;
    info!("Loaded dataset artifact from {:?}", path);
    Ok(dataset)
}
