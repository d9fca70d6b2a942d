//! Data-driven inflection engine for Latin.
//!
//! The engine is split into an offline compiler and a runtime decliner.
//! The compiler ([`data::build_dataset`]) parses three plain-text sources
//! (paradigm DSL, lemma table, tag-name list) into a single JSON artifact;
//! the [`Decliner`] loads that artifact and produces, for a queried lemma,
//! every inflected surface form keyed by morphological tag.

// Declare modules
pub mod compile;
pub mod data;
pub mod error;
pub mod models;
pub mod normalize;

// Re-export key types for easier use
pub use error::{FlexioError, Result};
pub use models::{Dataset, DesEntry, LemmaEntry, Paradigm, RootRule, Scansions};

use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;

/// The main inflection interface.
///
/// Holds the loaded dataset, which is immutable after construction; every
/// query is a pure function over it, so a shared reference can serve any
/// number of concurrent callers.
#[derive(Debug, Clone)]
pub struct Decliner {
    dataset: Dataset,
}

impl Decliner {
    /// Wraps an already-built dataset.
    pub fn new(dataset: Dataset) -> Self {
        Decliner { dataset }
    }

    /// Loads a compiled artifact from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Decliner::new(data::load_dataset(path)?))
    }

    /// Compiles the three sources directly, skipping the on-disk artifact.
    pub fn from_sources(
        models_source: &str,
        lemmas_source: &str,
        tag_names_source: &str,
    ) -> Result<Self> {
        Ok(Decliner::new(data::build_dataset(
            models_source,
            lemmas_source,
            tag_names_source,
        )?))
    }

    /// The loaded dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Human-readable name of a morphological tag, if the dataset has one.
    pub fn tag_name(&self, tag: u32) -> Option<&str> {
        self.dataset.morph_names.get(&tag).map(String::as_str)
    }

    fn lemma_entry(&self, lemma: &str) -> Result<&LemmaEntry> {
        self.dataset
            .lemmas
            .get(lemma)
            .ok_or_else(|| FlexioError::UnknownLemma(lemma.to_string()))
    }

    fn paradigm_for(&self, entry: &LemmaEntry) -> Result<&Paradigm> {
        self.dataset.models.get(&entry.model).ok_or_else(|| {
            FlexioError::Internal(format!("model `{}` missing from dataset", entry.model))
        })
    }

    /// Resolves the roots of a lemma: the mapping from root id to the list
    /// of root strings all forms are built on.
    ///
    /// Roots are derived from the paradigm's rules in their declaration
    /// order, then pre-computed `geninf`/`perf` strings overlay the derived
    /// entries for root ids `"1"` and `"2"`. With `paradigm` given, the
    /// lemma's own paradigm is bypassed.
    pub fn roots(
        &self,
        lemma: &str,
        paradigm: Option<&Paradigm>,
    ) -> Result<IndexMap<String, Vec<String>>> {
        debug!("roots: lemma='{lemma}'");
        let entry = self.lemma_entry(lemma)?;
        let paradigm = match paradigm {
            Some(paradigm) => paradigm,
            None => self.paradigm_for(entry)?,
        };
        Ok(resolve_roots(entry, paradigm))
    }

    /// Produces every inflected form of a lemma, keyed by morphological
    /// tag, in the paradigm's tag order.
    pub fn decline(&self, lemma: &str) -> Result<BTreeMap<u32, Vec<String>>> {
        debug!("decline: lemma='{lemma}'");
        let entry = self.lemma_entry(lemma)?;
        let paradigm = self.paradigm_for(entry)?;
        let roots = resolve_roots(entry, paradigm);

        // Cross product: tag, then root variant, then ending alternative.
        let mut forms: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for (tag, des) in &paradigm.des {
            let root_strings = roots.get(&des.root).ok_or_else(|| {
                FlexioError::Internal(format!(
                    "endings for tag {tag} reference unresolved root `{}`",
                    des.root
                ))
            })?;
            let slot = forms.entry(*tag).or_default();
            for root in root_strings {
                for ending in &des.endings {
                    slot.push(format!("{root}{ending}"));
                }
            }
        }

        // Constant suffixes replace every form with the cross product;
        // keeping the suffix loop outermost groups identical alternates.
        if !paradigm.sufd.is_empty() {
            for slot in forms.values_mut() {
                let mut expanded = Vec::with_capacity(slot.len() * paradigm.sufd.len());
                for suffix in &paradigm.sufd {
                    for form in slot.iter() {
                        expanded.push(format!("{form}{suffix}"));
                    }
                }
                *slot = expanded;
            }
        }

        // Alternative suffixes add variants next to the base forms, all
        // computed from a snapshot so earlier additions don't feed later
        // ones.
        if !paradigm.suf.is_empty() {
            let base = forms.clone();
            for (tag, alternates) in &paradigm.suf {
                let Some(base_forms) = base.get(tag) else {
                    continue;
                };
                let slot = forms.entry(*tag).or_default();
                for suffix in alternates {
                    for form in base_forms {
                        slot.push(format!("{form}{suffix}"));
                    }
                }
            }
        }

        // Absent slots disappear entirely, populated or not.
        for tag in &paradigm.abs {
            forms.remove(tag);
        }

        Ok(forms)
    }

    /// Like [`Decliner::decline`], but flattens the per-tag lists into one
    /// sequence in ascending tag order.
    pub fn decline_flat(&self, lemma: &str) -> Result<Vec<String>> {
        Ok(self.decline(lemma)?.into_values().flatten().collect())
    }
}

/// Derivation-rule application over the citation form, then pre-computed
/// root overlay.
fn resolve_roots(entry: &LemmaEntry, paradigm: &Paradigm) -> IndexMap<String, Vec<String>> {
    let mut precomputed: IndexMap<String, Vec<String>> = IndexMap::new();
    if let Some(geninf) = &entry.geninf {
        precomputed.insert("1".to_string(), split_variants(geninf));
    }
    if let Some(perf) = &entry.perf {
        precomputed.insert("2".to_string(), split_variants(perf));
    }

    let mut roots: IndexMap<String, Vec<String>> = IndexMap::new();
    for (root_id, rule) in &paradigm.roots {
        match rule {
            // The citation form verbatim, NOT split on commas.
            RootRule::Citation => {
                roots.insert(root_id.clone(), vec![entry.lemma.clone()]);
            }
            RootRule::Derive { deletion, addition } => {
                let sources = if root_id != "1" && roots.contains_key(root_id) {
                    roots[root_id].clone()
                } else {
                    split_variants(&entry.lemma)
                };
                let derived = sources
                    .iter()
                    .map(|source| format!("{}{addition}", strip_last_chars(source, *deletion)))
                    .collect();
                roots.insert(root_id.clone(), derived);
            }
        }
    }

    // Pre-computed roots win over derived ones.
    for (root_id, strings) in precomputed {
        roots.insert(root_id, strings);
    }
    roots
}

fn split_variants(field: &str) -> Vec<String> {
    field.split(',').map(str::to_string).collect()
}

/// Drops the last `count` characters (not bytes), saturating at the empty
/// string.
fn strip_last_chars(text: &str, count: usize) -> &str {
    if count == 0 {
        return text;
    }
    match text.char_indices().rev().nth(count - 1) {
        Some((index, _)) => &text[..index],
        None => "",
    }
}
