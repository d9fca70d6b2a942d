//! Data models for the compiled inflection dataset.
//!
//! This module defines the structures the compiler emits and the decliner
//! consumes: inflection paradigms with their root-derivation rules and
//! ending tables, lemma entries, and the four-section dataset artifact.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a root string is derived from a lemma's citation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootRule {
    /// The `K` sentinel: the root is the citation form verbatim,
    /// comma-separated spelling variants included.
    Citation,
    /// Drop the last `deletion` characters of each spelling variant,
    /// then append `addition`.
    Derive { deletion: usize, addition: String },
}

/// Endings attached to one morphological tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesEntry {
    /// Root id the endings attach to; must exist in the paradigm's `roots`.
    pub root: String,
    /// Ending alternatives, in source order. The empty string denotes a
    /// bare-root form (a literal `-` in the source).
    pub endings: Vec<String>,
}

/// A named inflection paradigm.
///
/// `roots` and `suf` preserve the insertion order of the source file;
/// `des` iterates in ascending tag order, which is the order the form
/// generator enumerates tags in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Paradigm {
    /// Root-derivation rules, keyed by root id.
    #[serde(rename = "R")]
    pub roots: IndexMap<String, RootRule>,
    /// Ending table, keyed by morphological tag.
    pub des: BTreeMap<u32, DesEntry>,
    /// Tags suppressed from every result (typically slots inherited from a
    /// parent paradigm that this paradigm lacks).
    pub abs: BTreeSet<u32>,
    /// Constant suffixes: when non-empty, every generated form is replaced
    /// by the cross product with these alternates.
    pub sufd: Vec<String>,
    /// Alternative suffixes per tag: each alternate yields an extra variant
    /// alongside the base forms.
    pub suf: IndexMap<u32, Vec<String>>,
}

/// One lemma of the lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaEntry {
    /// Citation form (ASCII-folded), possibly a comma-separated list of
    /// spelling variants.
    pub lemma: String,
    /// Quantity annotation carried after `=` on the lemma token. Opaque to
    /// the engine.
    pub quantity: Option<String>,
    /// Name of the paradigm this lemma inflects on.
    pub model: String,
    /// Pre-computed strings for root id `"1"`, comma-separated. Overrides
    /// the paradigm's derivation rule for that root.
    pub geninf: Option<String>,
    /// Pre-computed strings for root id `"2"`, comma-separated.
    pub perf: Option<String>,
    /// Free-form trailing text, retained but never interpreted.
    pub lexicon: Option<String>,
}

/// Wrapper for the diacritic-preserving paradigm table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scansions {
    pub models: IndexMap<String, Paradigm>,
}

/// The self-contained compiled dataset: everything the decliner needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Human-readable tag names, 1-based. Opaque to the engine; used for
    /// display and to bound the tag space at compile time.
    #[serde(rename = "morph-name")]
    pub morph_names: BTreeMap<u32, String>,
    /// Paradigm table with original quantity diacritics, for display.
    pub scansions: Scansions,
    /// ASCII-folded paradigm table; the engine's default path.
    pub models: IndexMap<String, Paradigm>,
    /// Lemma table, keyed by ASCII-folded citation form.
    pub lemmas: IndexMap<String, LemmaEntry>,
}
