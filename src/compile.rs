//! Compilers for the plain-text linguistic source files.
//!
//! Three line-oriented formats are compiled here, offline:
//!
//! - `modeles.la` — the paradigm DSL: macro declarations (`$VAR=…`),
//!   paradigm blocks (`modele:`), inheritance (`pere:`), root-derivation
//!   rules (`R:`), ending tables over tag ranges (`des:` / `des+:`),
//!   suppressed tags (`abs:`), alternative suffixes (`suf:`) and constant
//!   suffixes (`sufd:`).
//! - `lemmes.la` — one lemma per line, five pipe-separated fields.
//! - `morphos.la` — one tag name per line, the 1-based line number being
//!   the tag integer.
//!
//! Blank lines and lines starting with `!` are comments. Malformed
//! directives abort the compilation with the offending line number;
//! unrecognised directives and unparseable lemma lines are logged and
//! skipped.

use crate::error::{FlexioError, Result};
use crate::models::{DesEntry, LemmaEntry, Paradigm, RootRule};
use crate::normalize::fold;
use indexmap::IndexMap;
use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// Macro substitution passes allowed before a line is rejected as
/// unterminated.
const MACRO_PASS_BOUND: usize = 16;

static ROOT_RULE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^R:(?P<root>\d+):(?P<remove>\w+)[,:]?(?P<add>\w+)?").unwrap());

static DES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^des\+?:(?P<range>[\d\-,]+):(?P<root>\d+):(?P<endings>[\w\-,;]+)$").unwrap()
});

static LEMMA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<lemma>\w+)(?P<quantity>=\w+)?\|(?P<model>\w+)?\|-*(?P<geninf>[\w,]+)?-*\|-*(?P<perf>[\w,]+)?-*\|(?P<lexicon>.*)$",
    )
    .unwrap()
});

/// Expands a comma-separated list of tags and inclusive `start-end`
/// intervals into the ordered list of tag integers.
fn parse_range(spec: &str, line: usize) -> Result<Vec<u32>> {
    let mut tags = Vec::new();
    for group in spec.split(',') {
        match group.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.trim().parse().map_err(|_| {
                    FlexioError::compile(line, format!("invalid tag range `{group}`"))
                })?;
                let end: u32 = end.trim().parse().map_err(|_| {
                    FlexioError::compile(line, format!("invalid tag range `{group}`"))
                })?;
                if end < start {
                    return Err(FlexioError::compile(
                        line,
                        format!("descending tag range `{group}`"),
                    ));
                }
                tags.extend(start..=end);
            }
            None => tags.push(group.trim().parse().map_err(|_| {
                FlexioError::compile(line, format!("invalid tag `{group}`"))
            })?),
        }
    }
    Ok(tags)
}

/// Applies macro substitution to one `des` line until no `$` remains.
///
/// Each pass walks the declared macros in declaration order. A token of the
/// form `WORD+$VAR` becomes `WORDalt1;WORDalt2;…` over the macro's
/// semicolon-split alternates; any remaining `$VAR` is substituted by the
/// raw expansion. Lines still holding a `$` after the pass bound are
/// rejected.
fn expand_macros(line: &str, macros: &[(String, String)], line_no: usize) -> Result<String> {
    let mut expanded = line.to_string();
    let mut passes = 0;
    while expanded.contains('$') {
        if passes == MACRO_PASS_BOUND {
            return Err(FlexioError::compile(
                line_no,
                format!("unterminated macro expansion in `{expanded}`"),
            ));
        }
        for (name, alternates) in macros {
            let prefixed = Regex::new(&format!(r"(\w+)\+{}", regex::escape(name)))
                .map_err(|e| FlexioError::compile(line_no, e.to_string()))?;
            expanded = prefixed
                .replace_all(&expanded, |caps: &Captures| {
                    let stem = &caps[1];
                    alternates
                        .split(';')
                        .map(|alt| format!("{stem}{alt}"))
                        .collect::<Vec<_>>()
                        .join(";")
                })
                .into_owned();
            expanded = expanded.replace(name.as_str(), alternates);
            if !expanded.contains('$') {
                break;
            }
        }
        passes += 1;
    }
    Ok(expanded)
}

fn parse_root_rule(line: &str, line_no: usize) -> Result<(String, RootRule)> {
    let caps = ROOT_RULE_RE.captures(line).ok_or_else(|| {
        FlexioError::compile(line_no, format!("unparseable root rule `{line}`"))
    })?;
    let root = caps["root"].to_string();
    let rule = match &caps["remove"] {
        "K" => RootRule::Citation,
        remove => RootRule::Derive {
            deletion: remove.parse().map_err(|_| {
                FlexioError::compile(line_no, format!("invalid deletion count `{remove}`"))
            })?,
            // A literal `0` addition means the empty string.
            addition: match caps.name("add").map(|m| m.as_str()) {
                None | Some("0") => String::new(),
                Some(add) => add.to_string(),
            },
        },
    };
    Ok((root, rule))
}

/// Compiles the paradigm DSL into a table of paradigms, in source order.
///
/// With `folded` set, the whole source is ASCII-folded first, producing the
/// table the engine queries; without it, quantity diacritics are preserved
/// for display.
pub fn compile_models(source: &str, folded: bool) -> Result<IndexMap<String, Paradigm>> {
    let source = if folded { fold(source) } else { source.to_string() };

    let mut paradigms: IndexMap<String, Paradigm> = IndexMap::new();
    let mut macros: Vec<(String, String)> = Vec::new();
    let mut current: Option<String> = None;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }

        if line.starts_with('$') {
            let (name, alternates) = line.split_once('=').ok_or_else(|| {
                FlexioError::compile(line_no, format!("malformed macro declaration `{line}`"))
            })?;
            macros.push((name.to_string(), alternates.to_string()));
            continue;
        }

        if let Some(name) = line.strip_prefix("modele:") {
            paradigms.insert(name.to_string(), Paradigm::default());
            current = Some(name.to_string());
            continue;
        }

        let model = current.clone().ok_or_else(|| {
            FlexioError::compile(line_no, format!("directive `{line}` outside a modele: block"))
        })?;

        if let Some(parent) = line.strip_prefix("pere:") {
            // Clone is the deep copy: later overrides on the child must not
            // reach the parent.
            let inherited = paradigms.get(parent).cloned().ok_or_else(|| {
                FlexioError::compile(line_no, format!("unknown parent model `{parent}`"))
            })?;
            paradigms.insert(model, inherited);
            continue;
        }

        let paradigm = paradigms
            .get_mut(&model)
            .ok_or_else(|| FlexioError::Internal(format!("current model `{model}` not allocated")))?;

        if line.starts_with("R:") {
            let (root, rule) = parse_root_rule(line, line_no)?;
            paradigm.roots.insert(root, rule);
        } else if line.starts_with("des:") || line.starts_with("des+:") {
            let expanded = expand_macros(line, &macros, line_no)?;
            let caps = DES_RE.captures(&expanded).ok_or_else(|| {
                FlexioError::compile(line_no, format!("unparseable endings directive `{expanded}`"))
            })?;
            let tags = parse_range(&caps["range"], line_no)?;
            let root = caps["root"].to_string();
            let slots: Vec<&str> = caps["endings"].split(';').collect();
            if slots.len() != tags.len() {
                return Err(FlexioError::compile(
                    line_no,
                    format!("{} tags but {} ending slots", tags.len(), slots.len()),
                ));
            }
            for (tag, slot) in tags.into_iter().zip(slots) {
                // A literal `-` denotes the empty (bare-root) ending.
                let endings = slot
                    .replace('-', "")
                    .split(',')
                    .map(str::to_string)
                    .collect();
                paradigm.des.insert(
                    tag,
                    DesEntry {
                        root: root.clone(),
                        endings,
                    },
                );
            }
        } else if let Some(rest) = line.strip_prefix("abs:") {
            paradigm.abs = parse_range(rest, line_no)?.into_iter().collect();
        } else if let Some(rest) = line.strip_prefix("suf:") {
            let (range, suffix) = rest.split_once(':').ok_or_else(|| {
                FlexioError::compile(line_no, format!("unparseable suffix directive `{line}`"))
            })?;
            let alternates: Vec<String> = suffix.split(';').map(str::to_string).collect();
            for tag in parse_range(range, line_no)? {
                paradigm.suf.insert(tag, alternates.clone());
            }
        } else if let Some(rest) = line.strip_prefix("sufd:") {
            paradigm.sufd = rest.split(';').map(str::to_string).collect();
        } else {
            warn!("line {line_no}: skipping unrecognised directive `{line}`");
        }
    }

    Ok(paradigms)
}

/// Re-inserts omitted `|` separators immediately before the last one, so
/// entries that only provide a lexicon still parse as five fields.
fn repair_field_count(line: &str) -> String {
    let pipes = line.matches('|').count();
    if pipes >= 4 {
        return line.to_string();
    }
    match line.rfind('|') {
        Some(last) => format!(
            "{}{}{}",
            &line[..last],
            "|".repeat(4 - pipes),
            &line[last..]
        ),
        None => line.to_string(),
    }
}

/// Compiles the lemma file into a table keyed by ASCII-folded citation
/// form. The whole source is folded before parsing; only the folded
/// spelling is retained.
pub fn compile_lemmas(source: &str) -> Result<IndexMap<String, LemmaEntry>> {
    let folded = fold(source);
    let mut lemmas = IndexMap::new();

    for (index, line) in folded.lines().enumerate() {
        let line_no = index + 1;
        if line.starts_with('!') || !line.contains('|') {
            continue;
        }
        let repaired = repair_field_count(line);
        let Some(caps) = LEMMA_RE.captures(&repaired) else {
            warn!("line {line_no}: skipping unparseable lemma line `{line}`");
            continue;
        };
        let model = caps
            .name("model")
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                FlexioError::compile(line_no, format!("lemma line `{line}` names no model"))
            })?;
        let entry = LemmaEntry {
            lemma: caps["lemma"].to_string(),
            quantity: caps
                .name("quantity")
                .map(|m| m.as_str().trim_start_matches('=').to_string()),
            model,
            geninf: caps.name("geninf").map(|m| m.as_str().to_string()),
            perf: caps.name("perf").map(|m| m.as_str().to_string()),
            lexicon: caps
                .name("lexicon")
                .map(|m| m.as_str().to_string())
                .filter(|text| !text.is_empty()),
        };
        lemmas.insert(entry.lemma.clone(), entry);
    }

    Ok(lemmas)
}

/// Compiles the tag-name file: one name per line, 1-based.
pub fn compile_tag_names(source: &str) -> BTreeMap<u32, String> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index as u32 + 1, line.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODELS_SRC: &str = "\
! test paradigms
$pf=i;isti;it;imus;istis;erunt,ere
$ba=bam;bas;bat;bamus;batis;bant

modele:uita
R:1:1,0
des:1-6:1:a;a;am;ae;ae;a
des:7-12:1:ae;ae;as;arum;is;is

modele:epulae
pere:uita
R:1:2,0
abs:1-6

modele:uertex
R:0:K
R:1:2,ic
des:1-2:0:-;-
des:3-6:1:em;is;i;e

modele:amo
R:0:1,0
R:1:1,av
des:127-132:0:a+$ba
des:139-144:1:$pf
suf:139-140:ne
sufd:que;cunque
";

    #[test]
    fn parses_root_rules() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let uertex = &models["uertex"];
        assert_eq!(uertex.roots["0"], RootRule::Citation);
        assert_eq!(
            uertex.roots["1"],
            RootRule::Derive {
                deletion: 2,
                addition: "ic".to_string()
            }
        );
        // `0` addition decodes to the empty string.
        assert_eq!(
            models["uita"].roots["1"],
            RootRule::Derive {
                deletion: 1,
                addition: String::new()
            }
        );
    }

    #[test]
    fn parses_ending_ranges_and_bare_root_dash() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let uita = &models["uita"];
        assert_eq!(uita.des.len(), 12);
        assert_eq!(uita.des[&3].endings, vec!["am"]);
        assert_eq!(uita.des[&10].endings, vec!["arum"]);
        // `-` decodes to the empty ending.
        assert_eq!(models["uertex"].des[&1].endings, vec![""]);
        assert_eq!(models["uertex"].des[&1].root, "0");
    }

    #[test]
    fn inheritance_is_a_deep_copy() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let parent = &models["uita"];
        let child = &models["epulae"];
        // Child overrode its root rule and set abs; the parent kept its own.
        assert_eq!(
            child.roots["1"],
            RootRule::Derive {
                deletion: 2,
                addition: String::new()
            }
        );
        assert_eq!(
            parent.roots["1"],
            RootRule::Derive {
                deletion: 1,
                addition: String::new()
            }
        );
        assert!(parent.abs.is_empty());
        assert_eq!(child.abs.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
        // The ending table came over wholesale.
        assert_eq!(child.des, parent.des);
    }

    #[test]
    fn expands_plain_macro_references() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let amo = &models["amo"];
        assert_eq!(amo.des[&139].endings, vec!["i"]);
        assert_eq!(amo.des[&143].endings, vec!["istis"]);
        // The final slot carries comma alternatives.
        assert_eq!(amo.des[&144].endings, vec!["erunt", "ere"]);
    }

    #[test]
    fn expands_prefixed_macro_references() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let amo = &models["amo"];
        assert_eq!(amo.des[&127].endings, vec!["abam"]);
        assert_eq!(amo.des[&132].endings, vec!["abant"]);
    }

    #[test]
    fn records_suffix_tables() {
        let models = compile_models(MODELS_SRC, false).unwrap();
        let amo = &models["amo"];
        assert_eq!(amo.sufd, vec!["que", "cunque"]);
        assert_eq!(amo.suf[&139], vec!["ne"]);
        assert_eq!(amo.suf[&140], vec!["ne"]);
        assert!(!amo.suf.contains_key(&141));
    }

    #[test]
    fn suffix_directives_merge_per_tag() {
        let src = "\
modele:m
R:1:1,0
des:1-2:1:a;a
suf:1-2:ne
suf:2:ue
";
        let models = compile_models(src, false).unwrap();
        assert_eq!(models["m"].suf[&1], vec!["ne"]);
        assert_eq!(models["m"].suf[&2], vec!["ue"]);
    }

    #[test]
    fn folding_produces_an_ascii_table() {
        let src = "\
modele:fortis
R:1:2,0
des:49-51:1:ĭŏr;ĭŏr;ĭōrĕm
";
        let scansion = compile_models(src, false).unwrap();
        let ascii = compile_models(src, true).unwrap();
        assert_eq!(scansion["fortis"].des[&51].endings, vec!["ĭōrĕm"]);
        assert_eq!(ascii["fortis"].des[&51].endings, vec!["iorem"]);
    }

    #[test]
    fn rejects_unknown_parent() {
        let err = compile_models("modele:a\npere:missing\n", false).unwrap_err();
        assert!(matches!(err, FlexioError::Compile { line: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_directive_outside_model_block() {
        let err = compile_models("R:1:1,0\n", false).unwrap_err();
        assert!(matches!(err, FlexioError::Compile { line: 1, .. }), "{err}");
    }

    #[test]
    fn rejects_unterminated_macro_expansion() {
        let err = compile_models("modele:a\ndes:1:1:$missing\n", false).unwrap_err();
        assert!(matches!(err, FlexioError::Compile { line: 2, .. }), "{err}");
    }

    #[test]
    fn rejects_slot_count_mismatch() {
        let err = compile_models("modele:a\nR:1:1,0\ndes:1-3:1:a;b\n", false).unwrap_err();
        assert!(matches!(err, FlexioError::Compile { line: 3, .. }), "{err}");
    }

    const LEMMAS_SRC: &str = "\
! test lexicon
vita=vīta|uita|||vie
volumen|corpus|volumin||rouleau
adulescens|uertex|adulescent,adolescent||jeune homme
seco|amo|-|sect|couper
interdum|interdum|parfois
no pipes here
";

    #[test]
    fn keys_are_folded_and_quantity_is_split_off() {
        let lemmas = compile_lemmas(LEMMAS_SRC).unwrap();
        let vita = &lemmas["vita"];
        assert_eq!(vita.lemma, "vita");
        assert_eq!(vita.quantity.as_deref(), Some("vita"));
        assert_eq!(vita.model, "uita");
        assert_eq!(vita.geninf, None);
        assert_eq!(vita.lexicon.as_deref(), Some("vie"));
    }

    #[test]
    fn captures_precomputed_roots() {
        let lemmas = compile_lemmas(LEMMAS_SRC).unwrap();
        assert_eq!(lemmas["volumen"].geninf.as_deref(), Some("volumin"));
        assert_eq!(
            lemmas["adulescens"].geninf.as_deref(),
            Some("adulescent,adolescent")
        );
        // A lone `-` placeholder means absent.
        let seco = &lemmas["seco"];
        assert_eq!(seco.geninf, None);
        assert_eq!(seco.perf.as_deref(), Some("sect"));
    }

    #[test]
    fn repairs_lines_missing_separators() {
        let lemmas = compile_lemmas(LEMMAS_SRC).unwrap();
        // `interdum|interdum|parfois` has two separators; the missing two
        // are inserted before the last, leaving the tail as lexicon.
        let entry = &lemmas["interdum"];
        assert_eq!(entry.model, "interdum");
        assert_eq!(entry.geninf, None);
        assert_eq!(entry.perf, None);
        assert_eq!(entry.lexicon.as_deref(), Some("parfois"));
    }

    #[test]
    fn skips_comments_and_pipeless_lines() {
        let lemmas = compile_lemmas(LEMMAS_SRC).unwrap();
        assert_eq!(lemmas.len(), 5);
    }

    #[test]
    fn rejects_lemma_without_model() {
        let err = compile_lemmas("ecce||||voici\n").unwrap_err();
        assert!(matches!(err, FlexioError::Compile { line: 1, .. }), "{err}");
    }

    #[test]
    fn tag_names_are_one_based() {
        let names = compile_tag_names("nominatif singulier\nvocatif singulier\n");
        assert_eq!(names[&1], "nominatif singulier");
        assert_eq!(names[&2], "vocatif singulier");
        assert_eq!(names.len(), 2);
    }
}
