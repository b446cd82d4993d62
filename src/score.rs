//! Candidate scoring
//!
//! Compares a [`Fingerprint`] with one element of a variant document and
//! produces a similarity in `[0, 1]` as a weighted mean of four features:
//!
//! | Feature    | Comparison                                                  |
//! |------------|-------------------------------------------------------------|
//! | tag        | equal ignoring ASCII case                                   |
//! | attributes | per reference pair: equal value, shared token, or nothing   |
//! | text       | Jaccard over lower-cased whitespace tokens                  |
//! | structure  | ancestor chain LCS ratio blended with sibling tag overlap   |
//!
//! Weights come from [`Weights`]. The element a fingerprint was taken from
//! always scores exactly `1.0` against it.

use crate::config::Weights;
use crate::dom::{DocumentAccess, NodeId};
use crate::fingerprint::Fingerprint;
use lru::LruCache;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroUsize;
use std::rc::Rc;

/// Per-feature scores of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub tag: f64,
    pub attributes: f64,
    pub text: f64,
    pub structure: f64,
    /// Weighted mean of the four features
    pub total: f64,
}

/// Tokenized form of a string, computed once per distinct interned value
#[derive(Debug)]
struct Tokens {
    lower: String,
    /// Lower-cased whitespace-separated words
    words: HashSet<String>,
    /// Lower-cased alphanumeric runs long enough to count as shared
    runs: Vec<String>,
}

impl Tokens {
    fn new(s: &str, min_len: usize) -> Self {
        let lower = s.to_lowercase();
        let words = lower.split_whitespace().map(str::to_string).collect();
        let runs = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|run| run.chars().count() >= min_len)
            .map(str::to_string)
            .collect();
        Tokens { lower, words, runs }
    }

    fn shares_token(&self, other: &Tokens) -> bool {
        self.runs.iter().any(|t| other.lower.contains(t.as_str()))
            || other.runs.iter().any(|t| self.lower.contains(t.as_str()))
    }
}

/// Reference side of the comparison, normalized once
struct Reference {
    tag: String,
    attributes: Vec<(String, String, Tokens)>,
    text: Tokens,
    ancestors: Vec<String>,
    siblings: BTreeMap<String, usize>,
}

impl Reference {
    fn new(fp: &Fingerprint, min_len: usize) -> Self {
        Reference {
            tag: fp.tag.clone(),
            attributes: fp
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone(), Tokens::new(v, min_len)))
                .collect(),
            text: Tokens::new(&fp.text, min_len),
            ancestors: fp.ancestors.iter().map(|t| t.to_ascii_lowercase()).collect(),
            siblings: lowercase_multiset(fp.siblings.iter().map(|(t, n)| (t.as_str(), *n))),
        }
    }
}

/// Scores candidates of one variant document against one fingerprint.
///
/// Holds an LRU cache of tokenized strings keyed by the document's interned
/// string ids, so a scorer is bound to a single document and is not shared
/// between threads. Lower-cased child tag counts are kept per parent, so a
/// parent's children are counted once however many of them are scored.
pub struct Scorer<'a, D: DocumentAccess> {
    doc: &'a D,
    weights: Weights,
    reference: Reference,
    cache: LruCache<u32, Rc<Tokens>>,
    children: HashMap<NodeId, Rc<BTreeMap<String, usize>>>,
}

impl<'a, D: DocumentAccess> Scorer<'a, D> {
    pub fn new(fp: &Fingerprint, doc: &'a D, weights: &Weights, cache_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Scorer {
            doc,
            weights: *weights,
            reference: Reference::new(fp, weights.min_token_len),
            cache: LruCache::new(capacity),
            children: HashMap::new(),
        }
    }

    /// Similarity of `candidate` to the reference, in `[0, 1]`
    pub fn score(&mut self, candidate: NodeId) -> f64 {
        self.explain(candidate).total
    }

    /// Similarity of `candidate` with the per-feature breakdown
    pub fn explain(&mut self, candidate: NodeId) -> ScoreBreakdown {
        let tag = self.tag_score(candidate);
        let attributes = self.attribute_score(candidate);
        let text = self.text_score(candidate);
        let structure = self.structure_score(candidate);

        let w = &self.weights;
        // Numerator and denominator summed in the same order, so all-ones
        // features give exactly 1.0
        let weighted = w.tag * tag + w.attributes * attributes + w.text * text + w.structure * structure;
        let total = (weighted / w.total()).clamp(0.0, 1.0);

        ScoreBreakdown { tag, attributes, text, structure, total }
    }

    fn tag_score(&self, candidate: NodeId) -> f64 {
        match self.doc.node_name(candidate) {
            Some(tag) if tag.eq_ignore_ascii_case(&self.reference.tag) => 1.0,
            _ => 0.0,
        }
    }

    fn attribute_score(&mut self, candidate: NodeId) -> f64 {
        let doc = self.doc;
        let pairs = doc.attribute_ids(candidate);
        let partial = self.weights.partial_credit;

        if self.reference.attributes.is_empty() {
            return if pairs.is_empty() { 1.0 } else { partial };
        }

        let mut sum = 0.0;
        for i in 0..self.reference.attributes.len() {
            let key = self.reference.attributes[i].0.as_str();
            let found = pairs
                .iter()
                .find(|(name_id, _)| doc.strings().get_str(*name_id) == Some(key));
            let Some(&(_, value_id)) = found else {
                continue;
            };

            let value = doc.strings().get_str(value_id).unwrap_or_default();
            if value == self.reference.attributes[i].1 {
                sum += 1.0;
            } else {
                let tokens = self.tokens_for(value_id);
                if self.reference.attributes[i].2.shares_token(&tokens) {
                    sum += partial;
                }
            }
        }
        sum / self.reference.attributes.len() as f64
    }

    fn text_score(&mut self, candidate: NodeId) -> f64 {
        let tokens = self.candidate_text(candidate);
        jaccard(&self.reference.text.words, &tokens.words)
    }

    fn structure_score(&mut self, candidate: NodeId) -> f64 {
        let doc = self.doc;
        let ancestors: Vec<String> = doc
            .element_ancestors(candidate)
            .into_iter()
            .filter_map(|id| doc.node_name(id).map(str::to_ascii_lowercase))
            .collect();

        let chain = lcs_ratio(&self.reference.ancestors, &ancestors);
        let shape = match doc.parent_of(candidate) {
            Some(parent) => {
                let counts = self.child_tags(parent);
                let own = doc
                    .node_name(candidate)
                    .filter(|_| doc.is_element(candidate))
                    .map(str::to_ascii_lowercase);
                multiset_jaccard_without(&self.reference.siblings, &counts, own.as_deref())
            }
            None => multiset_jaccard(&self.reference.siblings, &BTreeMap::new()),
        };

        let a = self.weights.ancestor_share;
        let b = 1.0 - a;
        (a * chain + b * shape) / (a + b)
    }

    /// Direct text tokens of an element. A single text child is looked up
    /// in the cache by its interned id.
    fn candidate_text(&mut self, candidate: NodeId) -> Rc<Tokens> {
        let doc = self.doc;
        let text_children: Vec<NodeId> = doc
            .children_vec(candidate)
            .into_iter()
            .filter(|&c| doc.text_content(c).is_some())
            .collect();

        match text_children.as_slice() {
            [single] => match doc.get_node(*single) {
                Some(node) => self.tokens_for(node.name_id),
                None => Rc::new(Tokens::new("", self.weights.min_token_len)),
            },
            _ => Rc::new(Tokens::new(&doc.direct_text(candidate), self.weights.min_token_len)),
        }
    }

    /// Lower-cased tag counts of every element child of `parent`
    fn child_tags(&mut self, parent: NodeId) -> Rc<BTreeMap<String, usize>> {
        if let Some(counts) = self.children.get(&parent) {
            return Rc::clone(counts);
        }
        let doc = self.doc;
        let counts = Rc::new(lowercase_multiset(
            doc.element_children(parent)
                .into_iter()
                .filter_map(|c| doc.node_name(c))
                .map(|tag| (tag, 1)),
        ));
        self.children.insert(parent, Rc::clone(&counts));
        counts
    }

    fn tokens_for(&mut self, string_id: u32) -> Rc<Tokens> {
        if let Some(tokens) = self.cache.get(&string_id) {
            return Rc::clone(tokens);
        }
        let s = self.doc.strings().get_str(string_id).unwrap_or_default();
        let tokens = Rc::new(Tokens::new(s, self.weights.min_token_len));
        self.cache.put(string_id, Rc::clone(&tokens));
        tokens
    }
}

/// Score one candidate without keeping a scorer around
pub fn score<D: DocumentAccess>(fp: &Fingerprint, doc: &D, candidate: NodeId, weights: &Weights) -> f64 {
    Scorer::new(fp, doc, weights, 64).score(candidate)
}

/// Per-feature breakdown for one candidate
pub fn explain<D: DocumentAccess>(
    fp: &Fingerprint,
    doc: &D,
    candidate: NodeId,
    weights: &Weights,
) -> ScoreBreakdown {
    Scorer::new(fp, doc, weights, 64).explain(candidate)
}

fn lowercase_multiset<'s>(items: impl Iterator<Item = (&'s str, usize)>) -> BTreeMap<String, usize> {
    let mut set = BTreeMap::new();
    for (tag, count) in items {
        *set.entry(tag.to_ascii_lowercase()).or_insert(0) += count;
    }
    set
}

/// |A ∩ B| / |A ∪ B|; two empty sets are identical
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}

/// Σ min / Σ max over tag counts
fn multiset_jaccard(a: &BTreeMap<String, usize>, b: &BTreeMap<String, usize>) -> f64 {
    multiset_jaccard_without(a, b, None)
}

/// [`multiset_jaccard`] with one occurrence of `skip` taken out of `b`
fn multiset_jaccard_without(a: &BTreeMap<String, usize>, b: &BTreeMap<String, usize>, skip: Option<&str>) -> f64 {
    let count_in_b = |tag: &str, n: usize| if skip == Some(tag) { n.saturating_sub(1) } else { n };

    let mut min_sum = 0usize;
    let mut max_sum = 0usize;
    for (tag, &n) in a {
        let m = b.get(tag).map_or(0, |&m| count_in_b(tag, m));
        min_sum += n.min(m);
        max_sum += n.max(m);
    }
    for (tag, &m) in b {
        if !a.contains_key(tag) {
            max_sum += count_in_b(tag, m);
        }
    }
    if max_sum == 0 {
        return 1.0;
    }
    min_sum as f64 / max_sum as f64
}

/// Longest common subsequence length divided by the longer chain's length
fn lcs_ratio(a: &[String], b: &[String]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()] as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    const ORIGINAL: &str = r#"<html><body><div class="panel">
        <h3>Actions</h3>
        <a id="make-everything-ok-button" class="btn btn-success" href="/ok" title="Make-Button">Make everything OK</a>
        <a class="btn btn-danger" href="/cancel">Cancel</a>
    </div></body></html>"#;

    fn fingerprint_of(doc: &Document, id_value: &str) -> Fingerprint {
        let node = doc
            .elements()
            .into_iter()
            .find(|&id| doc.get_attribute(id, "id") == Some(id_value))
            .unwrap();
        Fingerprint::extract(doc, node)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_self_score_is_exactly_one() {
        let doc = Document::parse(ORIGINAL);
        let fp = fingerprint_of(&doc, "make-everything-ok-button");
        let node = crate::locate::locate(&doc, "make-everything-ok-button").unwrap();

        let breakdown = explain(&fp, &doc, node, &Weights::default());
        assert_eq!(breakdown.tag, 1.0);
        assert_eq!(breakdown.attributes, 1.0);
        assert_eq!(breakdown.text, 1.0);
        assert_eq!(breakdown.structure, 1.0);
        assert_eq!(breakdown.total, 1.0);
    }

    #[test]
    fn test_self_score_with_custom_weights() {
        let doc = Document::parse(ORIGINAL);
        let fp = fingerprint_of(&doc, "make-everything-ok-button");
        let node = crate::locate::locate(&doc, "make-everything-ok-button").unwrap();
        let weights = Weights { tag: 0.1, attributes: 0.7, text: 0.3, structure: 0.13, ancestor_share: 0.37, ..Weights::default() };
        assert_eq!(score(&fp, &doc, node, &weights), 1.0);
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let doc = Document::parse(ORIGINAL);
        let fp = fingerprint_of(&doc, "make-everything-ok-button");
        let mut scorer = Scorer::new(&fp, &doc, &Weights::default(), 16);
        for id in doc.elements() {
            let s = scorer.score(id);
            assert!((0.0..=1.0).contains(&s), "score {s} out of range");
        }
    }

    #[test]
    fn test_degrades_with_each_change() {
        let original = Document::parse(ORIGINAL);
        let fp = fingerprint_of(&original, "make-everything-ok-button");
        let weights = Weights::default();

        // same element, id changed
        let v1 = Document::parse(
            r#"<html><body><div class="panel"><h3>Actions</h3>
            <a id="ok-btn" class="btn btn-success" href="/ok" title="Make-Button">Make everything OK</a>
            <a class="btn btn-danger" href="/cancel">Cancel</a></div></body></html>"#,
        );
        // id changed and text changed
        let v2 = Document::parse(
            r#"<html><body><div class="panel"><h3>Actions</h3>
            <a id="ok-btn" class="btn btn-success" href="/ok" title="Make-Button">Do it</a>
            <a class="btn btn-danger" href="/cancel">Cancel</a></div></body></html>"#,
        );

        let target = |doc: &Document| {
            doc.elements()
                .into_iter()
                .find(|&id| doc.get_attribute(id, "id") == Some("ok-btn"))
                .unwrap()
        };

        let s1 = score(&fp, &v1, target(&v1), &weights);
        let s2 = score(&fp, &v2, target(&v2), &weights);
        assert!(s1 < 1.0);
        assert!(s2 < s1);
    }

    #[test]
    fn test_attribute_partial_credit() {
        let original = Document::parse(r#"<r><a class="btn-success large"/></r>"#);
        let fp = Fingerprint::extract(&original, original.elements()[1]);

        let variant = Document::parse(r#"<r><a class="success"/><a class="other"/><a/></r>"#);
        let els = variant.elements();
        let weights = Weights::default();
        assert_eq!(explain(&fp, &variant, els[1], &weights).attributes, 0.5);
        assert_eq!(explain(&fp, &variant, els[2], &weights).attributes, 0.0);
        assert_eq!(explain(&fp, &variant, els[3], &weights).attributes, 0.0);
    }

    #[test]
    fn test_no_reference_attributes() {
        let original = Document::parse("<r><b>x</b></r>");
        let fp = Fingerprint::extract(&original, original.elements()[1]);

        let variant = Document::parse(r#"<r><b>x</b><b id="y">x</b></r>"#);
        let els = variant.elements();
        let weights = Weights::default();
        assert_eq!(explain(&fp, &variant, els[1], &weights).attributes, 1.0);
        assert_eq!(explain(&fp, &variant, els[2], &weights).attributes, 0.5);
    }

    #[test]
    fn test_text_edge_cases() {
        let original = Document::parse("<r><p></p><p>Hello World</p></r>");
        let empty = Fingerprint::extract(&original, original.elements()[1]);
        let full = Fingerprint::extract(&original, original.elements()[2]);

        let variant = Document::parse("<r><p></p><p>hello   WORLD</p><p>hello there</p></r>");
        let els = variant.elements();
        let w = Weights::default();
        assert_eq!(explain(&empty, &variant, els[1], &w).text, 1.0);
        assert_eq!(explain(&empty, &variant, els[2], &w).text, 0.0);
        assert_eq!(explain(&full, &variant, els[2], &w).text, 1.0);
        assert!((explain(&full, &variant, els[3], &w).text - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tag_case_insensitive() {
        let original = Document::parse("<root><Item/></root>");
        let fp = Fingerprint::extract(&original, original.elements()[1]);
        let variant = Document::parse("<root><ITEM/></root>");
        assert_eq!(explain(&fp, &variant, variant.elements()[1], &Weights::default()).tag, 1.0);
    }

    #[test]
    fn test_lcs_ratio() {
        assert_eq!(lcs_ratio(&[], &[]), 1.0);
        assert_eq!(lcs_ratio(&strings(&["html", "body"]), &[]), 0.0);
        assert_eq!(
            lcs_ratio(&strings(&["html", "body", "div"]), &strings(&["html", "body", "section", "div"])),
            0.75
        );
    }

    #[test]
    fn test_multiset_jaccard() {
        let a: BTreeMap<String, usize> = [("a".to_string(), 2), ("p".to_string(), 1)].into();
        let b: BTreeMap<String, usize> = [("a".to_string(), 1), ("h3".to_string(), 1)].into();
        assert_eq!(multiset_jaccard(&a, &a), 1.0);
        assert_eq!(multiset_jaccard(&BTreeMap::new(), &BTreeMap::new()), 1.0);
        // min: a=1; max: a=2, p=1, h3=1
        assert_eq!(multiset_jaccard(&a, &b), 0.25);
    }

    #[test]
    fn test_wide_parent_counts_children_once() {
        let items: String = (0..3000).map(|i| format!("<li class=\"item-{i}\">row {i}</li>")).collect();
        let doc = Document::parse(&format!("<ul><h3>Rows</h3>{items}<p>end</p></ul>"));
        let elements = doc.elements();
        let fp = Fingerprint::extract(&doc, elements[2 + 1500]);

        let mut scorer = Scorer::new(&fp, &doc, &Weights::default(), 64);
        let shapes: Vec<f64> = elements.iter().map(|&id| scorer.structure_score(id)).collect();
        // the <ul> under the document node and the children of <ul>
        assert_eq!(scorer.children.len(), 2);

        let reference = &scorer.reference.siblings;
        for (&id, &shape) in elements.iter().zip(&shapes).step_by(97) {
            let siblings = lowercase_multiset(crate::fingerprint::sibling_tags(&doc, id).into_iter());
            let ancestors: Vec<String> = doc
                .element_ancestors(id)
                .into_iter()
                .filter_map(|a| doc.node_name(a).map(str::to_ascii_lowercase))
                .collect();
            let a = scorer.weights.ancestor_share;
            let expected = (a * lcs_ratio(&scorer.reference.ancestors, &ancestors)
                + (1.0 - a) * multiset_jaccard(reference, &siblings))
                / (a + (1.0 - a));
            assert_eq!(shape, expected);
        }
        assert_eq!(shapes[2 + 1500], 1.0);
    }

    #[test]
    fn test_sibling_overlap_leaves_out_the_candidate() {
        let a: BTreeMap<String, usize> = [("li".to_string(), 2), ("h3".to_string(), 1)].into();
        let b: BTreeMap<String, usize> = [("li".to_string(), 3), ("h3".to_string(), 1)].into();
        assert_eq!(multiset_jaccard_without(&a, &b, Some("li")), 1.0);
        assert_eq!(multiset_jaccard_without(&a, &b, None), 0.75);

        let only: BTreeMap<String, usize> = [("p".to_string(), 1)].into();
        assert_eq!(multiset_jaccard_without(&BTreeMap::new(), &only, Some("p")), 1.0);
    }

    #[test]
    fn test_cache_reuse_gives_same_scores() {
        let doc = Document::parse(ORIGINAL);
        let fp = fingerprint_of(&doc, "make-everything-ok-button");
        let mut scorer = Scorer::new(&fp, &doc, &Weights::default(), 1);
        let first: Vec<f64> = doc.elements().into_iter().map(|id| scorer.score(id)).collect();
        let second: Vec<f64> = doc.elements().into_iter().map(|id| scorer.score(id)).collect();
        assert_eq!(first, second);
    }
}
