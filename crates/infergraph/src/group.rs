use crate::accession::Accession;
use crate::peptide::Peptide;
use crate::FnvIndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a [`Group`], unique within its tree
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GroupId(pub u64);

impl GroupId {
    pub fn offset(self, delta: u64) -> Self {
        GroupId(self.0 + delta)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a connected component of the inference graph
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TreeId(pub u64);

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A node of the inference graph.
///
/// A group owns the peptides that are explained by exactly the accessions
/// in [`Group::all_accessions`]: its own (direct) accessions, plus those
/// of all its ancestors. Edges point from parent to child and are stored as
/// ids on both ends; the groups themselves live in an
/// [`InferenceTree`](crate::tree::InferenceTree), which is also where every
/// operation that has to walk the graph is implemented.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    id: GroupId,
    /// `None` until the group is placed in a tree
    tree_id: Option<TreeId>,
    peptides: FnvIndexMap<String, Arc<Peptide>>,
    children: BTreeSet<GroupId>,
    parents: BTreeSet<GroupId>,
    accessions: FnvIndexMap<String, Arc<Accession>>,
    all_accessions: FnvIndexMap<String, Arc<Accession>>,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            tree_id: None,
            peptides: FnvIndexMap::default(),
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
            accessions: FnvIndexMap::default(),
            all_accessions: FnvIndexMap::default(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn tree_id(&self) -> Option<TreeId> {
        self.tree_id
    }

    pub fn set_tree_id(&mut self, tree_id: TreeId) {
        self.tree_id = Some(tree_id);
    }

    /// Direct peptides, keyed by sequence
    pub fn peptides(&self) -> &FnvIndexMap<String, Arc<Peptide>> {
        &self.peptides
    }

    pub fn set_peptides(&mut self, peptides: FnvIndexMap<String, Arc<Peptide>>) {
        self.peptides = peptides;
    }

    /// Insert a peptide, replacing any peptide with the same sequence
    pub fn add_peptide(&mut self, peptide: Arc<Peptide>) {
        self.peptides.insert(peptide.sequence.clone(), peptide);
    }

    pub fn children(&self) -> &BTreeSet<GroupId> {
        &self.children
    }

    pub fn parents(&self) -> &BTreeSet<GroupId> {
        &self.parents
    }

    /// Accessions attached directly to this group
    pub fn accessions(&self) -> &FnvIndexMap<String, Arc<Accession>> {
        &self.accessions
    }

    /// Direct accessions of this group and of all its ancestors
    pub fn all_accessions(&self) -> &FnvIndexMap<String, Arc<Accession>> {
        &self.all_accessions
    }

    /// Direct accessions, space separated
    pub fn accession_string(&self) -> String {
        self.accessions.keys().join(" ")
    }

    pub fn accession_string_array(&self) -> Vec<&str> {
        self.accessions.keys().map(String::as_str).collect()
    }

    /// Shift the id of this group, and the ids it uses to refer to its
    /// children and parents, by `delta`.
    ///
    /// Only meaningful if every group of the tree is shifted by the same
    /// amount; see [`InferenceTree::offset`](crate::tree::InferenceTree::offset).
    pub fn set_offset(&mut self, delta: u64) {
        self.id = self.id.offset(delta);
        self.children = self.children.iter().map(|c| c.offset(delta)).collect();
        self.parents = self.parents.iter().map(|p| p.offset(delta)).collect();
    }

    pub(crate) fn insert_child(&mut self, child: GroupId) {
        self.children.insert(child);
    }

    pub(crate) fn insert_parent(&mut self, parent: GroupId) {
        self.parents.insert(parent);
    }

    pub(crate) fn insert_accession(&mut self, accession: Arc<Accession>) {
        self.accessions
            .insert(accession.accession.clone(), accession);
    }

    pub(crate) fn remove_accession(&mut self, accession: &str) -> Option<Arc<Accession>> {
        self.accessions.shift_remove(accession)
    }

    /// Returns `false` if the accession was already present
    pub(crate) fn insert_all_accession(&mut self, accession: &Arc<Accession>) -> bool {
        if self.all_accessions.contains_key(&accession.accession) {
            return false;
        }
        self.all_accessions
            .insert(accession.accession.clone(), accession.clone());
        true
    }

    pub(crate) fn remove_all_accession(&mut self, accession: &str) -> bool {
        self.all_accessions.shift_remove(accession).is_some()
    }
}

/// Children and parents only contribute their ids, and maps contribute
/// their keys in sorted order, so that the hash agrees with `==` (which
/// ignores map order).
///
/// `Group` is not `Eq` (peptides carry float scores), so it cannot key a
/// `HashMap`/`HashSet`. The hash is for fingerprinting groups directly, e.g.
/// to compare graph snapshots.
impl Hash for Group {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.tree_id.hash(state);
        self.peptides.keys().sorted().for_each(|k| k.hash(state));
        self.children.hash(state);
        self.parents.hash(state);
        self.accessions.keys().sorted().for_each(|k| k.hash(state));
        self.all_accessions.keys().sorted().for_each(|k| k.hash(state));
    }
}
