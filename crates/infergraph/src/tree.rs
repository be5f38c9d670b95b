use crate::accession::Accession;
use crate::group::{Group, GroupId, TreeId};
use crate::peptide::Peptide;
use crate::FnvIndexMap;
use log::{debug, trace};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A connected set of [`Group`]s sharing one tree id.
///
/// The tree owns its groups; edges between them are stored as ids. All
/// operations that have to keep the transitive accession sets consistent
/// live here, since they walk the graph.
///
/// Operations addressing a group that is not part of the tree are no-ops.
#[derive(Clone, Debug, Default)]
pub struct InferenceTree {
    id: TreeId,
    groups: BTreeMap<GroupId, Group>,
}

impl InferenceTree {
    pub fn new(id: TreeId) -> Self {
        Self {
            id,
            groups: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Reassign the tree id, on the tree and on every group in it
    pub fn set_id(&mut self, id: TreeId) {
        self.id = id;
        self.groups.values_mut().for_each(|g| g.set_tree_id(id));
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn max_group_id(&self) -> Option<GroupId> {
        self.groups.keys().next_back().copied()
    }

    /// Place a group in this tree, replacing any group with the same id
    pub fn insert_group(&mut self, mut group: Group) -> GroupId {
        group.set_tree_id(self.id);
        let id = group.id();
        self.groups.insert(id, group);
        id
    }

    /// Create an empty group with the next free id
    pub fn new_group(&mut self) -> GroupId {
        let id = self.max_group_id().map_or(GroupId(1), |id| id.offset(1));
        self.insert_group(Group::new(id))
    }

    pub fn add_peptide(&mut self, group: GroupId, peptide: Arc<Peptide>) {
        if let Some(group) = self.groups.get_mut(&group) {
            group.add_peptide(peptide);
        }
    }

    /// Attach an accession directly to `group`, and propagate it to the
    /// transitive accessions of the group and all its descendants
    pub fn add_accession(&mut self, group: GroupId, accession: Arc<Accession>) {
        match self.groups.get_mut(&group) {
            Some(g) => g.insert_accession(accession.clone()),
            None => return,
        }
        self.propagate_accession(group, &accession);
    }

    /// Insert `accession` into the transitive accessions of `start` and all
    /// of its descendants. Every descendant is visited, even below groups
    /// that already carry the accession, since a cascading removal may have
    /// stripped it further down.
    fn propagate_accession(&mut self, start: GroupId, accession: &Arc<Accession>) {
        let mut stack = vec![start];
        let mut visited = fnv::FnvHashSet::default();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(group) = self.groups.get_mut(&id) {
                group.insert_all_accession(accession);
                stack.extend(group.children().iter().copied());
            }
        }
    }

    /// Add an edge `parent -> child`. The back edge is recorded as well, and
    /// the transitive accessions of `parent` are propagated into `child`
    /// and its descendants.
    pub fn add_child(&mut self, parent: GroupId, child: GroupId) {
        if parent == child || !self.groups.contains_key(&child) {
            return;
        }
        let inherited = match self.groups.get_mut(&parent) {
            Some(p) => {
                p.insert_child(child);
                p.all_accessions().values().cloned().collect::<Vec<_>>()
            }
            None => return,
        };
        if let Some(c) = self.groups.get_mut(&child) {
            c.insert_parent(parent);
        }
        for accession in &inherited {
            self.propagate_accession(child, accession);
        }
    }

    /// Same as [`InferenceTree::add_child`], seen from the child
    pub fn add_parent(&mut self, child: GroupId, parent: GroupId) {
        self.add_child(parent, child)
    }

    /// Remove a direct accession from `group`, and remove it from the
    /// transitive accessions of the group and all of its descendants.
    ///
    /// The removal is unconditional: a descendant loses the accession even
    /// if another of its ancestors still carries it directly.
    pub fn remove_accession(&mut self, group: GroupId, accession: &str) -> Option<Arc<Accession>> {
        let removed = self.groups.get_mut(&group)?.remove_accession(accession);
        let mut stack = vec![group];
        let mut visited = fnv::FnvHashSet::default();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(g) = self.groups.get_mut(&id) {
                if g.remove_all_accession(accession) {
                    trace!("removed {} from group {} of tree {}", accession, id, self.id);
                }
                stack.extend(g.children().iter().copied());
            }
        }
        removed
    }

    /// All descendants of `group`, keyed by id
    pub fn all_children(&self, group: GroupId) -> BTreeMap<GroupId, &Group> {
        let mut children = BTreeMap::new();
        let mut stack = match self.groups.get(&group) {
            Some(g) => g.children().iter().rev().copied().collect::<Vec<_>>(),
            None => return children,
        };
        while let Some(id) = stack.pop() {
            if children.contains_key(&id) {
                continue;
            }
            if let Some(child) = self.groups.get(&id) {
                children.insert(id, child);
                stack.extend(child.children().iter().rev().copied());
            }
        }
        children
    }

    /// All descendants of `group` that own at least one peptide
    pub fn all_peptide_children(&self, group: GroupId) -> BTreeMap<GroupId, &Group> {
        let mut children = self.all_children(group);
        children.retain(|_, g| !g.peptides().is_empty());
        children
    }

    /// Peptides of `group` and of all its descendants, keyed by sequence
    pub fn all_peptides(&self, group: GroupId) -> FnvIndexMap<String, Arc<Peptide>> {
        let mut peptides = FnvIndexMap::default();
        if let Some(g) = self.groups.get(&group) {
            peptides.extend(g.peptides().iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        for child in self.all_peptide_children(group).values() {
            peptides.extend(child.peptides().iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        peptides
    }

    /// Sequences of [`InferenceTree::all_peptides`], space separated, own
    /// peptides first
    pub fn peptides_string(&self, group: GroupId) -> String {
        self.all_peptides(group)
            .keys()
            .map(|seq| format!("{} ", seq))
            .collect()
    }

    /// Shift every group id of this tree by `delta`
    pub fn offset(&mut self, delta: u64) {
        let groups = std::mem::take(&mut self.groups);
        self.groups = groups
            .into_iter()
            .map(|(_, mut g)| {
                g.set_offset(delta);
                (g.id(), g)
            })
            .collect();
    }

    /// Absorb all groups of `other` into this tree. The ids of `other` are
    /// shifted past the largest id of this tree first; the applied shift is
    /// returned.
    pub fn merge(&mut self, mut other: InferenceTree) -> u64 {
        let delta = self.max_group_id().map_or(0, |id| id.0 + 1);
        debug!(
            "merging tree {} ({} groups) into tree {} ({} groups), offset {}",
            other.id,
            other.len(),
            self.id,
            self.len(),
            delta
        );
        other.offset(delta);
        for (id, mut group) in other.groups {
            group.set_tree_id(self.id);
            self.groups.insert(id, group);
        }
        delta
    }
}
