//! # Inference forest
//!
//! The inference graph is a forest: every connected component of the
//! peptide/accession relation is an [`InferenceTree`]. Trees are merged
//! when an edge is added between two of them.
//!
//! ## Construction
//! [`InferenceForest::build`] turns peptides (whose PSMs carry accessions)
//! into groups:
//! - accessions explaining exactly the same peptides are attached directly
//!   to the same group
//! - a peptide sits in the group whose transitive accession set equals the
//!   set of accessions explaining the peptide
//! - an edge `parent -> child` exists if the parent's accession set is a
//!   strict subset of the child's, and no other group sits in between
//!
//! Components are built in parallel.

use crate::accession::Accession;
use crate::group::{Group, GroupId, TreeId};
use crate::peptide::Peptide;
use crate::tree::InferenceTree;
use fnv::FnvHashMap;
use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Address of a group across the trees of a forest
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupRef {
    pub tree: TreeId,
    pub group: GroupId,
}

impl GroupRef {
    pub fn new(tree: TreeId, group: GroupId) -> Self {
        Self { tree, group }
    }
}

/// Record of one tree being absorbed into another
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Merge {
    pub absorbed: TreeId,
    pub into: TreeId,
    /// Shift applied to the group ids of the absorbed tree
    pub offset: u64,
}

impl Merge {
    /// Translate a reference taken before the merge
    pub fn remap(&self, group: GroupRef) -> GroupRef {
        if group.tree == self.absorbed {
            GroupRef::new(self.into, group.group.offset(self.offset))
        } else {
            group
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InferenceForest {
    trees: BTreeMap<TreeId, InferenceTree>,
}

impl InferenceForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree, replacing any tree with the same id
    pub fn insert_tree(&mut self, tree: InferenceTree) -> Option<InferenceTree> {
        self.trees.insert(tree.id(), tree)
    }

    pub fn tree(&self, id: TreeId) -> Option<&InferenceTree> {
        self.trees.get(&id)
    }

    pub fn tree_mut(&mut self, id: TreeId) -> Option<&mut InferenceTree> {
        self.trees.get_mut(&id)
    }

    pub fn trees(&self) -> impl Iterator<Item = &InferenceTree> {
        self.trees.values()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn group(&self, group: GroupRef) -> Option<&Group> {
        self.trees.get(&group.tree)?.group(group.group)
    }

    /// Add the edge `parent -> child`.
    ///
    /// If both groups live in different trees, the smaller tree (fewer
    /// groups, ties broken in favour of keeping the lower tree id) is
    /// merged into the larger one first. The merge is returned so that
    /// callers can [`Merge::remap`] any references they hold.
    pub fn connect(&mut self, parent: GroupRef, child: GroupRef) -> Option<Merge> {
        if self.group(parent).is_none() || self.group(child).is_none() {
            return None;
        }

        if parent.tree == child.tree {
            if let Some(tree) = self.trees.get_mut(&parent.tree) {
                tree.add_child(parent.group, child.group);
            }
            return None;
        }

        let (a, b) = (&self.trees[&parent.tree], &self.trees[&child.tree]);
        let (into, absorbed) = match a.len().cmp(&b.len()) {
            std::cmp::Ordering::Greater => (parent.tree, child.tree),
            std::cmp::Ordering::Less => (child.tree, parent.tree),
            std::cmp::Ordering::Equal => {
                (parent.tree.min(child.tree), parent.tree.max(child.tree))
            }
        };

        let other = self.trees.remove(&absorbed)?;
        let tree = self.trees.get_mut(&into)?;
        let offset = tree.merge(other);
        let merge = Merge {
            absorbed,
            into,
            offset,
        };

        let (parent, child) = (merge.remap(parent), merge.remap(child));
        tree.add_child(parent.group, child.group);
        Some(merge)
    }

    /// Build the forest for a set of peptides. Accessions are collected
    /// from the PSMs of each peptide and merged by identifier.
    pub fn build<I>(peptides: I) -> Self
    where
        I: IntoIterator<Item = Arc<Peptide>>,
    {
        let time = Instant::now();
        let peptides = peptides.into_iter().collect::<Vec<_>>();

        let mut merged: FnvHashMap<String, Accession> = FnvHashMap::default();
        let peptide_accessions = peptides
            .iter()
            .map(|peptide| {
                let mut ids = Vec::new();
                for accession in peptide.psms().iter().flat_map(|psm| psm.accessions.iter()) {
                    merged
                        .entry(accession.accession.clone())
                        .and_modify(|acc| acc.merge(accession))
                        .or_insert_with(|| accession.as_ref().clone());
                    ids.push(accession.accession.clone());
                }
                ids.sort();
                ids.dedup();
                if ids.is_empty() {
                    warn!(
                        "peptide {} ({}) has no accessions, it will not be part of the graph",
                        peptide.id, peptide.sequence
                    );
                }
                ids
            })
            .collect::<Vec<_>>();

        let accessions = merged
            .into_iter()
            .map(|(id, acc)| (id, Arc::new(acc)))
            .collect::<FnvHashMap<_, _>>();

        let clusters = clusters(&peptide_accessions);
        info!(
            "- found {} clusters for {} peptides and {} accessions in {}ms",
            clusters.len(),
            peptides.len(),
            accessions.len(),
            time.elapsed().as_millis()
        );

        let trees = clusters
            .into_par_iter()
            .enumerate()
            .map(|(ix, cluster)| {
                build_tree(
                    TreeId(ix as u64 + 1),
                    &cluster,
                    &peptide_accessions,
                    &peptides,
                    &accessions,
                )
            })
            .collect::<Vec<_>>();

        info!(
            "built inference forest with {} trees and {} groups in {}ms",
            trees.len(),
            trees.iter().map(InferenceTree::len).sum::<usize>(),
            time.elapsed().as_millis()
        );

        Self {
            trees: trees.into_iter().map(|tree| (tree.id(), tree)).collect(),
        }
    }
}

/// Connected components of the peptide/accession relation, as sorted lists
/// of peptide indices. Components are ordered by their smallest accession.
fn clusters(peptide_accessions: &[Vec<String>]) -> Vec<Vec<usize>> {
    let mut accession_peptides: FnvHashMap<&str, Vec<usize>> = FnvHashMap::default();
    for (ix, ids) in peptide_accessions.iter().enumerate() {
        for id in ids {
            accession_peptides.entry(id.as_str()).or_default().push(ix);
        }
    }

    let mut visited = vec![false; peptide_accessions.len()];
    let mut clusters = Vec::new();
    for start in 0..peptide_accessions.len() {
        if visited[start] || peptide_accessions[start].is_empty() {
            continue;
        }
        visited[start] = true;
        let mut cluster = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(ix) = queue.pop_front() {
            cluster.push(ix);
            for id in &peptide_accessions[ix] {
                for &next in &accession_peptides[id.as_str()] {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        cluster.sort_unstable();
        clusters.push(cluster);
    }

    clusters.sort_by_cached_key(|cluster| {
        cluster
            .iter()
            .filter_map(|&ix| peptide_accessions[ix].first())
            .min()
            .cloned()
    });
    clusters
}

/// `a ⊆ b`, for sorted slices
fn is_subset<T: Ord>(a: &[T], b: &[T]) -> bool {
    let mut b = b.iter();
    a.iter().all(|x| b.any(|y| y == x))
}

#[derive(Default)]
struct Node<'a> {
    direct: Vec<&'a str>,
    peptides: Vec<usize>,
}

fn build_tree(
    id: TreeId,
    cluster: &[usize],
    peptide_accessions: &[Vec<String>],
    peptides: &[Arc<Peptide>],
    accessions: &FnvHashMap<String, Arc<Accession>>,
) -> InferenceTree {
    // Peptides explained by each accession (sorted, since `cluster` is)
    let mut coverage: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for &ix in cluster {
        for acc in &peptide_accessions[ix] {
            coverage.entry(acc.as_str()).or_default().push(ix);
        }
    }

    // Accessions with identical peptide evidence
    let mut classes: BTreeMap<&[usize], Vec<&str>> = BTreeMap::new();
    for (acc, peps) in &coverage {
        classes.entry(peps.as_slice()).or_default().push(acc);
    }

    // Every group is identified by its transitive accession set
    let mut nodes: BTreeMap<Vec<&str>, Node> = BTreeMap::new();
    for (peps, accs) in &classes {
        let all = classes
            .iter()
            .filter(|(other, _)| is_subset::<usize>(peps, other))
            .flat_map(|(_, accs)| accs.iter().copied())
            .sorted()
            .collect::<Vec<_>>();
        nodes.entry(all).or_default().direct.extend(accs);
    }
    for &ix in cluster {
        let all = peptide_accessions[ix]
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        nodes.entry(all).or_default().peptides.push(ix);
    }

    let keys = nodes
        .keys()
        .sorted_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .collect::<Vec<_>>();

    let mut tree = InferenceTree::new(id);
    for ix in 0..keys.len() {
        tree.insert_group(Group::new(GroupId(ix as u64 + 1)));
    }

    // Transitive reduction of strict inclusion; keys are ordered by size,
    // so only lower indices can be ancestors
    for child in 0..keys.len() {
        let below = (0..child)
            .filter(|&ix| {
                keys[ix].len() < keys[child].len() && is_subset::<&str>(keys[ix], keys[child])
            })
            .collect::<Vec<_>>();
        for &parent in &below {
            let covered = below.iter().any(|&other| {
                keys[parent].len() < keys[other].len() && is_subset::<&str>(keys[parent], keys[other])
            });
            if !covered {
                tree.add_child(GroupId(parent as u64 + 1), GroupId(child as u64 + 1));
            }
        }
    }

    for (ix, key) in keys.iter().enumerate() {
        let group = GroupId(ix as u64 + 1);
        let node = &nodes[*key];
        for &pep in &node.peptides {
            tree.add_peptide(group, peptides[pep].clone());
        }
        for acc in &node.direct {
            tree.add_accession(group, accessions[*acc].clone());
        }
    }
    tree
}
