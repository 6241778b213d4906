//! Congruence-closure service used by the equality-closure rewrite.
//!
//! The rewrite strategy only needs two operations: feed the literals of a
//! cube, and read back a canonical literal set carrying the same
//! equivalence information. [`UfGraph`] is the in-crate implementation, a
//! union-find over hash-consed terms; an engine embedding this crate can
//! plug its own egraph through the [`EqGraph`] trait instead.

use crate::common::*;

/// Equality saturation over the literals of a cube.
pub trait EqGraph {
    /// Feeds some literals to the graph.
    fn add_lits(&mut self, lits: &[Term]);
    /// Canonical literal set for the literals fed so far.
    ///
    /// With `expose_all_eqs`, every derived equality appears in the
    /// result; otherwise one spanning equality per equivalence class
    /// member. The result is logically equivalent to the input literals.
    fn to_lits(&mut self, expose_all_eqs: bool) -> Vec<Term>;
}

/// Union-find based equality saturation.
#[derive(Debug, Clone, Default)]
pub struct UfGraph {
    /// Parent pointers.
    parent: TermMap<Term>,
    /// Insertion index of each node, used to pick representatives
    /// deterministically (first-seen member wins).
    index: TermMap<usize>,
    /// Nodes in insertion order.
    members: Vec<Term>,
    /// Non-equality literals, in insertion order.
    others: Vec<Term>,
}

impl UfGraph {
    /// Constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node.
    fn add_node(&mut self, term: &Term) {
        if !self.parent.contains_key(term) {
            self.parent.insert(term.clone(), term.clone());
            self.index.insert(term.clone(), self.members.len());
            self.members.push(term.clone())
        }
    }

    /// Representative of a node, with path compression.
    fn find(&mut self, term: &Term) -> Term {
        let mut current = term.clone();
        let mut path = vec![];
        loop {
            let parent = match self.parent.get(&current) {
                Some(parent) => parent.clone(),
                // Not a node, its own representative.
                None => break,
            };
            if parent == current {
                break;
            }
            path.push(current);
            current = parent
        }
        for node in path {
            self.parent.insert(node, current.clone());
        }
        current
    }

    /// Merges the classes of two nodes.
    ///
    /// The earliest-inserted representative wins.
    fn union(&mut self, lhs: &Term, rhs: &Term) {
        let l_root = self.find(lhs);
        let r_root = self.find(rhs);
        if l_root == r_root {
            return;
        }
        let l_idx = self.index.get(&l_root).cloned().unwrap_or(usize::MAX);
        let r_idx = self.index.get(&r_root).cloned().unwrap_or(usize::MAX);
        if l_idx <= r_idx {
            self.parent.insert(r_root, l_root);
        } else {
            self.parent.insert(l_root, r_root);
        }
    }
}

impl EqGraph for UfGraph {
    fn add_lits(&mut self, lits: &[Term]) {
        for lit in lits {
            if let Some((lhs, rhs)) = lit.eq_inspect() {
                let (lhs, rhs) = (lhs.clone(), rhs.clone());
                self.add_node(&lhs);
                self.add_node(&rhs);
                self.union(&lhs, &rhs)
            } else {
                self.others.push(lit.clone())
            }
        }
    }

    fn to_lits(&mut self, expose_all_eqs: bool) -> Vec<Term> {
        // Equivalence classes in insertion order of their representative.
        let mut classes: Vec<(Term, Vec<Term>)> = vec![];
        let members = self.members.clone();
        for node in &members {
            let root = self.find(node);
            if let Some(&mut (_, ref mut class)) =
                classes.iter_mut().find(|&&mut (ref r, _)| r == &root)
            {
                class.push(node.clone())
            } else {
                classes.push((root, vec![node.clone()]))
            }
        }

        // Representative substitution for the non-equality literals.
        let mut map = TermMap::new();
        for &(ref root, ref class) in &classes {
            for node in class {
                if node != root {
                    map.insert(node.clone(), root.clone());
                }
            }
        }

        let mut lits: Vec<Term> = self
            .others
            .iter()
            .map(|lit| term::subst(lit, &map))
            .collect();

        for &(_, ref class) in &classes {
            if class.len() < 2 {
                continue;
            }
            if expose_all_eqs {
                for i in 0..class.len() {
                    for j in i + 1..class.len() {
                        lits.push(term::eq(class[i].clone(), class[j].clone()))
                    }
                }
            } else {
                for node in &class[1..] {
                    lits.push(term::eq(class[0].clone(), node.clone()))
                }
            }
        }

        lits
    }
}
