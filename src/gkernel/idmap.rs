//! Labels of nodes are integers. We need a map from what defines a label to its integer.
//!
//! At round 0 a label is defined by the raw attribute vector of a node, in the following rounds
//! by the previous label of the node together with the sorted labels of its incoming neighbours.
//! Both kinds of keys go in the same dictionary, tagged by the variant of [LabelKey] so that they never collide.
//!
//! Ids are allocated from 0, in order of first appearance, and are never removed or reassigned.
//!
//! When a raw key gets a new id l, the refined key (l, \[\]) is registered as an alias of l.
//! So a node without incoming edge keeps its round 0 label in round 1. Aliases do not consume ids.

use indexmap::IndexMap;

/// integer label of a node
pub type NodeLabel = usize;

/// What defines a label.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum LabelKey {
    /// bit patterns of the attributes of a node
    Raw(Vec<u64>),
    /// previous label and sorted labels of incoming neighbours
    Refined(NodeLabel, Vec<NodeLabel>),
} // end of LabelKey


impl LabelKey {
    /// Attributes are compared as exact values : 0. and -0. give the same key, all NaN give the same key.
    pub fn from_attributes<'a, I>(attributes: I) -> Self
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let bits = attributes
            .into_iter()
            .map(|&x| {
                if x.is_nan() {
                    f64::NAN.to_bits()
                } else if x == 0. {
                    0f64.to_bits()
                } else {
                    x.to_bits()
                }
            })
            .collect();
        LabelKey::Raw(bits)
    }

    /// neighbours must be sorted
    pub fn refined(label: NodeLabel, neighbours: Vec<NodeLabel>) -> Self {
        debug_assert!(neighbours.windows(2).all(|w| w[0] <= w[1]));
        LabelKey::Refined(label, neighbours)
    }
} // end of impl LabelKey


/// The interning service mapping a [LabelKey] to its label.
#[derive(Clone, Debug, Default)]
pub struct LabelDictionary {
    /// keys in order of insertion, aliases included
    ids: IndexMap<LabelKey, NodeLabel, ahash::RandomState>,
    /// next label to allocate
    nb_labels: usize,
} // end of LabelDictionary


impl LabelDictionary {
    pub fn new() -> Self {
        LabelDictionary::default()
    }

    /// returns the label of key, allocating the next one if key was never seen
    pub fn intern(&mut self, key: LabelKey) -> NodeLabel {
        let next = self.nb_labels;
        let label = *self.ids.entry(key).or_insert(next);
        if label == next {
            self.nb_labels += 1;
        }
        label
    } // end of intern

    /// label of a round 0 node. Registers the alias (l, []) -> l for a new label l.
    pub fn intern_raw<'a, I>(&mut self, attributes: I) -> NodeLabel
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let before = self.nb_labels;
        let label = self.intern(LabelKey::from_attributes(attributes));
        if label == before {
            self.ids.entry(LabelKey::Refined(label, Vec::new())).or_insert(label);
        }
        label
    } // end of intern_raw

    /// returns label of key if already interned
    pub fn get(&self, key: &LabelKey) -> Option<NodeLabel> {
        self.ids.get(key).copied()
    }

    /// number of labels allocated up to now. All labels are < nb_labels
    pub fn get_nb_labels(&self) -> usize {
        self.nb_labels
    }

    /// number of keys stored, aliases included
    pub fn get_nb_keys(&self) -> usize {
        self.ids.len()
    }
} // end of impl LabelDictionary


#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_intern_stable() {
        log_init_test();
        //
        let mut dict = LabelDictionary::new();
        let a = dict.intern(LabelKey::refined(3, vec![1, 2]));
        let b = dict.intern(LabelKey::refined(3, vec![1, 1]));
        let c = dict.intern(LabelKey::refined(3, vec![1, 2]));
        assert_eq!((a, b, c), (0, 1, 0));
        assert_eq!(dict.get_nb_labels(), 2);
        assert_eq!(dict.get(&LabelKey::refined(3, vec![1, 1])), Some(1));
        assert_eq!(dict.get(&LabelKey::refined(4, vec![])), None);
    } // end of test_intern_stable

    #[test]
    fn test_raw_and_refined_do_not_collide() {
        log_init_test();
        //
        let mut dict = LabelDictionary::new();
        // a raw key whose bits look like small integers
        let raw = [f64::from_bits(0), f64::from_bits(1)];
        let l0 = dict.intern_raw(raw.iter());
        let l1 = dict.intern(LabelKey::refined(0, vec![1]));
        assert_ne!(l0, l1);
        assert_eq!(dict.get_nb_labels(), 2);
    } // end of test_raw_and_refined_do_not_collide

    #[test]
    fn test_raw_alias() {
        log_init_test();
        //
        let mut dict = LabelDictionary::new();
        let l0 = dict.intern_raw([1., 2.].iter());
        let l1 = dict.intern_raw([2., 1.].iter());
        let again = dict.intern_raw([1., 2.].iter());
        assert_eq!((l0, l1, again), (0, 1, 0));
        // aliases do not consume labels
        assert_eq!(dict.get_nb_labels(), 2);
        assert_eq!(dict.get_nb_keys(), 4);
        // an isolated node keeps its label
        assert_eq!(dict.intern(LabelKey::refined(l1, vec![])), l1);
        assert_eq!(dict.get_nb_labels(), 2);
        // a new refined label has no alias
        let l2 = dict.intern(LabelKey::refined(l0, vec![l1]));
        assert_eq!(l2, 2);
        assert_eq!(dict.intern(LabelKey::refined(l2, vec![])), 3);
    } // end of test_raw_alias

    #[test]
    fn test_attribute_canonicalisation() {
        log_init_test();
        //
        let mut dict = LabelDictionary::new();
        let a = dict.intern_raw([0., f64::NAN].iter());
        let b = dict.intern_raw([-0., -f64::NAN].iter());
        assert_eq!(a, b);
        let c = dict.intern_raw([0., 1.].iter());
        assert_ne!(a, c);
    } // end of test_attribute_canonicalisation
} // end of mod tests
