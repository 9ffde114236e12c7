/// Intrusive reference lists backed by a slot map.
///
/// A `RefPool` links objects into numbered lists (bins of the spatial container,
/// zones of the zone graph). Every link is a node stored in a `SlotMap`, chained
/// twice: doubly linked inside its list, singly linked through the other nodes of
/// the same object. This gives O(1) unlink from a list and O(k) removal of an
/// object from all of its k lists, with generation-checked keys instead of raw
/// pointers.

use slotmap::{new_key_type, SecondaryMap, SlotMap};
use crate::scene::ObjectKey;

new_key_type! {
    /// Key of a single list node inside a `RefPool`.
    pub struct RefKey;
}

#[derive(Debug, Clone)]
struct RefNode {
    object: ObjectKey,
    list: u32,
    prev_in_list: Option<RefKey>,
    next_in_list: Option<RefKey>,
    next_in_object: Option<RefKey>,
}

#[derive(Debug, Default)]
pub struct RefPool {
    nodes: SlotMap<RefKey, RefNode>,
    list_heads: Vec<Option<RefKey>>,
    list_lens: Vec<usize>,
    object_heads: SecondaryMap<ObjectKey, RefKey>,
}

impl RefPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with `list_count` empty lists. Lists grow on demand when linking.
    pub fn with_lists(list_count: usize) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            list_heads: vec![None; list_count],
            list_lens: vec![0; list_count],
            object_heads: SecondaryMap::new(),
        }
    }

    fn ensure_list(&mut self, list: u32) {
        let needed = list as usize + 1;
        if self.list_heads.len() < needed {
            self.list_heads.resize(needed, None);
            self.list_lens.resize(needed, 0);
        }
    }

    /// Link `object` at the head of `list`.
    ///
    /// Linking the same object twice into one list is a caller bug.
    pub fn link(&mut self, object: ObjectKey, list: u32) -> RefKey {
        debug_assert!(!self.contains(object, list), "object already linked in list {}", list);
        self.ensure_list(list);

        let list_head = self.list_heads[list as usize];
        let object_head = self.object_heads.get(object).copied();
        let key = self.nodes.insert(RefNode {
            object,
            list,
            prev_in_list: None,
            next_in_list: list_head,
            next_in_object: object_head,
        });
        if let Some(next) = list_head {
            self.nodes[next].prev_in_list = Some(key);
        }
        self.list_heads[list as usize] = Some(key);
        self.list_lens[list as usize] += 1;
        self.object_heads.insert(object, key);
        key
    }

    /// Detach a node from its list (the object chain is left to the caller).
    fn detach_from_list(&mut self, key: RefKey) {
        let (list, prev, next) = {
            let node = &self.nodes[key];
            (node.list as usize, node.prev_in_list, node.next_in_list)
        };
        match prev {
            Some(prev) => self.nodes[prev].next_in_list = next,
            None => self.list_heads[list] = next,
        }
        if let Some(next) = next {
            self.nodes[next].prev_in_list = prev;
        }
        self.list_lens[list] -= 1;
    }

    /// Unlink `object` from every list. Returns the number of links removed.
    pub fn unlink_object(&mut self, object: ObjectKey) -> usize {
        let mut cursor = self.object_heads.remove(object);
        let mut removed = 0;
        while let Some(key) = cursor {
            self.detach_from_list(key);
            cursor = self.nodes.remove(key).and_then(|node| node.next_in_object);
            removed += 1;
        }
        removed
    }

    /// Unlink `object` from one list. Returns false when it was not linked there.
    pub fn unlink(&mut self, object: ObjectKey, list: u32) -> bool {
        let mut prev: Option<RefKey> = None;
        let mut cursor = self.object_heads.get(object).copied();
        while let Some(key) = cursor {
            let (node_list, next) = {
                let node = &self.nodes[key];
                (node.list, node.next_in_object)
            };
            if node_list == list {
                self.detach_from_list(key);
                match prev {
                    Some(prev) => self.nodes[prev].next_in_object = next,
                    None => match next {
                        Some(next) => { self.object_heads.insert(object, next); }
                        None => { self.object_heads.remove(object); }
                    },
                }
                self.nodes.remove(key);
                return true;
            }
            prev = Some(key);
            cursor = next;
        }
        false
    }

    pub fn contains(&self, object: ObjectKey, list: u32) -> bool {
        self.object_lists(object).any(|l| l == list)
    }

    /// Objects linked in `list`, most recently linked first.
    pub fn list_iter(&self, list: u32) -> impl Iterator<Item = ObjectKey> + '_ {
        let head = self.list_heads.get(list as usize).copied().flatten();
        std::iter::successors(head, move |key| self.nodes[*key].next_in_list)
            .map(move |key| self.nodes[key].object)
    }

    /// Lists `object` is linked in, most recently linked first.
    pub fn object_lists(&self, object: ObjectKey) -> impl Iterator<Item = u32> + '_ {
        let head = self.object_heads.get(object).copied();
        std::iter::successors(head, move |key| self.nodes[*key].next_in_object)
            .map(move |key| self.nodes[key].list)
    }

    pub fn list_len(&self, list: u32) -> usize {
        self.list_lens.get(list as usize).copied().unwrap_or(0)
    }

    pub fn list_count(&self) -> usize {
        self.list_heads.len()
    }

    /// Total number of live links.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
#[path = "ref_pool_tests.rs"]
mod tests;
