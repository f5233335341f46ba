//! Keyed container whose entries each live over a time interval `[alive, dead)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::time::SimTime;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedEntry<V> {
    pub alive: SimTime,
    pub dead: SimTime,
    pub value: V,
}

impl<V> TimedEntry<V> {
    #[inline]
    pub fn is_alive(&self, t: SimTime) -> bool {
        self.alive <= t && t < self.dead
    }
}

/// Entities that appear and disappear over simulation time.
///
/// Iteration is in key order so that callers stay deterministic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimedMap<K: Ord, V> {
    entries: BTreeMap<K, TimedEntry<V>>,
}

impl<K: Ord, V> Default for TimedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> TimedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Alive from `alive` on, never dies. Replaces any previous entry for `key`.
    pub fn insert(&mut self, alive: SimTime, key: K, value: V) -> Option<TimedEntry<V>> {
        self.insert_between(alive, SimTime::MAX, key, value)
    }

    pub fn insert_between(
        &mut self,
        alive: SimTime,
        dead: SimTime,
        key: K,
        value: V,
    ) -> Option<TimedEntry<V>> {
        self.entries.insert(key, TimedEntry { alive, dead, value })
    }

    /// The value for `key` if it is alive at `t`.
    pub fn at(&self, t: SimTime, key: &K) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|e| e.is_alive(t))
            .map(|e| &e.value)
    }

    pub fn at_mut(&mut self, t: SimTime, key: &K) -> Option<&mut V> {
        self.entries
            .get_mut(key)
            .filter(|e| e.is_alive(t))
            .map(|e| &mut e.value)
    }

    pub fn contains(&self, t: SimTime, key: &K) -> bool {
        self.at(t, key).is_some()
    }

    pub fn entry(&self, key: &K) -> Option<&TimedEntry<V>> {
        self.entries.get(key)
    }

    /// Ends the lifetime of `key` at `t`. Returns false for unknown keys.
    pub fn kill(&mut self, t: SimTime, key: &K) -> bool {
        match self.entries.get_mut(key) {
            Some(e) => {
                e.dead = t;
                true
            }
            None => false,
        }
    }

    /// Moves the start of the lifetime of `key` to `t`.
    pub fn birth(&mut self, t: SimTime, key: &K) -> bool {
        match self.entries.get_mut(key) {
            Some(e) => {
                e.alive = t;
                true
            }
            None => false,
        }
    }

    /// Entries alive at `t`, in key order.
    pub fn iter_at(&self, t: SimTime) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries
            .iter()
            .filter(move |(_, e)| e.is_alive(t))
            .map(|(k, e)| (k, &e.value))
    }

    /// Entries alive at some point of `[from, to]`.
    pub fn between(&self, from: SimTime, to: SimTime) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries
            .iter()
            .filter(move |(_, e)| e.alive <= to && e.dead > from)
            .map(|(k, e)| (k, &e.value))
    }

    /// Forgets every entry that is dead at or before `t`. Returns how many.
    pub fn clean(&mut self, t: SimTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.dead > t);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: i64) -> SimTime {
        SimTime::from_int(secs)
    }

    #[test]
    fn lifetimes() {
        let mut map: TimedMap<u32, &str> = TimedMap::new();
        map.insert(t(1), 7, "ball");
        map.insert_between(t(0), t(5), 3, "paddle");

        assert!(map.at(t(0), &7).is_none());
        assert_eq!(map.at(t(1), &7), Some(&"ball"));
        assert!(map.contains(t(4), &3));
        assert!(!map.contains(t(5), &3));

        let alive: Vec<_> = map.iter_at(t(2)).map(|(k, _)| *k).collect();
        assert_eq!(alive, vec![3, 7]);

        map.kill(t(3), &7);
        assert!(!map.contains(t(3), &7));
        let ranged: Vec<_> = map.between(t(6), t(8)).collect();
        assert!(ranged.is_empty());
        let ranged: Vec<_> = map.between(t(2), t(8)).map(|(k, _)| *k).collect();
        assert_eq!(ranged, vec![3, 7]);

        assert_eq!(map.clean(t(4)), 1);
        assert_eq!(map.len(), 1);
        assert!(map.birth(t(-1), &3));
        assert!(map.contains(t(-1), &3));
        assert!(!map.kill(t(0), &99));
    }
}
