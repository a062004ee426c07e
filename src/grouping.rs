// Single-pass grouping over query rows.
//
// Groups come out in the order their key was first seen. Assemblers that
// need a different order sort the finished groups themselves.
use crate::value::Row;
use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

pub const HOURS_PER_DAY: usize = 24;

/// Rows sharing a key, in input order.
#[derive(Debug)]
pub struct Group<'a, K> {
    pub key: K,
    pub rows: Vec<&'a Row>,
}

/// Group `rows` by `key_fn`. An `Option` key keeps its `None` bucket.
pub fn group_by<'a, I, K, F>(rows: I, mut key_fn: F) -> Vec<Group<'a, K>>
where
    I: IntoIterator<Item = &'a Row>,
    K: Hash + Eq,
    F: FnMut(&Row) -> K,
{
    let mut map: IndexMap<K, Vec<&'a Row>> = IndexMap::new();
    for row in rows {
        map.entry(key_fn(row)).or_default().push(row);
    }
    map.into_iter()
        .map(|(key, rows)| Group { key, rows })
        .collect()
}

/// Like `group_by`, but rows without a key are dropped.
pub fn group_by_present<'a, I, K, F>(rows: I, mut key_fn: F) -> Vec<Group<'a, K>>
where
    I: IntoIterator<Item = &'a Row>,
    K: Hash + Eq,
    F: FnMut(&Row) -> Option<K>,
{
    let mut map: IndexMap<K, Vec<&'a Row>> = IndexMap::new();
    for row in rows {
        if let Some(key) = key_fn(row) {
            map.entry(key).or_default().push(row);
        }
    }
    map.into_iter()
        .map(|(key, rows)| Group { key, rows })
        .collect()
}

/// One hour of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourSlot {
    pub hour: u8,
    pub deliveries: u64,
}

/// Fold rows into 24 hourly counters. Rows with no valid hour are skipped;
/// counters saturate instead of overflowing.
pub fn fold_hours<'r, I, H, C>(rows: I, mut hour_fn: H, mut count_fn: C) -> [u64; HOURS_PER_DAY]
where
    I: IntoIterator<Item = &'r Row>,
    H: FnMut(&Row) -> Option<i64>,
    C: FnMut(&Row) -> u64,
{
    let mut slots = [0u64; HOURS_PER_DAY];
    for row in rows {
        match hour_fn(row) {
            Some(h) if (0..HOURS_PER_DAY as i64).contains(&h) => {
                let slot = &mut slots[h as usize];
                *slot = slot.saturating_add(count_fn(row));
            }
            _ => {}
        }
    }
    slots
}

/// Expand counters into all 24 slots, hour 0 first.
pub fn hour_slots(counts: &[u64; HOURS_PER_DAY]) -> Vec<HourSlot> {
    counts
        .iter()
        .enumerate()
        .map(|(hour, &deliveries)| HourSlot {
            hour: hour as u8,
            deliveries,
        })
        .collect()
}
