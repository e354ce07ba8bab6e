//! Teacher profiles and their weekly slot grids.
//!
//! A teacher owns a weekly grid of bookable time slots keyed by
//! `(day_of_week, time_range)`, giving O(1) lookup during booking. Slots are
//! never deleted out from under a booking: grid edits merge, keeping every
//! booked slot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::student::StudentId;
use super::time::{slot_key_order, SlotKey};

/// Teacher identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeacherId(pub i64);

impl TeacherId {
    pub fn new(v: i64) -> Self {
        Self(v)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TeacherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TeacherId {
    fn from(v: i64) -> Self {
        TeacherId(v)
    }
}

/// One bookable slot in a teacher's weekly grid.
///
/// Invariant: `is_booked == false ⇒ booked_by == None` and
/// `is_booked == true ⇒ booked_by != None`. A slot violating this is
/// considered inconsistent and is reset by [`Teacher::repair_slot_grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherSlot {
    pub day_of_week: super::time::DayOfWeek,
    pub time_range: super::time::TimeRange,
    pub is_booked: bool,
    pub booked_by: Option<StudentId>,
}

impl TeacherSlot {
    /// Create a free slot for the given grid position.
    pub fn free(key: SlotKey) -> Self {
        Self {
            day_of_week: key.0,
            time_range: key.1,
            is_booked: false,
            booked_by: None,
        }
    }

    /// Grid key of this slot.
    pub fn key(&self) -> SlotKey {
        (self.day_of_week, self.time_range)
    }

    /// Whether the booked/booked_by pair is self-consistent.
    pub fn is_consistent(&self) -> bool {
        self.is_booked == self.booked_by.is_some()
    }
}

/// Per-period counters for a teacher, zeroed by the settlement engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherCounters {
    pub sessions_this_period: u32,
    pub absences_this_period: u32,
    pub earnings_this_period: f64,
}

/// A teacher profile with its weekly slot grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    /// What the teacher earns per attended session.
    pub session_rate: f64,
    /// Weekly grid keyed by `(day_of_week, time_range)`. Serialized as a
    /// sorted list (JSON maps require string keys).
    #[serde(
        serialize_with = "serialize_slot_grid",
        deserialize_with = "deserialize_slot_grid"
    )]
    pub slots: HashMap<SlotKey, TeacherSlot>,
    #[serde(default)]
    pub counters: TeacherCounters,
}

fn serialize_slot_grid<S: serde::Serializer>(
    slots: &HashMap<SlotKey, TeacherSlot>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut sorted: Vec<&TeacherSlot> = slots.values().collect();
    sorted.sort_by(|a, b| slot_key_order(&a.key(), &b.key()));
    serde::Serialize::serialize(&sorted, serializer)
}

fn deserialize_slot_grid<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<HashMap<SlotKey, TeacherSlot>, D::Error> {
    let listed: Vec<TeacherSlot> = serde::Deserialize::deserialize(deserializer)?;
    Ok(listed.into_iter().map(|s| (s.key(), s)).collect())
}

impl Teacher {
    /// Create a teacher with an all-free grid at the given positions.
    pub fn new(id: TeacherId, name: impl Into<String>, session_rate: f64, grid: &[SlotKey]) -> Self {
        let slots = grid
            .iter()
            .map(|key| (*key, TeacherSlot::free(*key)))
            .collect();
        Self {
            id,
            name: name.into(),
            session_rate,
            slots,
            counters: TeacherCounters::default(),
        }
    }

    /// Look up a slot by its grid key.
    pub fn find_slot(&self, key: &SlotKey) -> Option<&TeacherSlot> {
        self.slots.get(key)
    }

    /// Free slots, sorted by `(day index, start minutes)`.
    pub fn free_slots(&self) -> Vec<TeacherSlot> {
        let mut free: Vec<TeacherSlot> = self
            .slots
            .values()
            .filter(|s| !s.is_booked)
            .cloned()
            .collect();
        free.sort_by(|a, b| slot_key_order(&a.key(), &b.key()));
        free
    }

    /// Slots currently booked by the given student, sorted.
    pub fn slots_booked_by(&self, student_id: StudentId) -> Vec<SlotKey> {
        let mut keys: Vec<SlotKey> = self
            .slots
            .values()
            .filter(|s| s.booked_by == Some(student_id))
            .map(|s| s.key())
            .collect();
        keys.sort_by(slot_key_order);
        keys
    }

    /// Merge a new grid into this teacher's slots.
    ///
    /// New positions are added as free slots. Free slots absent from the new
    /// grid are dropped. Booked slots are always retained, whether or not the
    /// new grid lists them.
    pub fn merge_grid(&mut self, new_grid: &[SlotKey]) {
        let keep: std::collections::HashSet<SlotKey> = new_grid.iter().copied().collect();
        self.slots
            .retain(|key, slot| slot.is_booked || keep.contains(key));
        for key in new_grid {
            self.slots.entry(*key).or_insert_with(|| TeacherSlot::free(*key));
        }
    }

    /// Reset any slot whose booked/booked_by pair is inconsistent to free.
    ///
    /// Returns the keys that were repaired.
    pub fn repair_slot_grid(&mut self) -> Vec<SlotKey> {
        let mut repaired = Vec::new();
        for slot in self.slots.values_mut() {
            if !slot.is_consistent() {
                slot.is_booked = false;
                slot.booked_by = None;
                repaired.push(slot.key());
            }
        }
        repaired.sort_by(slot_key_order);
        repaired
    }
}
