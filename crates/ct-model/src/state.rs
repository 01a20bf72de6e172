use ct_ir::types::{PVPair, ParamId, ValueId};

/// What the search engine put in one parameter's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Value(ValueId),
    /// The parameter is deliberately left as don't-care.
    Invalid,
}

/// Current (possibly partial) choice of value ids, indexed by parameter id.
///
/// Built cheaply and thrown away after each evaluation; evaluation only
/// ever borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Assignment {
    slots: Vec<Option<Slot>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[PVPair]) -> Self {
        let mut assignment = Self::new();
        for pair in pairs {
            assignment.set(pair.pid, Slot::Value(pair.vid));
        }
        assignment
    }

    pub fn with(mut self, pid: ParamId, vid: ValueId) -> Self {
        self.set(pid, Slot::Value(vid));
        self
    }

    pub fn with_invalid(mut self, pid: ParamId) -> Self {
        self.set(pid, Slot::Invalid);
        self
    }

    pub fn set(&mut self, pid: ParamId, slot: Slot) {
        if pid >= self.slots.len() {
            self.slots.resize(pid + 1, None);
        }
        self.slots[pid] = Some(slot);
    }

    pub fn unset(&mut self, pid: ParamId) {
        if let Some(slot) = self.slots.get_mut(pid) {
            *slot = None;
        }
    }

    /// `None` while the parameter is unassigned.
    pub fn get(&self, pid: ParamId) -> Option<Slot> {
        self.slots.get(pid).copied().flatten()
    }

    pub fn value_id(&self, pid: ParamId) -> Option<ValueId> {
        match self.get(pid)? {
            Slot::Value(vid) => Some(vid),
            Slot::Invalid => None,
        }
    }

    /// Whether the assignment realizes every pair.
    pub fn realizes(&self, pairs: &[PVPair]) -> bool {
        pairs.iter().all(|p| self.value_id(p.pid) == Some(p.vid))
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
