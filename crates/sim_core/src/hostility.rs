use ahash::AHashMap;

use crate::FactionId;

/// Square faction-by-faction table. `is_hostile(a, b)` reads row `a`.
///
/// Every faction starts hostile to every other faction and friendly to itself.
/// Ids outside the table follow the same default rule. Overrides naming such an
/// id are kept in a sparse side map, so a stray large id costs one entry.
#[derive(Debug, Clone)]
pub struct HostilityTable {
    size: usize,
    cells: Vec<bool>,
    sparse: AHashMap<(FactionId, FactionId), bool>,
    /// One past the highest id ever overridden or tabled.
    known: usize,
}

impl HostilityTable {
    pub fn new(faction_count: usize) -> Self {
        let cells = (0..faction_count * faction_count)
            .map(|i| i / faction_count != i % faction_count)
            .collect();
        Self {
            size: faction_count,
            cells,
            sparse: AHashMap::new(),
            known: faction_count,
        }
    }

    pub fn faction_count(&self) -> usize {
        self.known
    }

    pub fn is_hostile(&self, a: FactionId, b: FactionId) -> bool {
        let (ai, bi) = (a.index(), b.index());
        if ai < self.size && bi < self.size {
            return self.cells[ai * self.size + bi];
        }
        self.sparse.get(&(a, b)).copied().unwrap_or(ai != bi)
    }

    /// Override one direction of the relation, and the reverse when `mirror`.
    pub fn set(&mut self, a: FactionId, b: FactionId, hostile: bool, mirror: bool) {
        self.known = self.known.max(a.index().max(b.index()) + 1);
        self.set_one(a, b, hostile);
        if mirror {
            self.set_one(b, a, hostile);
        }
    }

    fn set_one(&mut self, a: FactionId, b: FactionId, hostile: bool) {
        let (ai, bi) = (a.index(), b.index());
        if ai < self.size && bi < self.size {
            self.cells[ai * self.size + bi] = hostile;
        } else {
            self.sparse.insert((a, b), hostile);
        }
    }
}
