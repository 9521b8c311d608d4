use std::collections::HashMap;

use crate::prelude::*;
use crate::search::canonical::{CanonicalKey, NodeKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreTypes {
    /// Score is the exact evaluation [alpha < score < beta]
    Exact,
    /// Score is at least this value, i.e, beta cutoff [score >= beta]
    LowerBound,
    /// Score is at most this value, i.e, alpha not improved [score <= alpha]
    UpperBound,
}

/// Table key: the canonical grid, plus the frozen score when stored values
/// are not relative to it
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct TableKey {
    pub canonical: CanonicalKey,
    pub frozen_score: Option<i32>,
}

/// Stored result. `best_move` is in key coordinates, see [`SearchMemory`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TranspositionEntry {
    pub depth: u16,
    pub score: f64,
    pub score_type: ScoreTypes,
    pub best_move: Option<Move>,
    /// Some leaf below was cut off by depth rather than the end of the game
    pub horizon_dependent: bool,
}

/// Result of a successful lookup, translated back to the probing board
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TTHit {
    pub depth: u16,
    pub value: f64,
    pub score_type: ScoreTypes,
    pub best_move: Option<Move>,
    pub horizon_dependent: bool,
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<TableKey, TranspositionEntry>,
    capacity: Option<usize>,
    refused: u64,
}

impl TranspositionTable {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            refused: 0,
        }
    }

    /// Entry for `key` if it was searched at least `min_depth` deep
    pub fn probe(&self, key: &TableKey, min_depth: u16) -> Option<&TranspositionEntry> {
        self.entries
            .get(key)
            .filter(|entry| entry.depth >= min_depth)
    }

    /// Depth-preferred replacement: a shallower result never overwrites a
    /// deeper one. Returns whether the entry was written.
    pub fn store(&mut self, key: TableKey, new_entry: TranspositionEntry) -> bool {
        if let Some(entry) = self.entries.get_mut(&key) {
            if new_entry.depth >= entry.depth {
                *entry = new_entry;
                return true;
            }
            return false;
        }

        if self.capacity.is_some_and(|cap| self.entries.len() >= cap) {
            self.refused += 1;
            return false;
        }
        self.entries.insert(key, new_entry);
        true
    }

    pub fn get(&self, key: &TableKey) -> Option<&TranspositionEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New keys turned away because the table was full
    pub fn refused(&self) -> u64 {
        self.refused
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.refused = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableKey, &TranspositionEntry)> {
        self.entries.iter()
    }
}

/// A key stored in both role tables
#[derive(Debug, Clone, PartialEq)]
pub struct RoleOverlap {
    pub key: TableKey,
    pub max_entry: TranspositionEntry,
    pub min_entry: TranspositionEntry,
}

impl RoleOverlap {
    /// Both entries are exact, searched equally deep, and still disagree
    pub fn is_conflicting(&self) -> bool {
        self.max_entry.score_type == ScoreTypes::Exact
            && self.min_entry.score_type == ScoreTypes::Exact
            && self.max_entry.depth == self.min_entry.depth
            && self.max_entry.score != self.min_entry.score
    }
}

/// Memoized search results, one table per [`Role`].
///
/// Values are raw minimax values and are never compared across roles: the
/// same position with the agent to move and with the opponent to move are
/// different nodes. [`SearchMemory::cross_role_overlaps`] reports keys that
/// ended up in both tables.
///
/// Positions are keyed by their cleaned, canonical grid. Two boards sharing a
/// grid may differ in frozen material. With `frozen_relative` set, scores are
/// stored minus the frozen score of the storing board and the probing board's
/// frozen score is added back on lookup. Without it the frozen score joins
/// the key and scores are stored unchanged, see
/// [`Evaluator::frozen_relative`]. Moves are stored in key coordinates.
///
/// Tables only grow until [`SearchMemory::reset`], unless a capacity is set.
#[derive(Debug, Default)]
pub struct SearchMemory {
    max_table: TranspositionTable,
    min_table: TranspositionTable,
    frozen_relative: bool,
}

impl SearchMemory {
    pub fn new(capacity: Option<usize>, frozen_relative: bool) -> Self {
        Self {
            max_table: TranspositionTable::new(capacity),
            min_table: TranspositionTable::new(capacity),
            frozen_relative,
        }
    }

    pub fn is_frozen_relative(&self) -> bool {
        self.frozen_relative
    }

    fn table_key(&self, node: &NodeKey) -> TableKey {
        TableKey {
            canonical: node.key.clone(),
            frozen_score: (!self.frozen_relative).then_some(node.frozen_score),
        }
    }

    /// Part of a value carried by the key rather than the entry
    fn offset(&self, node: &NodeKey) -> f64 {
        if self.frozen_relative {
            node.frozen_score as f64
        } else {
            0.0
        }
    }

    #[inline(always)]
    pub fn table(&self, role: Role) -> &TranspositionTable {
        match role {
            Role::Max => &self.max_table,
            Role::Min => &self.min_table,
        }
    }

    #[inline(always)]
    fn table_mut(&mut self, role: Role) -> &mut TranspositionTable {
        match role {
            Role::Max => &mut self.max_table,
            Role::Min => &mut self.min_table,
        }
    }

    pub fn probe(&self, node: &NodeKey, min_depth: u16, role: Role) -> Option<TTHit> {
        self.table(role)
            .probe(&self.table_key(node), min_depth)
            .map(|entry| TTHit {
                depth: entry.depth,
                value: entry.score + self.offset(node),
                score_type: entry.score_type,
                best_move: entry.best_move.map(|mv| node.from_canonical(mv)),
                horizon_dependent: entry.horizon_dependent,
            })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        node: &NodeKey,
        depth: u16,
        value: f64,
        score_type: ScoreTypes,
        best_move: Option<Move>,
        horizon_dependent: bool,
        role: Role,
    ) -> bool {
        let entry = TranspositionEntry {
            depth,
            score: value - self.offset(node),
            score_type,
            best_move: best_move.map(|mv| node.to_canonical(mv)),
            horizon_dependent,
        };
        let key = self.table_key(node);
        self.table_mut(role).store(key, entry)
    }

    /// Looks `board` up, computing its key
    pub fn lookup<B: GameBoard>(&self, board: &B, min_depth: u16, role: Role) -> Option<TTHit> {
        self.probe(&NodeKey::of(board), min_depth, role)
    }

    /// Stores an exact result for `board`, computing its key. The value is
    /// not known to be solved.
    pub fn store_board<B: GameBoard>(
        &mut self,
        board: &B,
        depth: u16,
        value: f64,
        best_move: Option<Move>,
        role: Role,
    ) -> bool {
        self.store(
            &NodeKey::of(board),
            depth,
            value,
            ScoreTypes::Exact,
            best_move,
            true,
            role,
        )
    }

    pub fn len(&self, role: Role) -> usize {
        self.table(role).len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_table.is_empty() && self.min_table.is_empty()
    }

    /// Forget everything, e.g. at the start of a new game
    pub fn reset(&mut self) {
        self.max_table.clear();
        self.min_table.clear();
    }

    /// Keys present in both role tables
    pub fn cross_role_overlaps(&self) -> Vec<RoleOverlap> {
        self.max_table
            .iter()
            .filter_map(|(key, max_entry)| {
                self.min_table.get(key).map(|min_entry| RoleOverlap {
                    key: key.clone(),
                    max_entry: *max_entry,
                    min_entry: *min_entry,
                })
            })
            .collect()
    }
}
