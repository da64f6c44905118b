// Path: crates/trifair-types/src/grid.rs
//! Symbol grid and reel-position output shapes (§3 Symbol Grid, §4.4).

use serde::{Deserialize, Serialize};

/// An opaque symbol name. The mapper never interprets these beyond
/// equality and the reserved `wild` / `bonus` names; everything else is
/// policy carried in [`crate::config::GameConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub const WILD: &'static str = "wild";
    pub const BONUS: &'static str = "bonus";
    pub const GOLD_SUFFIX: &'static str = "_gold";

    pub fn wild() -> Self {
        Symbol(Self::WILD.to_string())
    }

    pub fn bonus() -> Self {
        Symbol(Self::BONUS.to_string())
    }

    pub fn gilded(base: &str) -> Self {
        Symbol(format!("{base}{}", Self::GOLD_SUFFIX))
    }

    pub fn is_wild(&self) -> bool {
        self.0 == Self::WILD
    }

    pub fn is_bonus(&self) -> bool {
        self.0 == Self::BONUS
    }
}

/// `grid[column][row]`, addressed column-major per §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolGrid {
    pub columns: Vec<Vec<Symbol>>,
}

impl SymbolGrid {
    pub fn new(reel_count: usize, rows: usize) -> Self {
        Self {
            columns: vec![Vec::with_capacity(rows); reel_count],
        }
    }

    pub fn reel_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&Symbol> {
        self.columns.get(column)?.get(row)
    }
}

/// Output of the alternative reel-position mapping mode: one integer per reel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelPositions {
    pub positions: Vec<u32>,
}
