use crate::stage::{Position, Stage};
use ahash::AHashMap;

pub const GRID_COLUMNS: usize = 4;
pub const GRID_ORIGIN: f64 = 100.0;
pub const COLUMN_WIDTH: f64 = 300.0;
pub const ROW_HEIGHT: f64 = 200.0;

/// The default placement grid for stages without a stored position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub column_width: f64,
    pub row_height: f64,
    pub origin: Position,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: GRID_COLUMNS,
            column_width: COLUMN_WIDTH,
            row_height: ROW_HEIGHT,
            origin: Position::new(GRID_ORIGIN, GRID_ORIGIN),
        }
    }
}

impl GridLayout {
    /// Grid slot of the `index`-th node, filled row by row.
    pub fn position_for(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        Position {
            x: self.origin.x + (index % columns) as f64 * self.column_width,
            y: self.origin.y + (index / columns) as f64 * self.row_height,
        }
    }

    /// Re-places every stage on the grid following `node_order`, the order of the
    /// nodes currently on screen. Stages missing from `node_order` follow in their
    /// list order.
    pub fn arrange(&self, stages: &[Stage], node_order: &[String]) -> Vec<Stage> {
        let mut slots: AHashMap<&str, usize> = AHashMap::new();
        for id in node_order {
            if stages.iter().any(|s| &s.id == id) && !slots.contains_key(id.as_str()) {
                slots.insert(id.as_str(), slots.len());
            }
        }
        let mut next = slots.len();

        stages
            .iter()
            .map(|stage| {
                let slot = slots.get(stage.id.as_str()).copied().unwrap_or_else(|| {
                    next += 1;
                    next - 1
                });
                Stage {
                    position: Some(self.position_for(slot)),
                    ..stage.clone()
                }
            })
            .collect()
    }
}
