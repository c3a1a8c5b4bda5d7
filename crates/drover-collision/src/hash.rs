//! Coarse bucket grid for proximity queries.

use drover_core::{Agent, Vec2};

/// 3×3 bucket scan order: row-major around the center.
const NEIGHBOURHOOD: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Spatial partitioning grid for proximity queries during collision
/// resolution.
///
/// The world is divided into square buckets of `cell_size` world units.
/// Each physical agent is inserted into the single bucket containing
/// its center; a query scans the 3×3 bucket neighbourhood, which finds
/// every possible contact as long as `cell_size` is at least twice the
/// largest agent radius.
///
/// The hash is rebuilt in full every tick ([`rebuild`](SpatialHash::rebuild)
/// clears buckets but keeps their allocations) and is exclusively owned
/// by the simulation thread — it never crosses a thread boundary and is
/// valid only within the tick that built it.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl SpatialHash {
    /// Create a hash covering a map of `map_width` × `map_height` world
    /// units with the given bucket size. Positions outside the map are
    /// clamped into the edge buckets, so every agent is always indexed.
    pub fn new(map_width: u32, map_height: u32, cell_size: f32) -> Self {
        let cols = ((map_width as f32 / cell_size).ceil() as usize).max(1);
        let rows = ((map_height as f32 / cell_size).ceil() as usize).max(1);
        Self {
            cell_size,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        }
    }

    /// Bucket size in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Bucket columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bucket rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    fn bucket_of(&self, pos: Vec2) -> (usize, usize) {
        let cx = (pos.x / self.cell_size).floor();
        let cy = (pos.y / self.cell_size).floor();
        let cx = (cx.max(0.0) as usize).min(self.cols - 1);
        let cy = (cy.max(0.0) as usize).min(self.rows - 1);
        (cx, cy)
    }

    /// Clear and repopulate from the agent slice, O(n).
    ///
    /// Bucket entries are the slice indices of physical agents;
    /// non-physical agents are skipped entirely. Within a bucket,
    /// entries keep ascending index order, so queries are
    /// deterministic.
    pub fn rebuild(&mut self, agents: &[Agent]) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        for (i, agent) in agents.iter().enumerate() {
            if !agent.physical {
                continue;
            }
            let (cx, cy) = self.bucket_of(agent.pos);
            self.buckets[cy * self.cols + cx].push(i);
        }
    }

    /// Iterate the indices of every agent whose bucket lies within the
    /// 3×3 neighbourhood of the bucket containing `pos`, in fixed scan
    /// order. The queried agent itself is included.
    pub fn neighbours(&self, pos: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.bucket_of(pos);
        NEIGHBOURHOOD.iter().flat_map(move |&(dx, dy)| {
            let x = cx as i32 + dx;
            let y = cy as i32 + dy;
            let bucket: &[usize] =
                if x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows {
                    &self.buckets[y as usize * self.cols + x as usize]
                } else {
                    &[]
                };
            bucket.iter().copied()
        })
    }

    /// Total number of indexed agents. Diagnostic.
    pub fn total_entries(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::{AgentId, FactionId, MoveClass};

    fn agent(id: u32, x: f32, y: f32) -> Agent {
        Agent::new(
            AgentId(id),
            Vec2::new(x, y),
            0.4,
            MoveClass::Ground,
            FactionId(0),
        )
    }

    // ── rebuild ─────────────────────────────────────────────────

    #[test]
    fn rebuild_indexes_physical_agents_only() {
        let mut hash = SpatialHash::new(16, 16, 2.0);
        let mut ghost = agent(2, 5.0, 5.0);
        ghost.physical = false;
        let agents = vec![agent(0, 1.0, 1.0), agent(1, 9.0, 9.0), ghost];
        hash.rebuild(&agents);
        assert_eq!(hash.total_entries(), 2);
    }

    #[test]
    fn rebuild_replaces_previous_tick() {
        let mut hash = SpatialHash::new(16, 16, 2.0);
        hash.rebuild(&[agent(0, 1.0, 1.0)]);
        hash.rebuild(&[agent(0, 15.0, 15.0)]);
        assert_eq!(hash.total_entries(), 1);
        let found: Vec<usize> = hash.neighbours(Vec2::new(15.0, 15.0)).collect();
        assert_eq!(found, vec![0]);
        assert_eq!(hash.neighbours(Vec2::new(1.0, 1.0)).count(), 0);
    }

    #[test]
    fn off_map_positions_clamp_into_edge_buckets() {
        let mut hash = SpatialHash::new(16, 16, 2.0);
        hash.rebuild(&[agent(0, -3.0, 20.0)]);
        assert_eq!(hash.total_entries(), 1);
        let found: Vec<usize> = hash.neighbours(Vec2::new(-1.0, 17.0)).collect();
        assert_eq!(found, vec![0]);
    }

    // ── queries ─────────────────────────────────────────────────

    #[test]
    fn neighbours_cover_adjacent_buckets_only() {
        let mut hash = SpatialHash::new(32, 32, 2.0);
        let agents = vec![
            agent(0, 10.0, 10.0), // same bucket as the query
            agent(1, 12.1, 10.0), // east bucket
            agent(2, 10.0, 8.1),  // north bucket
            agent(3, 20.0, 20.0), // far away
        ];
        hash.rebuild(&agents);
        let found: Vec<usize> = hash.neighbours(Vec2::new(10.0, 10.0)).collect();
        assert!(found.contains(&0));
        assert!(found.contains(&1));
        assert!(found.contains(&2));
        assert!(!found.contains(&3));
    }

    #[test]
    fn query_order_is_deterministic() {
        let mut hash = SpatialHash::new(16, 16, 2.0);
        let agents = vec![
            agent(0, 5.0, 5.0),
            agent(1, 5.1, 5.1),
            agent(2, 4.9, 5.2),
            agent(3, 5.3, 4.8),
        ];
        hash.rebuild(&agents);
        let first: Vec<usize> = hash.neighbours(Vec2::new(5.0, 5.0)).collect();
        hash.rebuild(&agents);
        let second: Vec<usize> = hash.neighbours(Vec2::new(5.0, 5.0)).collect();
        assert_eq!(first, second);
        // All four share the bucket, in ascending index order.
        assert_eq!(first, vec![0, 1, 2, 3]);
    }
}
