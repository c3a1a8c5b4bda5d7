//! Breadth-first flow-field generation.

use crate::error::PlanError;
use drover_core::{Cell, MapVersion, MoveClass, Vec2};
use drover_grid::{Grid, ObstacleMap, NEIGHBOUR_OFFSETS};
use std::collections::VecDeque;
use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;

/// One of the eight directions a flow-field cell can point.
///
/// Stored instead of a raw angle so that "no direction" is
/// `Option::None` and equal fields compare bit-identically.
/// `+y` is south, so [`FlowDir::North`] steps to `(0, -1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowDir {
    /// Step `(0, -1)`.
    North,
    /// Step `(1, -1)`.
    NorthEast,
    /// Step `(1, 0)`.
    East,
    /// Step `(1, 1)`.
    SouthEast,
    /// Step `(0, 1)`.
    South,
    /// Step `(-1, 1)`.
    SouthWest,
    /// Step `(-1, 0)`.
    West,
    /// Step `(-1, -1)`.
    NorthWest,
}

impl FlowDir {
    /// The cell offset this direction steps to.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            FlowDir::North => (0, -1),
            FlowDir::NorthEast => (1, -1),
            FlowDir::East => (1, 0),
            FlowDir::SouthEast => (1, 1),
            FlowDir::South => (0, 1),
            FlowDir::SouthWest => (-1, 1),
            FlowDir::West => (-1, 0),
            FlowDir::NorthWest => (-1, -1),
        }
    }

    /// The unit vector for this direction.
    pub const fn unit(self) -> Vec2 {
        match self {
            FlowDir::North => Vec2::new(0.0, -1.0),
            FlowDir::NorthEast => Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            FlowDir::East => Vec2::new(1.0, 0.0),
            FlowDir::SouthEast => Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            FlowDir::South => Vec2::new(0.0, 1.0),
            FlowDir::SouthWest => Vec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            FlowDir::West => Vec2::new(-1.0, 0.0),
            FlowDir::NorthWest => Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        }
    }

    /// The direction as an angle in radians (`atan2` convention,
    /// east = 0, south = π/2).
    pub fn angle(self) -> f32 {
        let (dx, dy) = self.offset();
        (dy as f32).atan2(dx as f32)
    }
}

impl fmt::Display for FlowDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowDir::North => "N",
            FlowDir::NorthEast => "NE",
            FlowDir::East => "E",
            FlowDir::SouthEast => "SE",
            FlowDir::South => "S",
            FlowDir::SouthWest => "SW",
            FlowDir::West => "W",
            FlowDir::NorthWest => "NW",
        };
        write!(f, "{name}")
    }
}

/// For each entry of [`NEIGHBOUR_OFFSETS`], the direction pointing from
/// the discovered neighbour *back* toward the cell that discovered it.
pub(crate) const STEP_BACK: [FlowDir; 8] = [
    FlowDir::South,     // discovered to the north
    FlowDir::West,      // east
    FlowDir::North,     // south
    FlowDir::East,      // west
    FlowDir::SouthWest, // north-east
    FlowDir::NorthWest, // south-east
    FlowDir::NorthEast, // south-west
    FlowDir::SouthEast, // north-west
];

/// The destination a flow field routes toward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowTarget {
    /// A single open cell.
    Cell(Cell),
    /// The footprint of a structure. The cells are blocked on the
    /// obstacle map but are excluded from the obstacle test during
    /// planning, so agents can walk up to (and be routed into) the
    /// structure they were ordered to.
    Footprint(Vec<Cell>),
}

impl FlowTarget {
    /// The seed cells the flood fill starts from.
    pub fn seeds(&self) -> &[Cell] {
        match self {
            FlowTarget::Cell(cell) => std::slice::from_ref(cell),
            FlowTarget::Footprint(cells) => cells,
        }
    }
}

/// A per-cell direction grid routing agents toward one destination.
///
/// Cells hold `None` when they are the destination itself or when they
/// are unreachable under the obstacle map the field was computed
/// against. For every reachable cell, following the recorded directions
/// strictly decreases the flood-fill distance to the destination — no
/// cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    grid: Grid<Option<FlowDir>>,
    class: MoveClass,
    version: MapVersion,
}

impl FlowField {
    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The movement class of the map this field was computed against.
    pub fn class(&self) -> MoveClass {
        self.class
    }

    /// The obstacle-map version this field was computed against.
    pub fn version(&self) -> MapVersion {
        self.version
    }

    /// Direction at `cell`, or `None` for the destination, unreachable
    /// cells, and out-of-bounds queries.
    pub fn direction(&self, cell: Cell) -> Option<FlowDir> {
        self.grid.get(cell).copied().flatten()
    }

    /// Direction at the cell containing a world position.
    pub fn direction_at(&self, pos: Vec2) -> Option<FlowDir> {
        self.direction(Cell::containing(pos))
    }
}

/// Compute a flow field routing toward `target` on `map`.
///
/// Breadth-first flood fill seeded at the destination cell (or at every
/// cell of a structure footprint simultaneously, with the footprint
/// excluded from the obstacle test). Neighbours are visited in
/// [`NEIGHBOUR_OFFSETS`] order — N, E, S, W, NE, SE, SW, NW — which is
/// the sole tie-break rule, so identical inputs always produce
/// identical fields. A diagonal step is admitted only when both
/// flanking cardinal cells are passable, so a flow never threads the
/// corner between two blocked cells.
///
/// Cost is O(cells); the movement planner runs this off the simulation
/// thread.
///
/// # Errors
///
/// - [`PlanError::DestinationOutOfBounds`] if a seed lies outside the map.
/// - [`PlanError::DestinationBlocked`] if a plain cell destination is
///   blocked (a footprint destination is exempt).
/// - [`PlanError::EmptyFootprint`] if a footprint target has no cells.
pub fn plan_flow_field(map: &ObstacleMap, target: &FlowTarget) -> Result<FlowField, PlanError> {
    let width = map.width();
    let height = map.height();

    let seeds = target.seeds();
    if seeds.is_empty() {
        return Err(PlanError::EmptyFootprint);
    }
    for &seed in seeds {
        if !map.grid().in_bounds(seed) {
            return Err(PlanError::DestinationOutOfBounds { cell: seed });
        }
    }
    if let FlowTarget::Cell(cell) = target {
        if map.is_blocked(*cell) {
            return Err(PlanError::DestinationBlocked { cell: *cell });
        }
    }

    // Footprint cells are approachable targets, not move-blockers.
    // The map guarantees non-zero dimensions, so construction cannot fail.
    let mut excluded = Grid::new(width, height, false).expect("map dimensions are non-zero");
    if let FlowTarget::Footprint(cells) = target {
        for &cell in cells {
            // Bounds were checked above.
            let _ = excluded.set(cell, true);
        }
    }
    let passable = |cell: Cell| -> bool {
        map.grid().in_bounds(cell)
            && (!map.is_blocked(cell) || excluded.get(cell).copied().unwrap_or(false))
    };

    let mut grid = Grid::new(width, height, None).expect("map dimensions are non-zero");
    let cell_count = grid.len();
    let mut dist = vec![u32::MAX; cell_count];
    let mut queue = VecDeque::new();

    for &seed in seeds {
        if let Some(i) = grid.index(seed) {
            if dist[i] == u32::MAX {
                dist[i] = 0;
                queue.push_back(seed);
            }
        }
    }

    while let Some(cell) = queue.pop_front() {
        let here = match grid.index(cell) {
            Some(i) => dist[i],
            None => continue,
        };
        for (k, (dx, dy)) in NEIGHBOUR_OFFSETS.iter().enumerate() {
            let n = cell.offset(*dx, *dy);
            if !passable(n) {
                continue;
            }
            if *dx != 0 && *dy != 0 && !(passable(cell.offset(*dx, 0)) && passable(cell.offset(0, *dy))) {
                continue;
            }
            let Some(ni) = grid.index(n) else { continue };
            if dist[ni] == u32::MAX {
                dist[ni] = here + 1;
                let _ = grid.set(n, Some(STEP_BACK[k]));
                queue.push_back(n);
            }
        }
    }

    Ok(FlowField {
        grid,
        class: map.class(),
        version: map.version(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map(w: u32, h: u32) -> ObstacleMap {
        ObstacleMap::new(w, h, MoveClass::Ground, MapVersion(1)).unwrap()
    }

    /// Follow directions from `start`; panics on a cycle. Returns the
    /// number of steps taken to reach a direction-less cell.
    fn steps_to_sink(field: &FlowField, start: Cell) -> u32 {
        let limit = field.width() * field.height();
        let mut cell = start;
        for step in 0..=limit {
            match field.direction(cell) {
                None => return step,
                Some(dir) => {
                    let (dx, dy) = dir.offset();
                    cell = cell.offset(dx, dy);
                }
            }
        }
        panic!("no sink reached from {start} within {limit} steps (cycle?)");
    }

    // ── direction primitives ────────────────────────────────────

    #[test]
    fn offsets_and_units_agree() {
        for dir in [
            FlowDir::North,
            FlowDir::NorthEast,
            FlowDir::East,
            FlowDir::SouthEast,
            FlowDir::South,
            FlowDir::SouthWest,
            FlowDir::West,
            FlowDir::NorthWest,
        ] {
            let (dx, dy) = dir.offset();
            let unit = dir.unit();
            assert!((unit.length() - 1.0).abs() < 1e-6, "{dir} unit not unit");
            let expect = Vec2::new(dx as f32, dy as f32).normalize_or_zero();
            assert!((unit.x - expect.x).abs() < 1e-6);
            assert!((unit.y - expect.y).abs() < 1e-6);
            let angle = dir.angle();
            assert!((angle.cos() - unit.x).abs() < 1e-6);
            assert!((angle.sin() - unit.y).abs() < 1e-6);
        }
    }

    // ── open-map gradients ──────────────────────────────────────

    #[test]
    fn open_map_points_toward_destination() {
        let map = open_map(10, 10);
        let dest = Cell::new(5, 5);
        let field = plan_flow_field(&map, &FlowTarget::Cell(dest)).unwrap();

        assert_eq!(field.direction(dest), None);
        assert_eq!(field.direction(Cell::new(4, 5)), Some(FlowDir::East));
        assert_eq!(field.direction(Cell::new(6, 5)), Some(FlowDir::West));
        assert_eq!(field.direction(Cell::new(5, 4)), Some(FlowDir::South));
        assert_eq!(field.direction(Cell::new(5, 6)), Some(FlowDir::North));
        assert_eq!(field.direction(Cell::new(4, 4)), Some(FlowDir::SouthEast));
        assert_eq!(field.direction(Cell::new(6, 6)), Some(FlowDir::NorthWest));
        assert_eq!(field.direction(Cell::new(0, 0)), Some(FlowDir::SouthEast));
        assert_eq!(field.direction(Cell::new(9, 9)), Some(FlowDir::NorthWest));
    }

    #[test]
    fn every_open_cell_reaches_destination() {
        let map = open_map(10, 10);
        let field = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(5, 5))).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                steps_to_sink(&field, Cell::new(x, y));
            }
        }
    }

    #[test]
    fn identical_inputs_produce_identical_fields() {
        let map = ObstacleMap::from_fn(12, 12, MoveClass::Ground, MapVersion(3), |c| {
            c.x == 4 && c.y != 9
        })
        .unwrap();
        let target = FlowTarget::Cell(Cell::new(1, 1));
        let a = plan_flow_field(&map, &target).unwrap();
        let b = plan_flow_field(&map, &target).unwrap();
        assert_eq!(a, b);
    }

    // ── obstacles ───────────────────────────────────────────────

    #[test]
    fn flow_routes_through_gap() {
        // Wall at x == 4 with a gap at y == 6.
        let map = ObstacleMap::from_fn(10, 10, MoveClass::Ground, MapVersion(1), |c| {
            c.x == 4 && c.y != 6
        })
        .unwrap();
        let field = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(1, 1))).unwrap();

        // Every open cell on the far side still drains to the target.
        for y in 0..10 {
            for x in 5..10 {
                let steps = steps_to_sink(&field, Cell::new(x, y));
                assert!(steps > 0);
            }
        }
        // The wall itself holds no direction.
        assert_eq!(field.direction(Cell::new(4, 0)), None);
    }

    #[test]
    fn isolated_region_stays_directionless() {
        // A sealed 2x2 chamber in the south-east corner.
        let map = ObstacleMap::from_fn(8, 8, MoveClass::Ground, MapVersion(1), |c| {
            (c.x == 5 && c.y >= 5) || (c.y == 5 && c.x >= 5)
        })
        .unwrap();
        let field = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(0, 0))).unwrap();
        for y in 6..8 {
            for x in 6..8 {
                assert_eq!(field.direction(Cell::new(x, y)), None);
            }
        }
        // Outside the chamber everything still flows.
        steps_to_sink(&field, Cell::new(4, 4));
    }

    #[test]
    fn diagonals_never_thread_blocked_corners() {
        // Blocked at (1,0) and (0,1): the diagonal from (1,1) to the
        // destination (0,0) is a corner squeeze and must be rejected.
        let map = ObstacleMap::from_fn(4, 4, MoveClass::Ground, MapVersion(1), |c| {
            c == Cell::new(1, 0) || c == Cell::new(0, 1)
        })
        .unwrap();
        let field = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(0, 0))).unwrap();
        assert_eq!(field.direction(Cell::new(1, 1)), None);
    }

    // ── destinations ────────────────────────────────────────────

    #[test]
    fn blocked_destination_fails() {
        let map = ObstacleMap::from_fn(6, 6, MoveClass::Ground, MapVersion(1), |c| {
            c == Cell::new(3, 3)
        })
        .unwrap();
        let err = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(3, 3))).unwrap_err();
        assert_eq!(err, PlanError::DestinationBlocked { cell: Cell::new(3, 3) });
    }

    #[test]
    fn out_of_bounds_destination_fails() {
        let map = open_map(6, 6);
        let err = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(6, 0))).unwrap_err();
        assert_eq!(err, PlanError::DestinationOutOfBounds { cell: Cell::new(6, 0) });
    }

    #[test]
    fn empty_footprint_fails() {
        let map = open_map(6, 6);
        let err = plan_flow_field(&map, &FlowTarget::Footprint(Vec::new())).unwrap_err();
        assert_eq!(err, PlanError::EmptyFootprint);
    }

    #[test]
    fn footprint_target_is_approachable() {
        // A 2x2 structure blocks its own cells on the map, but agents
        // ordered to it must still be routed onto the footprint.
        let footprint = vec![
            Cell::new(3, 3),
            Cell::new(4, 3),
            Cell::new(3, 4),
            Cell::new(4, 4),
        ];
        let fp = footprint.clone();
        let map = ObstacleMap::from_fn(8, 8, MoveClass::Ground, MapVersion(1), move |c| {
            fp.contains(&c)
        })
        .unwrap();
        let field = plan_flow_field(&map, &FlowTarget::Footprint(footprint.clone())).unwrap();

        for &cell in &footprint {
            assert_eq!(field.direction(cell), None);
        }
        assert_eq!(field.direction(Cell::new(2, 3)), Some(FlowDir::East));
        assert_eq!(field.direction(Cell::new(5, 3)), Some(FlowDir::West));
        steps_to_sink(&field, Cell::new(0, 7));
    }

    #[test]
    fn field_records_map_version_and_class() {
        let map = ObstacleMap::new(6, 6, MoveClass::Water, MapVersion(9)).unwrap();
        let field = plan_flow_field(&map, &FlowTarget::Cell(Cell::new(2, 2))).unwrap();
        assert_eq!(field.version(), MapVersion(9));
        assert_eq!(field.class(), MoveClass::Water);
    }

    // ── proptests ───────────────────────────────────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Following the field from any reachable cell terminates at
            /// a sink (the destination) without cycling — the monotone
            /// descent invariant.
            #[test]
            fn descent_is_monotone(blocked in prop::collection::vec(prop::bool::weighted(0.3), 64)) {
                let map = ObstacleMap::from_fn(8, 8, MoveClass::Ground, MapVersion(1), |c| {
                    blocked[(c.y * 8 + c.x) as usize]
                }).unwrap();
                // Pick the first open cell as destination.
                let dest = (0..64)
                    .map(|i| Cell::new(i % 8, i / 8))
                    .find(|&c| !map.is_blocked(c));
                let Some(dest) = dest else { return Ok(()) };
                let field = plan_flow_field(&map, &FlowTarget::Cell(dest)).unwrap();

                for y in 0..8 {
                    for x in 0..8 {
                        let cell = Cell::new(x, y);
                        if field.direction(cell).is_some() {
                            // Walks to a sink within the step limit or panics.
                            steps_to_sink(&field, cell);
                        }
                    }
                }
            }
        }
    }
}
