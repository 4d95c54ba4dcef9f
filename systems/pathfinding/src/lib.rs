#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Route planning for path-following enemies.
//!
//! The world announces [`Event::RouteRequested`] whenever an enemy needs a
//! fresh route. [`Routing`] answers each request with a
//! [`Command::AssignRoute`] produced by a [`Pathfinder`].

use std::collections::VecDeque;

use harbor_defence_core::{CellCoord, Command, EnemyId, Event, Pathfinder, TraversalMap};
use log::{trace, warn};

const UNREACHABLE: u32 = u32::MAX;

/// Breadth-first pathfinder over four-connected grid cells.
///
/// A distance field is flooded outwards from the target, then the route is
/// read back by stepping from the start to any neighbour one step closer.
/// Neighbours are visited in a fixed order so equal-length routes are always
/// resolved the same way.
#[derive(Clone, Copy, Debug, Default)]
pub struct NavigationPathfinder;

impl Pathfinder for NavigationPathfinder {
    fn find_path(
        &self,
        start: CellCoord,
        target: CellCoord,
        map: &TraversalMap,
    ) -> Vec<CellCoord> {
        if map.is_blocked(start) || map.is_blocked(target) {
            return Vec::new();
        }
        if start == target {
            return vec![start];
        }

        let (columns, rows) = map.dimensions();
        let distances = flood(map, target);

        let Some(mut remaining) = distance(&distances, columns, start) else {
            return Vec::new();
        };
        if remaining == UNREACHABLE {
            return Vec::new();
        }

        let mut route = Vec::with_capacity(remaining as usize + 1);
        let mut current = start;
        route.push(current);
        while remaining > 0 {
            let next = neighbors(current, columns, rows)
                .find(|neighbor| distance(&distances, columns, *neighbor) == Some(remaining - 1));
            let Some(next) = next else {
                return Vec::new();
            };
            route.push(next);
            current = next;
            remaining -= 1;
        }
        route
    }
}

fn flood(map: &TraversalMap, target: CellCoord) -> Vec<u32> {
    let (columns, rows) = map.dimensions();
    let mut distances = vec![UNREACHABLE; columns as usize * rows as usize];

    let Some(target_index) = index(columns, target) else {
        return distances;
    };
    distances[target_index] = 0;

    let mut queue = VecDeque::from([target]);
    while let Some(cell) = queue.pop_front() {
        let Some(current) = index(columns, cell).map(|offset| distances[offset]) else {
            continue;
        };
        for neighbor in neighbors(cell, columns, rows) {
            if map.is_blocked(neighbor) {
                continue;
            }
            let Some(neighbor_index) = index(columns, neighbor) else {
                continue;
            };
            if distances[neighbor_index] <= current + 1 {
                continue;
            }
            distances[neighbor_index] = current + 1;
            queue.push_back(neighbor);
        }
    }
    distances
}

fn distance(distances: &[u32], columns: u32, cell: CellCoord) -> Option<u32> {
    index(columns, cell).and_then(|offset| distances.get(offset).copied())
}

fn neighbors(cell: CellCoord, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }
    if cell.column() + 1 < columns {
        candidates[count] = Some(CellCoord::new(cell.column() + 1, cell.row()));
        count += 1;
    }
    if cell.row() + 1 < rows {
        candidates[count] = Some(CellCoord::new(cell.column(), cell.row() + 1));
        count += 1;
    }
    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(columns: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= columns {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(usize::try_from(columns).ok()?)?
        .checked_add(column)
}

/// Pure system that answers route requests with route assignments.
#[derive(Debug, Default)]
pub struct Routing<P = NavigationPathfinder> {
    pathfinder: P,
    pending: Vec<(EnemyId, CellCoord)>,
}

impl<P: Pathfinder> Routing<P> {
    /// Creates a routing system backed by the provided pathfinder.
    #[must_use]
    pub fn new(pathfinder: P) -> Self {
        Self {
            pathfinder,
            pending: Vec::new(),
        }
    }

    /// Consumes world events and emits one route assignment per requesting enemy.
    ///
    /// Repeated requests for the same enemy within the batch collapse into the
    /// latest one, and enemies removed later in the batch are skipped.
    pub fn handle(
        &mut self,
        events: &[Event],
        map: &TraversalMap,
        exit: CellCoord,
        out: &mut Vec<Command>,
    ) {
        self.pending.clear();
        for event in events {
            match *event {
                Event::RouteRequested { enemy, from } => {
                    if let Some(entry) = self.pending.iter_mut().find(|(id, _)| *id == enemy) {
                        entry.1 = from;
                    } else {
                        self.pending.push((enemy, from));
                    }
                }
                Event::EnemyKilled { enemy, .. } | Event::EnemyEscaped { enemy } => {
                    self.pending.retain(|(id, _)| *id != enemy);
                }
                _ => {}
            }
        }

        for &(enemy, from) in &self.pending {
            let route = self.pathfinder.find_path(from, exit, map);
            if route.is_empty() {
                warn!("no route from {from:?} to {exit:?} for enemy {}", enemy.get());
            } else {
                trace!("enemy {} routed through {} cells", enemy.get(), route.len());
            }
            out.push(Command::AssignRoute { enemy, route });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(map: &TraversalMap, start: CellCoord, target: CellCoord) -> Vec<CellCoord> {
        NavigationPathfinder.find_path(start, target, map)
    }

    #[test]
    fn open_grid_route_is_shortest() {
        let map = TraversalMap::new(5, 5);
        let start = CellCoord::new(0, 4);
        let target = CellCoord::new(3, 0);

        let route = path(&map, start, target);

        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&target));
        assert_eq!(route.len() as u32, start.manhattan_distance(target) + 1);
        assert!(route
            .windows(2)
            .all(|pair| pair[0].manhattan_distance(pair[1]) == 1));
    }

    #[test]
    fn route_detours_around_walls() {
        let mut map = TraversalMap::new(3, 4);
        for column in 0..2 {
            let _ = map.set_blocked(CellCoord::new(column, 1), true);
        }

        let route = path(&map, CellCoord::new(0, 3), CellCoord::new(0, 0));

        assert!(route.iter().all(|cell| !map.is_blocked(*cell)));
        assert!(route.contains(&CellCoord::new(2, 1)));
        assert_eq!(route.len(), 8);
    }

    #[test]
    fn sealed_exit_yields_empty_route() {
        let mut map = TraversalMap::new(3, 3);
        for column in 0..3 {
            let _ = map.set_blocked(CellCoord::new(column, 1), true);
        }

        assert!(path(&map, CellCoord::new(1, 2), CellCoord::new(1, 0)).is_empty());
        assert!(path(&map, CellCoord::new(1, 1), CellCoord::new(1, 0)).is_empty());
    }

    #[test]
    fn route_to_own_cell_is_single_step() {
        let map = TraversalMap::new(2, 2);
        let cell = CellCoord::new(1, 1);

        assert_eq!(path(&map, cell, cell), vec![cell]);
    }

    #[test]
    fn routing_collapses_duplicate_requests() {
        let map = TraversalMap::new(3, 3);
        let mut routing: Routing = Routing::default();
        let mut commands = Vec::new();
        let events = vec![
            Event::RouteRequested {
                enemy: EnemyId::new(1),
                from: CellCoord::new(0, 2),
            },
            Event::RouteRequested {
                enemy: EnemyId::new(2),
                from: CellCoord::new(2, 2),
            },
            Event::RouteRequested {
                enemy: EnemyId::new(1),
                from: CellCoord::new(1, 1),
            },
            Event::EnemyKilled {
                enemy: EnemyId::new(2),
                reward: 30.0,
            },
        ];

        routing.handle(&events, &map, CellCoord::new(1, 0), &mut commands);

        assert_eq!(
            commands,
            vec![Command::AssignRoute {
                enemy: EnemyId::new(1),
                route: vec![CellCoord::new(1, 1), CellCoord::new(1, 0)],
            }]
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn routes_avoid_blocked_cells(
                walls in proptest::collection::vec((0u32..6, 1u32..5), 0..10),
                start_column in 0u32..6,
            ) {
                let mut map = TraversalMap::new(6, 6);
                for (column, row) in walls {
                    let _ = map.set_blocked(CellCoord::new(column, row), true);
                }
                let start = CellCoord::new(start_column, 5);
                let target = CellCoord::new(3, 0);

                let route = path(&map, start, target);

                if let Some(first) = route.first() {
                    prop_assert_eq!(*first, start);
                    prop_assert_eq!(route.last(), Some(&target));
                }
                prop_assert!(route.iter().all(|cell| !map.is_blocked(*cell)));
                prop_assert!(route
                    .windows(2)
                    .all(|pair| pair[0].manhattan_distance(pair[1]) == 1));
            }
        }
    }
}
