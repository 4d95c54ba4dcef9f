//! Steering strategies that derive velocity, orientation and targeting priority.

use glam::Vec2;
use harbor_defence_core::{CellCoord, GridGeometry, MovementKind};

/// Priority penalty added for every route step an enemy still has to cover.
const ROUTE_STEP_WEIGHT: f32 = 1000.0;
/// Smallest denominator used when normalising the steering vector.
const MIN_STEERING_NORM: f32 = 0.001;

/// Continuous motion state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Kinematics {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) speed: f32,
    pub(crate) angle_degrees: f32,
}

/// Ordered grid route with a cursor pointing at the next cell to reach.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    cells: Vec<CellCoord>,
    next_step: usize,
}

impl Route {
    /// Creates a route whose cursor targets the first cell.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self {
            cells,
            next_step: 0,
        }
    }

    /// Cells composing the route.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Index of the cell the enemy is heading towards.
    #[must_use]
    pub fn next_step(&self) -> usize {
        self.next_step
    }

    /// Number of cells between the cursor and the end of the route.
    #[must_use]
    pub fn remaining_steps(&self) -> usize {
        self.cells.len().saturating_sub(self.next_step)
    }

    /// Reports whether the cursor moved past the final cell.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_step >= self.cells.len()
    }

    fn next_cell(&self) -> Option<CellCoord> {
        self.cells.get(self.next_step).copied()
    }

    /// Moves the cursor just past the first occurrence of `cell`.
    fn advance_past(&mut self, cell: CellCoord) {
        if let Some(index) = self.cells.iter().position(|candidate| *candidate == cell) {
            self.next_step = index + 1;
        }
    }
}

/// How an enemy chooses its velocity every tick.
#[derive(Clone, Debug, PartialEq)]
pub enum MovementStrategy {
    /// Straight descent at constant speed.
    Airborne,
    /// Steering along a precomputed grid route.
    PathFollowing(Route),
}

impl MovementStrategy {
    /// Strategy matching a species' movement kind, with an empty route for path-followers.
    #[must_use]
    pub fn for_kind(kind: MovementKind) -> Self {
        match kind {
            MovementKind::Airborne => Self::Airborne,
            MovementKind::PathFollowing => Self::PathFollowing(Route::default()),
        }
    }

    /// Route followed by the enemy, if it is a path-follower.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Airborne => None,
            Self::PathFollowing(route) => Some(route),
        }
    }

    pub(crate) fn route_mut(&mut self) -> Option<&mut Route> {
        match self {
            Self::Airborne => None,
            Self::PathFollowing(route) => Some(route),
        }
    }

    /// Sets the velocity and orientation for this tick and returns the new priority.
    pub(crate) fn steer(&mut self, kinematics: &mut Kinematics, geometry: &GridGeometry) -> f32 {
        match self {
            Self::Airborne => {
                kinematics.velocity = Vec2::new(0.0, -kinematics.speed);
                kinematics.position.y
            }
            Self::PathFollowing(route) => steer_along_route(route, kinematics, geometry),
        }
    }
}

fn steer_along_route(route: &mut Route, kinematics: &mut Kinematics, geometry: &GridGeometry) -> f32 {
    let cell = geometry.nearest_cell(kinematics.position);
    if geometry.is_within_cell(kinematics.position, cell) {
        route.advance_past(cell);
    }

    // Past the end of the route the previous velocity is kept as is.
    if let Some(next) = route.next_cell() {
        let offset = geometry.cell_center(next) - kinematics.position;
        let norm = offset.length().max(MIN_STEERING_NORM);
        kinematics.velocity = offset * (kinematics.speed / norm);
        kinematics.angle_degrees = kinematics
            .velocity
            .y
            .atan2(kinematics.velocity.x)
            .to_degrees();
    }

    kinematics.position.y + ROUTE_STEP_WEIGHT * route.remaining_steps() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinematics_at(position: Vec2) -> Kinematics {
        Kinematics {
            position,
            velocity: Vec2::new(0.0, -48.0),
            speed: 48.0,
            angle_degrees: 0.0,
        }
    }

    fn straight_route(length: u32) -> Route {
        Route::new((0..length).map(|column| CellCoord::new(column, 0)).collect())
    }

    #[test]
    fn airborne_descends_and_ranks_by_height() {
        let mut strategy = MovementStrategy::Airborne;
        let mut kinematics = kinematics_at(Vec2::new(10.0, 320.0));
        kinematics.velocity = Vec2::new(3.0, 3.0);

        let priority = strategy.steer(&mut kinematics, &GridGeometry::default());

        assert_eq!(kinematics.velocity, Vec2::new(0.0, -48.0));
        assert_eq!(priority, 320.0);
    }

    #[test]
    fn centred_enemy_targets_the_following_cell() {
        let geometry = GridGeometry::default();
        let mut strategy = MovementStrategy::PathFollowing(straight_route(3));
        let mut kinematics = kinematics_at(geometry.cell_center(CellCoord::new(0, 0)));

        let priority = strategy.steer(&mut kinematics, &geometry);

        let route = strategy.route().expect("path-follower");
        assert_eq!(route.next_step(), 1);
        assert_eq!(kinematics.velocity, Vec2::new(48.0, 0.0));
        assert_eq!(kinematics.angle_degrees, 0.0);
        assert_eq!(priority, 25.0 + 2.0 * ROUTE_STEP_WEIGHT);
    }

    #[test]
    fn off_centre_enemy_steers_towards_the_route_start() {
        let geometry = GridGeometry::default();
        let mut strategy = MovementStrategy::PathFollowing(straight_route(2));
        let mut kinematics = kinematics_at(Vec2::new(25.0, 45.0));

        let _ = strategy.steer(&mut kinematics, &geometry);

        assert_eq!(strategy.route().map(Route::next_step), Some(0));
        assert!((kinematics.velocity - Vec2::new(0.0, -48.0)).length() < 1e-4);
        assert!((kinematics.angle_degrees + 90.0).abs() < 1e-4);
    }

    #[test]
    fn empty_route_keeps_previous_velocity() {
        let geometry = GridGeometry::default();
        let mut strategy = MovementStrategy::PathFollowing(Route::default());
        let mut kinematics = kinematics_at(Vec2::new(60.0, 90.0));
        kinematics.velocity = Vec2::new(7.0, -2.0);

        let priority = strategy.steer(&mut kinematics, &geometry);

        assert_eq!(kinematics.velocity, Vec2::new(7.0, -2.0));
        assert_eq!(priority, 90.0);
    }

    #[test]
    fn coincident_target_yields_zero_velocity_without_nan() {
        let geometry = GridGeometry::new(Vec2::ZERO, 50.0, -1.0);
        let mut strategy = MovementStrategy::PathFollowing(straight_route(1));
        let mut kinematics = kinematics_at(geometry.cell_center(CellCoord::new(0, 0)));

        let _ = strategy.steer(&mut kinematics, &geometry);

        assert_eq!(kinematics.velocity, Vec2::ZERO);
        assert!(kinematics.angle_degrees.is_finite());
    }

    #[test]
    fn revisited_cells_advance_past_their_first_occurrence() {
        let geometry = GridGeometry::default();
        let route = Route::new(vec![
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(0, 0),
            CellCoord::new(0, 1),
        ]);
        let mut strategy = MovementStrategy::PathFollowing(route);
        let mut kinematics = kinematics_at(geometry.cell_center(CellCoord::new(0, 0)));

        let _ = strategy.steer(&mut kinematics, &geometry);

        assert_eq!(strategy.route().map(Route::next_step), Some(1));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fewer_remaining_steps_never_rank_later(
                column in 0u32..6,
                y in 20.0f32..30.0,
                lead in 1u32..5,
            ) {
                let geometry = GridGeometry::default();
                let route = straight_route(12);
                let trailing_cell = CellCoord::new(column, 0);
                let leading_cell = CellCoord::new(column + lead, 0);

                let mut trailing = MovementStrategy::PathFollowing(route.clone());
                let mut leading = MovementStrategy::PathFollowing(route);
                let mut trailing_kinematics = kinematics_at(geometry.cell_center(trailing_cell));
                let mut leading_kinematics = kinematics_at(geometry.cell_center(leading_cell));
                trailing_kinematics.position.y = y;
                leading_kinematics.position.y = y;

                let trailing_priority = trailing.steer(&mut trailing_kinematics, &geometry);
                let leading_priority = leading.steer(&mut leading_kinematics, &geometry);

                prop_assert!(leading_priority < trailing_priority);
            }
        }
    }
}
