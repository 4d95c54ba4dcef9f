use std::time::Duration;

use harbor_defence_core::{CellCoord, Command, EnemyId, Event, ModifierSet, Rank, Species};
use harbor_defence_system_pathfinding::Routing;
use harbor_defence_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(100);

struct Harness {
    world: World,
    routing: Routing,
    log: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        Self {
            world: World::new(),
            routing: Routing::default(),
            log: Vec::new(),
        }
    }

    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.routing.handle(
                &events,
                query::traversal_map(&self.world),
                query::exit(&self.world),
                &mut pending,
            );
            self.log.extend(events);
        }
    }

    fn spawn(&mut self, species: Species, spawner: CellCoord) {
        self.submit(Command::SpawnEnemy {
            species,
            spawner,
            rank: Rank::BASE,
            modifiers: ModifierSet::EMPTY,
        });
    }

    fn block(&mut self, cell: CellCoord) {
        self.submit(Command::SetCellBlocked {
            cell,
            blocked: true,
        });
    }

    fn run_until_empty(&mut self, max_ticks: usize) -> usize {
        for tick in 0..max_ticks {
            if query::enemies(&self.world).next().is_none() {
                return tick;
            }
            self.submit(Command::Tick { dt: FRAME });
        }
        max_ticks
    }

    fn escaped(&self, enemy: EnemyId) -> bool {
        self.log
            .iter()
            .any(|event| *event == Event::EnemyEscaped { enemy })
    }
}

#[test]
fn spawned_boat_receives_route_to_exit() {
    let mut harness = Harness::new();

    harness.spawn(Species::TinyBoat, CellCoord::new(15, 15));

    assert!(harness.log.contains(&Event::RouteAssigned {
        enemy: EnemyId::new(0),
        steps: 16,
    }));
    let route = query::route(&harness.world, EnemyId::new(0)).expect("route stored");
    assert_eq!(route.cells().first(), Some(&CellCoord::new(15, 15)));
    assert_eq!(route.cells().last(), Some(&CellCoord::new(15, 0)));
    assert_eq!(route.next_step(), 0);
}

#[test]
fn boat_follows_route_and_escapes() {
    let mut harness = Harness::new();
    harness.spawn(Species::TinyBoat, CellCoord::new(15, 15));

    harness.submit(Command::Tick { dt: FRAME });
    let early = query::enemy_view(&harness.world)
        .first_by_priority()
        .map(|enemy| enemy.priority)
        .expect("boat alive");
    for _ in 0..50 {
        harness.submit(Command::Tick { dt: FRAME });
    }
    let later = query::enemy_view(&harness.world)
        .first_by_priority()
        .map(|enemy| enemy.priority)
        .expect("boat alive");
    assert!(later < early);

    let ticks = harness.run_until_empty(400);

    assert!(ticks < 400);
    assert!(harness.escaped(EnemyId::new(0)));
}

#[test]
fn blocking_the_corridor_reroutes_around_it() {
    let mut harness = Harness::new();
    harness.spawn(Species::MediumBoat, CellCoord::new(15, 15));
    let wall = CellCoord::new(15, 8);

    harness.block(wall);

    let route = query::route(&harness.world, EnemyId::new(0)).expect("route stored");
    assert!(!route.cells().contains(&wall));
    assert_eq!(route.cells().last(), Some(&CellCoord::new(15, 0)));
    assert_eq!(
        harness
            .log
            .iter()
            .filter(|event| matches!(event, Event::RouteAssigned { .. }))
            .count(),
        2
    );

    let ticks = harness.run_until_empty(1_000);

    assert!(ticks < 1_000);
    assert!(harness.escaped(EnemyId::new(0)));
}

#[test]
fn sealed_exit_assigns_an_empty_route() {
    let mut harness = Harness::new();
    for column in 0..31 {
        harness.block(CellCoord::new(column, 1));
    }

    harness.spawn(Species::SmallSnake, CellCoord::new(4, 12));

    assert!(harness.log.contains(&Event::RouteAssigned {
        enemy: EnemyId::new(0),
        steps: 0,
    }));
    let snake = query::enemy(&harness.world, EnemyId::new(0)).expect("snake alive");
    assert_eq!(snake.route().map(|route| route.remaining_steps()), Some(0));
}

#[test]
fn flyers_never_reach_the_router() {
    let mut harness = Harness::new();

    harness.spawn(Species::SmallShip, CellCoord::new(10, 15));

    assert!(!harness
        .log
        .iter()
        .any(|event| matches!(event, Event::RouteRequested { .. } | Event::RouteAssigned { .. })));
}
