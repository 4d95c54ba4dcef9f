use std::time::Duration;

use harbor_defence_core::{
    CellCoord, Command, Effect, EnemyId, Event, ModifierSet, Rank, Species,
};
use harbor_defence_system_pathfinding::Routing;
use harbor_defence_world::{self as world, query, World};

#[test]
fn replaying_a_script_reproduces_every_event() {
    let script = script();

    let first = replay(script.clone());
    let second = replay(script);

    assert_eq!(first.events, second.events, "event log diverged");
    assert_eq!(first.final_positions, second.final_positions);
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::EffectExpired { .. })));
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    final_positions: Vec<(EnemyId, [u32; 2])>,
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut routing: Routing = Routing::default();
    let mut log = Vec::new();

    for command in commands {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut world, command, &mut events);
            }
            routing.handle(
                &events,
                query::traversal_map(&world),
                query::exit(&world),
                &mut pending,
            );
            log.extend(events);
        }
    }

    let final_positions = query::enemies(&world)
        .map(|enemy| {
            let position = enemy.position();
            (enemy.id(), [position.x.to_bits(), position.y.to_bits()])
        })
        .collect();

    ReplayOutcome {
        events: log,
        final_positions,
    }
}

fn script() -> Vec<Command> {
    let tick = Command::Tick {
        dt: Duration::from_millis(50),
    };
    let mut commands = vec![
        Command::SpawnEnemy {
            species: Species::TinyBoat,
            spawner: CellCoord::new(3, 15),
            rank: Rank::BASE,
            modifiers: ModifierSet::from_label("fast"),
        },
        Command::SpawnEnemy {
            species: Species::BigDragon,
            spawner: CellCoord::new(20, 15),
            rank: Rank::new(2).expect("non-zero rank"),
            modifiers: ModifierSet::from_label("regen"),
        },
        Command::SpawnEnemy {
            species: Species::BigWhale,
            spawner: CellCoord::new(27, 15),
            rank: Rank::BASE,
            modifiers: ModifierSet::from_label("ice shield"),
        },
    ];
    commands.extend(std::iter::repeat(tick.clone()).take(20));
    commands.push(Command::AttachEffect {
        enemy: EnemyId::new(0),
        effect: Effect::slow(Duration::from_millis(400)),
    });
    for column in 5..12 {
        commands.push(Command::SetCellBlocked {
            cell: CellCoord::new(column, 9),
            blocked: true,
        });
    }
    commands.push(Command::DamageEnemy {
        enemy: EnemyId::new(1),
        amount: 35.0,
    });
    commands.extend(std::iter::repeat(tick).take(120));
    commands
}
