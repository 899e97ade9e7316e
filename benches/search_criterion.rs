use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use mailbox_chess::game_state::game_state::{BoardSnapshot, Game, SilentGame};
use mailbox_chess::search::iterative_deepening::{search_to_depth, Pruning, SearchConfig};
use mailbox_chess::search::threading::SearchControl;

/// Opening after a fixed seeded sequence of random moves.
fn middlegame() -> BoardSnapshot {
    let mut game = Game::new_standard().expect("standard game should build");
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..16 {
        let moves = game.all_legal_moves().expect("generation should run");
        if moves.is_empty() {
            break;
        }
        let (handle, to) = moves[rng.random_range(0..moves.len())];
        let id = game
            .position()
            .record(handle)
            .expect("generated handles are valid")
            .id;
        game.attempt_move(id, to).expect("position should stay consistent");
    }
    game.board_snapshot()
}

fn bench_search(c: &mut Criterion) {
    let depth = std::env::var("MAILBOX_SEARCH_DEPTH")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(3)
        .max(1);

    let mut group = c.benchmark_group("search");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(6));
    group.sample_size(10);

    let config = SearchConfig {
        depth,
        max_extra_depth: 0,
        time_limit: Duration::from_secs(3600),
        ..SearchConfig::default()
    };
    let opening = Game::new_standard()
        .expect("standard game should build")
        .board_snapshot();
    let cases = [("opening", opening), ("middlegame", middlegame())];

    for (name, snapshot) in cases {
        group.bench_with_input(
            BenchmarkId::new(name, format!("d{depth}")),
            &snapshot,
            |b, snapshot| {
                b.iter(|| {
                    let mut game =
                        SilentGame::from_snapshot(snapshot.clone()).expect("snapshot should load");
                    let control = SearchControl::new();
                    let deadline = Instant::now() + config.time_limit;
                    let result = search_to_depth(
                        &mut game,
                        black_box(depth),
                        &config,
                        Pruning::AlphaBeta,
                        deadline,
                        &control,
                    )
                    .expect("search should run");
                    black_box((result, control.nodes()))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(search_benches, bench_search);
criterion_main!(search_benches);
