use criterion::{Criterion, black_box, criterion_group, criterion_main};
use penney_core::game::aggregate::Aggregate;
use penney_core::game::evaluator::evaluate;
use penney_core::game::scorer::score;
use penney_core::model::deck::Deck;
use penney_core::model::sequence::Sequence;

fn evaluate_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for seed in [7u64, 1040, 90210] {
        let deck = Deck::shuffled_with_seed(seed);
        group.bench_function(format!("all_pairs_{seed}"), |b| {
            b.iter(|| evaluate(black_box(&deck)))
        });
    }
    let deck = Deck::shuffled_with_seed(7);
    group.bench_function("single_pair", |b| {
        b.iter(|| score(black_box(&deck), Sequence::ALL[3], Sequence::ALL[6]))
    });
    group.bench_function("fold_100", |b| {
        let outcomes = evaluate(&deck);
        b.iter(|| {
            let mut aggregate = Aggregate::new();
            for _ in 0..100 {
                aggregate.fold(black_box(&outcomes));
            }
            aggregate
        })
    });
    group.finish();
}

criterion_group!(benches, evaluate_bench);
criterion_main!(benches);
