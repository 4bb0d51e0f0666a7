use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mimic::pack::{pack, unpack};
use mimic::Micheline;

fn sample() -> Micheline {
    Micheline::seq((0i64..256).map(|i| {
        Micheline::elt(
            Micheline::string(format!("key{i}")),
            Micheline::Pair(vec![
                Micheline::int(i * 1_000_003),
                Micheline::bytes_of(&i.to_be_bytes()),
                Micheline::some(Micheline::boolean(i % 2 == 0)),
            ]),
        )
    }))
}

fn pack_bench(c: &mut Criterion) {
    let node = sample();
    c.bench_function("pack_map", |b| b.iter(|| black_box(pack(&node).unwrap())));
}

fn unpack_bench(c: &mut Criterion) {
    let packed = pack(&sample()).unwrap();
    c.bench_function("unpack_map", |b| b.iter(|| black_box(unpack(&packed).unwrap())));
}

criterion_group! {
    name = pack_benches;
    config = Criterion::default();
    targets = pack_bench, unpack_bench
}

criterion_main!(pack_benches);
