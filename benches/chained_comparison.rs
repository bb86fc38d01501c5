use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use chain_hash::HashMap as ChainHashMap;
use chain_hash::HashTable as ChainHashTable;
use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct TestItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for TestItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{:016X}", key),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct SmallTestItem {
    key: u64,
}

impl KeyValuePair for SmallTestItem {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn items<TestItem: KeyValuePair>(keys: impl Iterator<Item = u64>) -> Vec<(u64, TestItem)> {
    keys.map(|key| {
        let item = TestItem::new(key);
        let hash = item.hash_key();
        (hash, item)
    })
    .collect()
}

fn chain_table_of<TestItem: KeyValuePair>(hash_and_item: &[(u64, TestItem)]) -> ChainHashTable<TestItem> {
    let mut table = ChainHashTable::new();
    for (hash, item) in hash_and_item.iter().cloned() {
        match table.entry(hash, |v| v.eq_key(&item)) {
            chain_hash::hash_table::Entry::Vacant(entry) => {
                entry.insert(item);
            }
            chain_hash::hash_table::Entry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn hashbrown_table_of<TestItem: KeyValuePair>(
    hash_and_item: &[(u64, TestItem)],
) -> HashbrownHashTable<TestItem> {
    let mut table = HashbrownHashTable::new();
    for (hash, item) in hash_and_item.iter().cloned() {
        match table.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                entry.insert(item);
            }
            HashbrownEntry::Occupied(_) => unreachable!(),
        }
    }
    table
}

fn bench_insert_random<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "insert_random_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    let mut rng = OsRng;

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item: Vec<(u64, TestItem)> =
            items((0..size).map(|_| rng.try_next_u64().unwrap()));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("chain_hash", |b| {
            b.iter_batched(
                || hash_and_item.clone(),
                |hash_and_item| {
                    let mut table = ChainHashTable::<TestItem>::new();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v| v.eq_key(&item)) {
                            chain_hash::hash_table::Entry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            chain_hash::hash_table::Entry::Occupied(_) => unreachable!(),
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || hash_and_item.clone(),
                |hash_and_item| {
                    let mut table = HashbrownHashTable::new();
                    for (hash, item) in hash_and_item {
                        match table.entry(hash, |v: &TestItem| v.eq_key(&item), |v| v.hash_key()) {
                            HashbrownEntry::Vacant(entry) => {
                                black_box(entry.insert(item));
                            }
                            HashbrownEntry::Occupied(_) => unreachable!(),
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!(
        "find_hit_miss_{}",
        core::any::type_name::<TestItem>()
    ));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hits: Vec<(u64, TestItem)> = items((0..size as u64 * 2).step_by(2));
        let misses: Vec<(u64, TestItem)> = items((1..=size as u64 * 2).step_by(2));

        let mut lookups: Vec<(u64, TestItem)> = hits.iter().chain(misses.iter()).cloned().collect();
        lookups.shuffle(&mut SmallRng::from_os_rng());

        let chain_table = chain_table_of(&hits);
        let hashbrown_table = hashbrown_table_of(&hits);

        group.throughput(Throughput::Elements(lookups.len() as u64));
        group.bench_function("chain_hash", |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(chain_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                for (hash, item) in lookups.iter() {
                    black_box(hashbrown_table.find(*hash, |v| v.eq_key(item)));
                }
            })
        });
    }

    group.finish();
}

fn bench_remove<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item: Vec<(u64, TestItem)> = items(0..size as u64);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("chain_hash", |b| {
            b.iter_batched(
                || {
                    let mut order = hash_and_item.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (chain_table_of(&hash_and_item), order)
                },
                |(mut table, order)| {
                    for (hash, item) in order.iter() {
                        black_box(table.remove(*hash, |v| v.eq_key(item)));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function("hashbrown", |b| {
            b.iter_batched(
                || {
                    let mut order = hash_and_item.clone();
                    order.shuffle(&mut SmallRng::from_os_rng());
                    (hashbrown_table_of(&hash_and_item), order)
                },
                |(mut table, order)| {
                    for (hash, item) in order.iter() {
                        let result = match table.find_entry(*hash, |v| v.eq_key(item)) {
                            Ok(entry) => Some(entry.remove().0),
                            Err(_) => None,
                        };
                        black_box(result);
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<TestItem: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<TestItem>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let hash_and_item: Vec<(u64, TestItem)> = items(0..size as u64);
        let chain_table = chain_table_of(&hash_and_item);
        let hashbrown_table = hashbrown_table_of(&hash_and_item);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("chain_hash", |b| {
            b.iter(|| {
                let mut count = 0;
                for item in chain_table.iter() {
                    black_box(item);
                    count += 1;
                }
                black_box(count)
            })
        });

        group.bench_function("chain_hash_cursor", |b| {
            b.iter(|| {
                let mut count = 0;
                let mut cursor = chain_table.cursor();
                while let Ok(item) = cursor.next(&chain_table) {
                    black_box(item);
                    count += 1;
                }
                black_box(count)
            })
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                let mut count = 0;
                for item in hashbrown_table.iter() {
                    black_box(item);
                    count += 1;
                }
                black_box(count)
            })
        });
    }

    group.finish();
}

fn bench_map_mixed<const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_mixed_u64");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let mut rng = SmallRng::seed_from_u64(size as u64);
        let ops: Vec<(u8, u64)> = (0..size)
            .map(|_| (rng.random_range(0..4u8), rng.random_range(0..size as u64)))
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function("chain_hash", |b| {
            b.iter(|| {
                let mut map = ChainHashMap::new();
                for &(op, key) in ops.iter() {
                    match op {
                        0 | 1 => black_box(map.insert(key, key)),
                        2 => black_box(map.remove(&key)),
                        _ => black_box(map.get(&key).copied()),
                    };
                }
                black_box(map)
            })
        });

        group.bench_function("hashbrown", |b| {
            b.iter(|| {
                let mut map = hashbrown::HashMap::new();
                for &(op, key) in ops.iter() {
                    match op {
                        0 | 1 => black_box(map.insert(key, key)),
                        2 => black_box(map.remove(&key)),
                        _ => black_box(map.get(&key).copied()),
                    };
                }
                black_box(map)
            })
        });

        group.bench_function("std", |b| {
            b.iter(|| {
                let mut map = std::collections::HashMap::new();
                for &(op, key) in ops.iter() {
                    match op {
                        0 | 1 => black_box(map.insert(key, key)),
                        2 => black_box(map.remove(&key)),
                        _ => black_box(map.get(&key).copied()),
                    };
                }
                black_box(map)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallTestItem, 4>,
    bench_insert_random::<TestItem, 4>,
    bench_find_hit_miss::<SmallTestItem, 4>,
    bench_find_hit_miss::<TestItem, 4>,
    bench_remove::<SmallTestItem, 4>,
    bench_remove::<TestItem, 4>,
    bench_iteration::<SmallTestItem, 4>,
    bench_iteration::<TestItem, 3>,
    bench_map_mixed::<4>,
);

criterion_main!(benches);
