use criterion::{criterion_group, criterion_main, Criterion, black_box};
use guarded::{GuardedCell, MultiGuard};
use std::sync::Mutex;
use std::thread;

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended");

    group.bench_function("std_mutex", |b| {
        let mutex = Mutex::new(0_u64);
        b.iter(|| {
            *mutex.lock().unwrap() += 1;
            black_box(&mutex);
        })
    });

    group.bench_function("guarded_cell", |b| {
        let cell = GuardedCell::new(0_u64);
        b.iter(|| {
            *cell.lock() += 1;
            black_box(&cell);
        })
    });

    group.bench_function("guarded_cell_try_lock", |b| {
        let cell = GuardedCell::new(0_u64);
        b.iter(|| {
            if let Some(mut value) = cell.try_lock() {
                *value += 1;
            }
            black_box(&cell);
        })
    });

    group.finish();
}

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");

    const THREADS: usize = 4;
    const ITEMS: usize = 1000;

    group.bench_function("std_mutex", |b| {
        b.iter(|| {
            let mutex = Mutex::new(0_u64);
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..ITEMS {
                            *mutex.lock().unwrap() += 1;
                        }
                    });
                }
            });
            black_box(mutex.into_inner().unwrap());
        })
    });

    group.bench_function("guarded_cell", |b| {
        b.iter(|| {
            let cell = GuardedCell::new(0_u64);
            thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        for _ in 0..ITEMS {
                            *cell.lock() += 1;
                        }
                    });
                }
            });
            black_box(cell.into_inner());
        })
    });

    group.finish();
}

fn bench_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair");

    const ITEMS: usize = 1000;

    // Both threads take the pair in the same order, the only safe way with
    // plain mutexes.
    group.bench_function("std_mutex_nested", |b| {
        b.iter(|| {
            let x = Mutex::new(0_u64);
            let y = Mutex::new(0_u64);
            thread::scope(|s| {
                for _ in 0..2 {
                    s.spawn(|| {
                        for _ in 0..ITEMS {
                            let mut x = x.lock().unwrap();
                            let mut y = y.lock().unwrap();
                            *x += 1;
                            *y += 1;
                        }
                    });
                }
            });
            black_box((x.into_inner().unwrap(), y.into_inner().unwrap()));
        })
    });

    group.bench_function("multi_guard_opposite_orders", |b| {
        b.iter(|| {
            let x = GuardedCell::new(0_u64);
            let y = GuardedCell::new(0_u64);
            thread::scope(|s| {
                s.spawn(|| {
                    for _ in 0..ITEMS {
                        let mut guard = MultiGuard::new((&x, &y));
                        let (x, y) = guard.get_data_mut().unwrap();
                        *x += 1;
                        *y += 1;
                    }
                });
                s.spawn(|| {
                    for _ in 0..ITEMS {
                        let mut guard = MultiGuard::new((&y, &x));
                        let (y, x) = guard.get_data_mut().unwrap();
                        *x += 1;
                        *y += 1;
                    }
                });
            });
            black_box((x.into_inner(), y.into_inner()));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_contended, bench_pair);
criterion_main!(benches);
