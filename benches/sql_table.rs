//! Table layer benchmarks
//!
//! Projection map construction runs on every column access request and the
//! table copy touches every row, so these are the two paths measured here.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sqltable::mvcc::TransactionManager;
use sqltable::storage::BlockStore;
use sqltable::{Column, DbOid, Schema, SqlTable, SqlType, TableOid, VarlenEntry};

const TYPES: [SqlType; 6] = [
    SqlType::BigInt,
    SqlType::Varchar,
    SqlType::Integer,
    SqlType::Boolean,
    SqlType::SmallInt,
    SqlType::Timestamp,
];

fn schema(columns: usize) -> Schema {
    Schema::new(
        (0..columns)
            .map(|i| Column::new(format!("c{}", i), TYPES[i % TYPES.len()], true))
            .collect(),
    )
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_map");

    for columns in [4usize, 32, 256] {
        let table = SqlTable::new(Arc::new(BlockStore::default()), &schema(columns)).unwrap();
        let mut oids = table.column_oids();
        oids.reverse();

        group.throughput(Throughput::Elements(columns as u64));
        group.bench_with_input(BenchmarkId::new("all_columns", columns), &oids, |b, oids| {
            b.iter(|| black_box(table.projection_map_for_oids(black_box(oids)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("initializer", columns), &oids, |b, oids| {
            b.iter(|| black_box(table.initializer_for_projected_row(black_box(oids)).unwrap()));
        });
    }

    group.finish();
}

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_table");
    group.sample_size(20);

    for rows in [1_000usize, 10_000] {
        let store = Arc::new(BlockStore::default());
        let src = SqlTable::new(Arc::clone(&store), &schema(6)).unwrap();
        let mgr = TransactionManager::new();
        let mut setup = mgr.begin_txn().unwrap();
        let oids = src.column_oids();
        let (init, proj) = src.initializer_for_projected_row(&oids).unwrap();
        for i in 0..rows {
            let mut redo = setup.stage_write(DbOid::new(1), TableOid::new(1), &init);
            let row = redo.delta_mut();
            row.set_i64(proj[&oids[0]], i as i64).unwrap();
            row.set_varlen(
                proj[&oids[1]],
                VarlenEntry::from(format!("payload number {:08}", i).as_str()),
            )
            .unwrap();
            row.set_i32(proj[&oids[2]], i as i32).unwrap();
            src.insert(&mut setup, redo).unwrap();
        }
        setup.commit();

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, _| {
            b.iter_with_setup(
                || SqlTable::new(Arc::clone(&store), src.schema()).unwrap(),
                |dst| {
                    let mut txn = mgr.begin_txn().unwrap();
                    let stats = dst
                        .copy_table(&mut txn, &src, DbOid::new(1), TableOid::new(2))
                        .unwrap();
                    txn.commit();
                    black_box(stats);
                    dst
                },
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_projection, bench_copy);
criterion_main!(benches);
