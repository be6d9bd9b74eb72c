use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fstio::{Column, FstReader, Table, MISSING_INT};

const NR_OF_ROWS: usize = 100_000;

fn bench_table() -> Table {
    let mut table = Table::new();
    table
        .push_column(
            "i",
            Column::Int32((0..NR_OF_ROWS).map(|r| (r / 16) as i32).collect()),
        )
        .unwrap();
    table
        .push_column(
            "d",
            Column::Double64((0..NR_OF_ROWS).map(|r| r as f64 / 32.0).collect()),
        )
        .unwrap();
    table
        .push_column(
            "s",
            Column::Character(
                (0..NR_OF_ROWS)
                    .map(|r| {
                        if r % 19 == 0 {
                            None
                        } else {
                            Some(format!("entry-{}", r % 500))
                        }
                    })
                    .collect(),
            ),
        )
        .unwrap();
    table
        .push_column(
            "f",
            Column::Factor {
                codes: (0..NR_OF_ROWS)
                    .map(|r| if r % 41 == 0 { MISSING_INT } else { (r % 5) as i32 + 1 })
                    .collect(),
                levels: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
            },
        )
        .unwrap();
    table
}

fn write_read_benchmark(c: &mut Criterion) {
    let table = bench_table();

    for level in [0u8, 40, 80] {
        c.bench_function(&format!("write level {}", level), |b| {
            b.iter(|| {
                let mut buffer = Cursor::new(Vec::new());
                fstio::write_fst(&mut buffer, black_box(&table), level).unwrap();
                black_box(buffer.into_inner().len())
            })
        });

        let mut buffer = Cursor::new(Vec::new());
        fstio::write_fst(&mut buffer, &table, level).unwrap();
        let bytes = buffer.into_inner();

        c.bench_function(&format!("read level {}", level), |b| {
            b.iter(|| {
                let mut reader = FstReader::new(Cursor::new(black_box(&bytes))).unwrap();
                black_box(reader.read_all().unwrap())
            })
        });

        let bytes_for_slice = bytes.clone();
        c.bench_function(&format!("read 1k rows level {}", level), |b| {
            let mut reader = FstReader::new(Cursor::new(bytes_for_slice.clone())).unwrap();
            b.iter(|| black_box(reader.read_range(None, 50_001, Some(51_000)).unwrap()))
        });
    }
}

criterion_group!(benches, write_read_benchmark);
criterion_main!(benches);
