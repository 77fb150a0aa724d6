use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgstmt::prelude::*;

#[derive(Debug, Default, Clone)]
struct Item {
    id: i64,
    sku: String,
    qty: i32,
}

static ITEMS: TableCell = TableCell::new();

impl Entity for Item {
    fn table() -> StmtResult<&'static Table> {
        ITEMS.get_or_init(|| {
            Table::builder("Item", "items")
                .alias("i")
                .field(Field::new("id", ScanKind::Int).pk())
                .field(Field::new("sku", ScanKind::Text))
                .field(Field::new("qty", ScanKind::Int))
                .build()
        })
    }

    fn field_value(&self, field: &Field) -> Value {
        match field.name() {
            "id" => self.id.into(),
            "sku" => self.sku.as_str().into(),
            "qty" => self.qty.into(),
            _ => Value::Null,
        }
    }

    fn set_field_value(&mut self, field: &Field, value: Value) -> StmtResult<()> {
        match field.name() {
            "id" => self.id = FromValue::from_value(value)?,
            "sku" => self.sku = FromValue::from_value(value)?,
            "qty" => self.qty = FromValue::from_value(value)?,
            other => return Err(StmtError::unknown_column("Item", other)),
        }
        Ok(())
    }
}

fn items(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item {
            id: i as i64,
            sku: format!("SKU-{i}"),
            qty: (i % 7) as i32,
        })
        .collect()
}

/// SELECT with `n` AND-joined predicates.
fn bench_select_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select_where");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut q = SelectQuery::new().model(type_of::<Item>());
                for i in 0..n {
                    q = q.and_where("i.qty > ?", args![i as i64]);
                }
                black_box(q.build(&PgDialect).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_insert_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/insert_rows");

    for n in [1, 10, 100, 500] {
        let data = items(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                let q = InsertQuery::new().model(rows(data));
                black_box(q.build(&PgDialect).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_where_pk_slice(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/where_pk_slice");

    for n in [10, 100, 1000] {
        let data = items(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                let q = DeleteQuery::new().model(rows(data)).where_pk();
                black_box(q.to_sql(&PgDialect).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_where,
    bench_insert_rows,
    bench_where_pk_slice
);
criterion_main!(benches);
