use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ipgeo_inspect::{Report, Value};
use std::hint::black_box;

// Generate a response payload with `width` fields per section, nested `depth` levels deep
fn generate_payload(width: usize, depth: usize) -> String {
    fn nested(width: usize, depth: usize) -> String {
        let mut fields = Vec::with_capacity(width + 1);
        for i in 0..width {
            let value = match i % 4 {
                0 => format!("\"value_{i}\""),
                1 => (i % 8 == 1).to_string(),
                2 => format!("[\"a{i}\", \"b{i}\"]"),
                _ => "null".to_string(),
            };
            fields.push(format!("\"field_name_{i}\": {value}"));
        }
        if depth > 0 {
            fields.push(format!("\"nested_block\": {}", nested(width, depth - 1)));
        }
        format!("{{{}}}", fields.join(", "))
    }

    let section = nested(width, depth);
    format!(
        "{{\"ip\": \"8.8.8.8\", \"hostname\": \"dns.google\", \"location\": {section}, \
         \"network\": {section}, \"security\": {section}, \"time_zone\": {section}}}"
    )
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (width, depth) in [(8, 1), (32, 2), (64, 4)] {
        let body = generate_payload(width, depth);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("payload", format!("{width}x{depth}")),
            &body,
            |b, body| b.iter(|| black_box(body).parse::<Value>().unwrap()),
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for (width, depth) in [(8, 1), (32, 2), (64, 4)] {
        let payload: Value = generate_payload(width, depth).parse().unwrap();
        group.bench_with_input(
            BenchmarkId::new("report", format!("{width}x{depth}")),
            &payload,
            |b, payload| b.iter(|| Report::new(black_box(payload)).lines().len()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_render);
criterion_main!(benches);
