use aura_relay::domains::envelope::InboundMessage;
use aura_relay::services::endpoint::EndpointResolver;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn bench_parse_and_resolve(c: &mut Criterion) {
    let text = json!({
        "op": 0,
        "d": {"user": "u-1", "items": [1, 2, 3], "note": "bench"},
        "t": "BILLING_CHARGE_CREATE",
        "s": 42
    })
    .to_string();
    let resolver = EndpointResolver::default();

    let mut group = c.benchmark_group("dispatch");
    group.bench_function("parse_text", |b| {
        b.iter(|| {
            InboundMessage::Text(black_box(text.clone()))
                .parse(true)
                .unwrap()
        })
    });
    group.bench_function("parse_and_resolve", |b| {
        b.iter(|| {
            let envelope = InboundMessage::Text(black_box(text.clone()))
                .parse(true)
                .unwrap();
            resolver.resolve(&envelope.t)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse_and_resolve);
criterion_main!(benches);
