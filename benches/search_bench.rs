use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tsuki::search::{find_matches, SearchState};

fn large_document() -> String {
    let mut doc = String::from("{\"sites\":[\n");
    for i in 0..2000 {
        doc.push_str(&format!(
            "{{\"key\":\"source{i}\",\"name\":\"Source {i}\",\"api\":\"https://example.com/{i}\"}},\n"
        ));
    }
    doc.push_str("]}");
    doc
}

fn benchmark_find_matches(c: &mut Criterion) {
    let document = large_document();
    c.bench_function("find_matches_2000_sites", |b| {
        b.iter(|| find_matches(black_box(&document), black_box("source1")));
    });
}

fn benchmark_cyclic_navigation(c: &mut Criterion) {
    let document = large_document();
    let mut state = SearchState::new();
    state.update(&document, "source");

    c.bench_function("cyclic_navigation", |b| {
        b.iter(|| {
            for _ in 0..100 {
                black_box(state.next());
            }
        });
    });
}

criterion_group!(benches, benchmark_find_matches, benchmark_cyclic_navigation);
criterion_main!(benches);
