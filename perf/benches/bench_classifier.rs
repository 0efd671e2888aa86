//! Binding suggestion handling. Rare at runtime, but it runs on the
//! application's thread during startup.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stride_abi::{ActionHandle, InteractionProfileSuggestedBinding, Path};
use stride_core::{BindingClassifier, BindingKind};
use stride_perf::{profile_bindings, session};

fn bench_classify(c: &mut Criterion) {
    let paths = [
        "/user/hand/left/input/thumbstick",
        "/user/hand/left/input/thumbstick/y",
        "/user/hand/left/input/thumbstick/x",
        "/user/hand/right/input/thumbstick",
        "/user/hand/left/input/trigger/value",
    ];
    c.bench_function("binding_kind_classify", |b| {
        b.iter(|| {
            for path in paths {
                black_box(BindingKind::classify(black_box(path)));
            }
        });
    });

    c.bench_function("classifier_observe", |b| {
        let classifier = BindingClassifier::new();
        b.iter(|| {
            let bindings = paths
                .iter()
                .enumerate()
                .map(|(i, path)| (ActionHandle(i as u64), *path));
            black_box(classifier.observe(bindings))
        });
    });
}

fn bench_suggest(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggest_bindings");
    for actions in [8u64, 64, 256] {
        let bindings = profile_bindings(actions);
        group.bench_with_input(BenchmarkId::from_parameter(actions), &bindings, |b, bindings| {
            b.iter(|| {
                let session = session(0.5);
                let suggested = InteractionProfileSuggestedBinding::new(Path(500), bindings);
                black_box(session.suggest_interaction_profile_bindings(session.instance(), &suggested))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify, bench_suggest);
criterion_main!(benches);
