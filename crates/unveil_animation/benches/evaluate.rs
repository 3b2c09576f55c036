use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unveil_animation::{AnimationPreset, Easing, Stagger, Timeline};
use unveil_core::{Property, PropertySet};

fn bench_evaluate(c: &mut Criterion) {
    let cards = AnimationPreset::CardEntrance
        .timeline(Stagger::Each(0.2))
        .expect("preset builds");
    let group: Vec<u32> = (0..12).collect();

    c.bench_function("evaluate_card_group_12", |b| {
        b.iter(|| cards.evaluate(black_box(0.37), &group))
    });

    let clip = Timeline::builder()
        .initial(
            PropertySet::new()
                .with(Property::WIDTH, 400.0)
                .with(Property::BORDER_RADIUS, 24.0)
                .with(Property::OPACITY, 0.0),
        )
        .to(
            PropertySet::new()
                .with(Property::WIDTH, 1280.0)
                .with(Property::BORDER_RADIUS, 0.0),
            1.0,
            "power2.inOut".parse::<Easing>().expect("easing parses"),
        )
        .to_at(
            ">0.2".parse().expect("position parses"),
            PropertySet::new().with(Property::OPACITY, 1.0),
            0.5,
            Easing::Linear,
        )
        .build()
        .expect("timeline builds");

    c.bench_function("sample_scrubbed_clip", |b| {
        b.iter(|| clip.sample(black_box(0.61)))
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
