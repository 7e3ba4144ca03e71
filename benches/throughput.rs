use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use profilog::{
    core::store::{ProfileFilter, ProfileStore},
    profile::{NotificationPrefs, ProfileDraft, ProfilePatch, PushMode, Residency},
    types::Country,
};

fn draft(i: u64) -> ProfileDraft {
    let (state, district) = if i % 2 == 0 {
        ("Karnataka", "Bengaluru")
    } else {
        ("Maharashtra", "Pune")
    };
    ProfileDraft {
        username: format!("user{i}"),
        about: String::new(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: format!("user{i}@example.com"),
        residency: Residency::India {
            state: state.to_string(),
            district: district.to_string(),
            postal_code: "560034".to_string(),
        },
        street_address: "12 MG Road".to_string(),
        avatar_data_url: None,
        notifications: NotificationPrefs::default(),
        push_notifications: PushMode::default(),
    }
}

fn bench_creates(c: &mut Criterion) {
    c.bench_function("store_create_5k", |b| {
        b.iter(|| {
            let mut store = ProfileStore::new();
            for i in 0..5_000u64 {
                let _ = store.create(draft(i));
            }
        });
    });
}

fn bench_updates(c: &mut Criterion) {
    c.bench_function("store_update_5k", |b| {
        b.iter(|| {
            let mut store = ProfileStore::new();
            let mut ids = Vec::new();
            for i in 0..5_000u64 {
                ids.push(store.create(draft(i)));
            }
            for (i, id) in ids.iter().enumerate() {
                let _ = store.update(
                    id,
                    ProfilePatch {
                        email: Some(format!("changed{i}@example.com")),
                        ..ProfilePatch::default()
                    },
                );
            }
        });
    });
}

fn bench_filtered_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_query");
    let mut store = ProfileStore::new();
    for i in 0..10_000u64 {
        let _ = store.create(draft(i));
    }

    let filters = [
        ("all", ProfileFilter::default()),
        (
            "country",
            ProfileFilter {
                country: Some(Country::India),
                ..ProfileFilter::default()
            },
        ),
        (
            "state_district",
            ProfileFilter {
                country: Some(Country::India),
                state: Some("Karnataka".to_string()),
                district: Some("Bengaluru".to_string()),
            },
        ),
    ];

    for (name, filter) in filters {
        group.bench_with_input(BenchmarkId::from_parameter(name), &filter, |b, filter| {
            b.iter(|| {
                let _ = store.filtered(filter);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_creates, bench_updates, bench_filtered_query);
criterion_main!(benches);
