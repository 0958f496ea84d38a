use std::sync::Arc;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tokio::runtime::Runtime;

use assetdesk_core::ItemNo;
use assetdesk_infra::{InMemoryStore, ItemNoAllocator, ItemStore};
use assetdesk_inventory::{ItemDraft, ItemFilter, PageRequest};

fn seeded_store(rt: &Runtime, items: u32) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let now = Utc::now();
    rt.block_on(async {
        for suffix in 1..=items {
            let draft = ItemDraft {
                name: format!("Asset {suffix}"),
                model_brand: Some("Generic".to_string()),
                ..ItemDraft::default()
            };
            let item_no = ItemNo::new(25, suffix).unwrap();
            store
                .insert_item(draft.into_item(item_no, None, now))
                .await
                .unwrap();
        }
    });
    store
}

fn bench_list_active(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = seeded_store(&rt, 1_000);
    let request = PageRequest::new(3, 25).clamped();

    c.bench_function("list_active/unfiltered_page", |b| {
        b.iter(|| {
            rt.block_on(store.list_active(
                &ItemFilter::default(),
                request.offset(),
                request.limit(),
            ))
            .unwrap()
        })
    });

    let filter = ItemFilter {
        query: Some("asset 9".to_string()),
        ..ItemFilter::default()
    };
    c.bench_function("list_active/substring_filter", |b| {
        b.iter(|| {
            rt.block_on(store.list_active(&filter, request.offset(), request.limit()))
                .unwrap()
        })
    });
}

fn bench_allocation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = seeded_store(&rt, 1_000);
    let allocator = ItemNoAllocator::new(Arc::clone(&store));

    c.bench_function("allocator/next_candidate", |b| {
        b.iter_batched(
            || allocator.clone(),
            |allocator| rt.block_on(allocator.next_candidate(25)).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_list_active, bench_allocation);
criterion_main!(benches);
