//! Benchmarks for mutation dispatch.
//!
//! Measures one flush of a batch that inserts a list subtree, fanned out to
//! a growing number of subscribers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use domwatch_dom::Document;
use domwatch_observer::{collect_matches, Descent, DescentPolicy, ObserverManager, Selector, SubscribeOptions};
use std::cell::Cell;
use std::rc::Rc;

fn list(doc: &Document, items: usize) -> domwatch_dom::NodeId {
    let ul = doc.create_element("ul");
    let lis = doc.create_elements("li", items);
    for (i, li) in lis.iter().enumerate() {
        if i % 2 == 0 {
            doc.set_attribute(*li, "class", "item").unwrap();
        }
    }
    doc.append_all(ul, &lis).unwrap();
    ul
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for subscribers in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::new("insert_list_all", subscribers),
            &subscribers,
            |b, &subscribers| {
                let doc = Document::with_body();
                let body = doc.body().unwrap();
                let manager = ObserverManager::new(doc.clone());
                let hits = Rc::new(Cell::new(0usize));
                for _ in 0..subscribers {
                    let hits = hits.clone();
                    manager
                        .subscribe(
                            &body,
                            SubscribeOptions::selector("li.item")
                                .descent(DescentPolicy::uniform(Descent::All))
                                .on_add(move |_| hits.set(hits.get() + 1)),
                        )
                        .unwrap();
                }
                let ul = list(&doc, 50);

                b.iter(|| {
                    doc.append_child(body, ul).unwrap();
                    doc.remove(ul).unwrap();
                    doc.flush();
                    black_box(hits.get())
                })
            },
        );
    }

    group.finish();
}

fn bench_collect_matches(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_matches");
    let doc = Document::with_body();
    let selector = Selector::new("li.item").unwrap();

    for items in [10, 100, 1000] {
        let ul = list(&doc, items);
        for descent in [Descent::Single, Descent::All] {
            group.bench_with_input(
                BenchmarkId::new(descent.as_str(), items),
                &ul,
                |b, ul| b.iter(|| collect_matches(&doc, Some(&selector), descent, black_box(ul))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_collect_matches);
criterion_main!(benches);
