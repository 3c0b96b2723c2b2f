//! Benchmarks for canonical rendering.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use traitdex_core::{render_listing, Implementor, ImplementorMap, TraitListing, TypePath};

fn sample_listing(crates: usize, records_per_crate: usize) -> TraitListing {
    let mut map = ImplementorMap::new();
    for c in 0..crates {
        let crate_name = format!("crate_{c}");
        for r in 0..records_per_crate {
            map.push(
                crate_name.clone(),
                Implementor::new(
                    format!(
                        "impl&lt;DB&gt; Group&lt;DB&gt; for <a class=\"struct\" \
                         href=\"{crate_name}/struct.Storage{r}.html\" \
                         title=\"struct {crate_name}::Storage{r}\">Storage{r}</a>"
                    ),
                    false,
                    vec![TypePath::new(format!("{crate_name}::Storage{r}"))],
                ),
            );
        }
    }
    TraitListing::new(TypePath::new("acme::plumbing::Group"), map)
}

fn bench_render(c: &mut Criterion) {
    let small = sample_listing(6, 2);
    let large = sample_listing(100, 8);

    c.bench_function("render_listing_small", |b| {
        b.iter(|| render_listing(black_box(&small)));
    });
    c.bench_function("render_listing_large", |b| {
        b.iter(|| render_listing(black_box(&large)));
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
