//! Benchmarks for markdown rendering.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use quill_renderer::{FrontmatterStore, MarkdownRenderer};

fn document(sections: usize) -> String {
    let mut text = String::from("---\ntitle: Bench\ndescription: Rendering benchmark\n---\n");
    for i in 0..sections {
        text.push_str(&format!(
            "## Section {i}\n\nSome *prose* with `code`.\n\n[youtube https://youtu.be/id{i} 640 360]\n\n```ts\nconst a = {i};\n```\n\n"
        ));
    }
    text
}

fn bench_render(c: &mut Criterion) {
    let store = Arc::new(FrontmatterStore::default());
    let renderer = MarkdownRenderer::new(store);
    let text = document(50);

    c.bench_function("render_50_sections", |b| {
        b.iter(|| renderer.render(black_box(&text)));
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
