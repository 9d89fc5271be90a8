//! Performance benchmarks for marktree
//!
//! Run with: cargo bench

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use marktree::{KeySequence, Options, PulldownEngine};

/// Sample Markdown documents of various sizes
mod samples {
    pub const TINY: &str = "Hello, **world**!";

    pub const SMALL: &str = r#"# Heading

This is a paragraph with *emphasis* and **strong** text.

- Item 1
- Item 2
- Item 3

`inline code` and [a link](https://example.com).
"#;

    pub const MEDIUM: &str = r#"# Project README

A sample document exercising the render rules.

## Features

1. Token cleanup
2. Tree building
3. Rule dispatch

[![badge](https://img.shields.io/badge/x.svg)](https://example.com)

```rust
fn main() {
    println!("Hello, world!");
}
```

> A blockquote with some *emphasized* text.

| Stage | Output |
|-------|--------|
| parse | tokens |
| build | tree   |
"#;

    /// Repeat a mixed section to get a larger document
    pub fn large() -> String {
        let section = r#"
## Section Title

This paragraph contains *emphasis*, **strong**, `code` and [links](https://example.com).

- First bullet with **bold** text
  1. nested ordered item
- Second bullet with ![img](cdn.example.com/a.png)

> A blockquote that spans
> multiple lines.
"#;
        section.repeat(50)
    }

    pub fn deep_nesting() -> String {
        "> ".repeat(100) + "deep\n"
    }

    pub fn wide_root() -> String {
        "para\n\n".repeat(2000)
    }
}

fn bench_to_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_html");

    for (name, input) in [("tiny", samples::TINY), ("small", samples::SMALL), ("medium", samples::MEDIUM)] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| b.iter(|| marktree::to_html(black_box(input))));
    }

    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| b.iter(|| marktree::to_html(black_box(&large))));

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let engine = PulldownEngine::new();
    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));

    group.bench_function("parse_tokens", |b| {
        b.iter(|| marktree::parse_tokens(black_box(&large), &engine))
    });

    group.bench_function("parse_to_ast", |b| {
        b.iter(|| marktree::parse_to_ast(black_box(&large), &engine, &KeySequence::new()))
    });

    let renderer = match Options::default().into_html_renderer() {
        Ok(renderer) => renderer,
        Err(e) => panic!("default rules are complete: {e}"),
    };
    let keys = KeySequence::new();
    let nodes = marktree::parse_to_ast(&large, &engine, &keys);
    group.bench_function("render", |b| {
        b.iter_batched(|| nodes.clone(), |nodes| renderer.render(nodes, &keys), BatchSize::SmallInput)
    });

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(20);

    let nested = samples::deep_nesting();
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("deep_nesting", |b| b.iter(|| marktree::to_html(black_box(&nested))));

    let wide = samples::wide_root();
    group.throughput(Throughput::Bytes(wide.len() as u64));
    group.bench_function("wide_root", |b| b.iter(|| marktree::to_html(black_box(&wide))));

    let options = || Options {
        max_top_level_children: Some(10),
        ..Options::default()
    };
    group.bench_function("wide_root_truncated", |b| {
        b.iter(|| marktree::to_html_with_options(black_box(&wide), &PulldownEngine::new(), options()))
    });

    group.finish();
}

criterion_group!(benches, bench_to_html, bench_stages, bench_pathological);
criterion_main!(benches);
