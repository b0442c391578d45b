//! Benchmarks for content-region and title extraction.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use softnav_core::html::{self, ContentSelector};

/// Generate a page of approximately `target_bytes` with the content region
/// after a navigation bar and an inline script.
fn generate_page(target_bytes: usize) -> String {
    let header = "<!DOCTYPE html><html><head><title>Benchmark &amp; Page</title>\
        <script>if (a < b) { document.write('<main>'); }</script></head><body>\
        <nav><a href=\"/\">Home</a><a href=\"/about\">About</a></nav><main>\n";
    let footer = "</main><footer>fin</footer></body></html>";

    let section = "<section class=\"post\"><h2>Section</h2>\
        <p>Lorem ipsum dolor sit amet, <a href=\"/x?a=1&b=2\">consectetur</a> adipiscing elit.</p>\
        <!-- <main> inside a comment --><ul><li>One</li><li>Two</li></ul></section>\n";

    let mut html = String::with_capacity(target_bytes + 256);
    html.push_str(header);
    while html.len() < target_bytes {
        html.push_str(section);
    }
    html.push_str(footer);
    html
}

fn bench_extract_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_region");
    let selector = ContentSelector::default();

    for size in [10_000, 100_000, 1_000_000] {
        let page = generate_page(size);
        let label = format!("{size}B");

        group.bench_with_input(BenchmarkId::new("main", &label), &page, |b, page| {
            b.iter(|| html::extract_region(page, &selector));
        });
    }

    group.finish();
}

fn bench_extract_title(c: &mut Criterion) {
    let page = generate_page(100_000);
    c.bench_function("extract_title", |b| b.iter(|| html::extract_title(&page)));
}

criterion_group!(benches, bench_extract_region, bench_extract_title);
criterion_main!(benches);
