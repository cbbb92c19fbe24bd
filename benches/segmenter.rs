use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use palaver::core::i18n::Language;
use palaver::core::message::{Message, Sender};
use palaver::core::providers::ProviderId;
use palaver::ui::chat_view::ChatView;
use palaver::ui::markdown::segment_message;
use palaver::ui::math::UnicodeMathRenderer;
use palaver::ui::presenter::present;
use palaver::ui::theme::Theme;

const BLOCK: &str = "## Derivation\n\
Let $f(x) = x^2$ and consider the **integral** below.\n\
$$\\int_0^1 f(x)\\,dx = \\frac{1}{3}$$\n\
- first point with `inline code`\n\
- second point with $\\alpha + \\beta$\n\
```rust\nfn main() {\n    println!(\"{}\", 1 + 2);\n}\n```\n\
Plain closing paragraph that wraps across a terminal line or two when narrow.\n";

fn make_response(repeats: usize) -> String {
    BLOCK.repeat(repeats)
}

fn bench_segmenter(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_message");
    for &repeats in &[1usize, 16, 128] {
        let text = make_response(repeats);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(repeats), &text, |b, text| {
            b.iter(|| segment_message(text))
        });
    }
    group.finish();
}

fn bench_present_and_wrap(c: &mut Criterion) {
    let theme = Theme::dark_default();
    let mut group = c.benchmark_group("present_and_wrap");
    for &repeats in &[16usize, 128] {
        let message = Message::new(
            Sender::Assistant(ProviderId::DeepSeek),
            make_response(repeats),
        );
        group.bench_with_input(BenchmarkId::from_parameter(repeats), &message, |b, message| {
            b.iter(|| {
                // Syntax highlighting off to keep the numbers about our own code.
                let mut view = ChatView::new(theme.clone(), false);
                present(message, &UnicodeMathRenderer, Language::En, &mut view);
                let (lines, _) = view.layout(80, 40);
                lines.len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_segmenter, bench_present_and_wrap);
criterion_main!(benches);
