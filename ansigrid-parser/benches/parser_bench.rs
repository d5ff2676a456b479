use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use ansigrid_parser::{Action, Parser};

fn bench_parser(c: &mut Criterion) {
    let mut plain = Vec::new();
    for i in 0..1000 {
        plain.extend_from_slice(format!("line number {i} with some text\n").as_bytes());
    }

    let mut styled = Vec::new();
    for i in 0..1000 {
        styled.extend_from_slice(
            format!("\x1b[1;32mok\x1b[0m \x1b[38;5;208mline {i}\x1b[0m\r\n").as_bytes(),
        );
    }

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let mut count = 0usize;
            parser.parse(black_box(&plain), |action| {
                if matches!(action, Action::Print(_)) {
                    count += 1;
                }
            });
            count
        })
    });

    group.throughput(Throughput::Bytes(styled.len() as u64));
    group.bench_function("sgr_heavy", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let mut count = 0usize;
            parser.parse(black_box(&styled), |action| {
                if matches!(action, Action::Csi(_)) {
                    count += 1;
                }
            });
            count
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
