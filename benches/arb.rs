use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use orbit::arb::{
    currency::{Currency, CurrencyPair},
    cycle_finder::for_each_cycle,
    detector::Detector,
    graph::ExchangeGraph,
    quote::Quote,
};
use orbit::config::Config;
use std::ops::ControlFlow;
use std::time::Duration;

/// Generate synthetic quotes between random currencies.
///
/// Rates hover around the fair cross rate implied by a random price per
/// currency, so most cycles are close to break-even and a few are profitable.
fn generate_benchmark_quotes(quote_count: usize, currency_count: usize, seed: u64) -> Vec<Quote> {
    let mut rng = fastrand::Rng::with_seed(seed);

    let currencies: Vec<Currency> = (0..currency_count)
        .map(|i| Currency::from(format!("C{i:04}").as_str()))
        .collect();
    let prices: Vec<f64> = (0..currency_count).map(|_| rng.f64() * 100.0 + 0.01).collect();

    let mut quotes = Vec::with_capacity(quote_count);
    while quotes.len() < quote_count {
        let base = rng.usize(0..currency_count);
        let quote = rng.usize(0..currency_count);
        if base == quote {
            continue;
        }
        // Up to 0.5% away from the fair rate either way
        let noise = 1.0 + (rng.f64() - 0.5) * 0.01;
        let rate = prices[base] / prices[quote] * noise;
        let pair = CurrencyPair::new(currencies[base].clone(), currencies[quote].clone());
        if let Ok(quote) = Quote::new(pair, rate) {
            quotes.push(quote.with_venue(&format!("V{}", rng.u8(0..4))));
        }
    }

    println!(
        "Generated {} quotes over {} currencies",
        quotes.len(),
        currency_count
    );
    quotes
}

/// Benchmark cycle enumeration with a length bound on growing markets
fn bench_enumerate_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_cycles");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    for quote_count in [50, 200, 1000] {
        let currency_count = (quote_count / 5).max(10);
        let graph = ExchangeGraph::from_quotes(generate_benchmark_quotes(quote_count, currency_count, 7));

        let mut cycles = 0_u64;
        let _ = for_each_cycle(&graph, Some(4), |_| {
            cycles += 1;
            ControlFlow::Continue(())
        });
        println!("{quote_count} quotes: {cycles} cycles of length <= 4");

        group.throughput(criterion::Throughput::Elements(cycles));
        group.bench_with_input(BenchmarkId::from_parameter(quote_count), &graph, |b, graph| {
            b.iter(|| {
                let mut count = 0_u64;
                let _ = for_each_cycle(black_box(graph), Some(4), |cycle| {
                    black_box(cycle);
                    count += 1;
                    ControlFlow::Continue(())
                });
                count
            });
        });
    }

    group.finish();
}

/// Benchmark the whole pipeline, sequential against parallel
fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    // (name, quote count, currency count)
    let markets = [("sparse", 300, 100), ("medium", 300, 40), ("dense", 300, 20)];

    for (name, quote_count, currency_count) in markets {
        let quotes = generate_benchmark_quotes(quote_count, currency_count, 42);
        let graph = ExchangeGraph::from_quotes(quotes);

        for parallel in [false, true] {
            let detector = Detector::new(Config {
                max_cycle_length: Some(4),
                parallel,
                ..Config::default()
            })
            .unwrap();

            let detection = detector.detect_graph(&graph);
            println!(
                "{name} (parallel: {parallel}): {} cycles in {} components, best {:?}",
                detection.stats.cycles_scored,
                detection.stats.components,
                detection.opportunity().map(|o| o.rate())
            );

            let id = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(id, name), &graph, |b, graph| {
                b.iter(|| black_box(detector.detect_graph(graph)));
            });
        }
    }

    group.finish();
}

/// Unbounded search under a time budget on a dense market
fn bench_budgeted_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("budgeted_search");
    group.sample_size(10);

    let graph = ExchangeGraph::from_quotes(generate_benchmark_quotes(400, 25, 3));
    let detector = Detector::new(Config {
        search_budget: Some(Duration::from_millis(50)),
        ..Config::default()
    })
    .unwrap();

    group.bench_function("50ms", |b| {
        b.iter(|| black_box(detector.detect_graph(&graph)));
    });

    group.finish();
}

// Criterion setup
criterion_group!(benches, bench_enumerate_cycles, bench_detect, bench_budgeted_search);
criterion_main!(benches);
