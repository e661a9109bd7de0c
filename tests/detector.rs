#![allow(clippy::unwrap_used)]

use orbit::arb::detector::{Detector, Miss, Outcome};
use orbit::arb::feed::{tradable, QuoteRecord, RawRate};
use orbit::config::Config;

fn records(args: &[(&str, &str, f64)]) -> Vec<QuoteRecord> {
    args.iter()
        .map(|(base, quote, rate)| QuoteRecord::new(base, quote, *rate))
        .collect()
}

fn detector() -> Detector {
    Detector::new(Config::default()).unwrap()
}

/// Currencies of the reported cycle, without the closing repeat
fn cycle_of(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Found(opportunity) => opportunity
            .legs()
            .iter()
            .map(|leg| leg.from.to_string())
            .collect(),
        Outcome::NotFound(miss) => panic!("expected an opportunity, got {miss}"),
    }
}

/// Whether `a` is a rotation of `b`
fn same_rotation(a: &[String], b: &[&str]) -> bool {
    a.len() == b.len()
        && (0..b.len()).any(|shift| a.iter().enumerate().all(|(i, c)| c == b[(i + shift) % b.len()]))
}

#[test]
fn losing_triangle_reports_nothing() {
    let detection = detector().detect(&records(&[
        ("USD", "EUR", 0.85),
        ("EUR", "GBP", 0.9),
        ("GBP", "USD", 1.30),
    ]));
    assert!(detection.opportunity().is_none());
    assert!(matches!(
        detection.outcome,
        Outcome::NotFound(Miss::NotProfitable { .. })
    ));
}

#[test]
fn winning_triangle_is_found() {
    let detection = detector().detect(&records(&[
        ("USD", "EUR", 0.90),
        ("EUR", "GBP", 0.90),
        ("GBP", "USD", 1.30),
    ]));
    let opportunity = detection.opportunity().unwrap();
    assert!((opportunity.rate() - 1.053).abs() < 1e-9);
    assert!(same_rotation(
        &cycle_of(&detection.outcome),
        &["USD", "EUR", "GBP"]
    ));
    // Reported from the smallest currency
    assert_eq!(opportunity.legs()[0].from.as_str(), "EUR");
}

#[test]
fn detection_is_idempotent() {
    let input = records(&[
        ("USD", "EUR", 0.90),
        ("EUR", "GBP", 0.90),
        ("GBP", "USD", 1.30),
        ("USD", "JPY", 150.0),
        ("JPY", "EUR", 0.0061),
        ("GBP", "JPY", 190.0),
    ]);
    let first = detector().detect(&input);
    let second = detector().detect(&input);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(
        first.opportunity().unwrap().rate().to_bits(),
        second.opportunity().unwrap().rate().to_bits()
    );
    assert_eq!(first.stats.cycles_scored, second.stats.cycles_scored);
}

#[test]
fn short_length_limit_finds_nothing() {
    let detector = Detector::new(Config {
        max_cycle_length: Some(2),
        ..Config::default()
    })
    .unwrap();
    let detection = detector.detect(&records(&[
        ("USD", "EUR", 0.90),
        ("EUR", "GBP", 0.90),
        ("GBP", "USD", 1.30),
    ]));
    assert_eq!(detection.outcome, Outcome::NotFound(Miss::NoCycles));
}

#[test]
fn longer_cycles_respect_the_limit() {
    // The only profitable cycle has four currencies
    let input = records(&[
        ("A", "B", 1.0),
        ("B", "C", 1.0),
        ("C", "D", 1.0),
        ("D", "A", 1.1),
    ]);

    let bounded = Detector::new(Config {
        max_cycle_length: Some(3),
        ..Config::default()
    })
    .unwrap()
    .detect(&input);
    assert!(bounded.opportunity().is_none());

    let unbounded = detector().detect(&input);
    assert!(same_rotation(
        &cycle_of(&unbounded.outcome),
        &["A", "B", "C", "D"]
    ));
}

#[test]
fn malformed_records_are_excluded() {
    let mut input = records(&[
        ("USD", "EUR", 0.90),
        ("EUR", "GBP", 0.90),
        ("GBP", "USD", 1.30),
    ]);
    // Would make a hugely profitable cycle if it were accepted
    input.push(QuoteRecord::new("USD", "CHF", -5.0));
    input.push(QuoteRecord::new("CHF", "USD", 0.0));
    let mut text = QuoteRecord::new("CHF", "EUR", 1.0);
    text.rate = Some(RawRate::Text("n/a".to_string()));
    input.push(text);

    let detection = detector().detect(&input);
    assert_eq!(detection.rejected.len(), 3);
    assert!(detection
        .opportunity()
        .unwrap()
        .legs()
        .iter()
        .all(|leg| leg.from.as_str() != "CHF" && leg.to.as_str() != "CHF"));
}

#[test]
fn empty_input_has_no_valid_quotes() {
    let detection = detector().detect(&[]);
    assert_eq!(detection.outcome, Outcome::NotFound(Miss::NoValidQuotes));
}

#[test]
fn untradable_records_are_filtered_before_detection() {
    let input = r#"[
        {"venue": "RPC1", "base": "USD", "quote": "EUR", "rate": "0.90"},
        {"venue": "RPC1", "base": "EUR", "quote": "GBP", "rate": 0.90},
        {"venue": "RPC2", "base": "GBP", "quote": "USD", "rate": 1.30, "is_valid": false}
    ]"#;
    let records: Vec<QuoteRecord> = serde_json::from_str(input).unwrap();
    let records = tradable(records);
    assert_eq!(records.len(), 2);

    let detection = detector().detect(&records);
    assert!(detection.rejected.is_empty());
    assert_eq!(detection.outcome, Outcome::NotFound(Miss::NoCycles));
}

#[test]
fn detection_serializes_to_json() {
    let detection = detector().detect(&records(&[
        ("USD", "EUR", 0.90),
        ("EUR", "GBP", 0.90),
        ("GBP", "USD", 1.30),
    ]));
    let json = serde_json::to_value(&detection).unwrap();
    assert!(json["outcome"]["Found"]["yield"].as_f64().is_some());
    assert_eq!(json["stats"]["exhaustive"], true);
}
