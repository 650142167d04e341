//! End-to-end checks of the cost distribution through the query layer.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use tendly_core::{BucketingMode, Config, TenderFilters, TenderRecord};
use tendly_features::{compute_cost_distribution, format_cost, DashboardEngine};
use tendly_ingestion::{CachedTenderSource, MemoryTenderSource, TenderSource};

fn tender(id: i64, cost: Option<f64>, sector: &str, classified: bool) -> TenderRecord {
    TenderRecord {
        estimated_cost: cost,
        is_cost_classified: classified,
        sector_code: Some(sector.to_string()),
        procedure_type_code: Some(if id % 3 == 0 { "NEGOTIATED" } else { "OPEN" }.to_string()),
        primary_cpv_name: Some(format!("Category {}", id % 7)),
        publication_date: NaiveDate::from_ymd_opt(2024, 1 + (id % 12) as u32, 10),
        submission_deadline: NaiveDate::from_ymd_opt(2024, 1 + (id % 12) as u32, 25),
        ..TenderRecord::new(id, format!("Tender {id}"))
    }
}

/// Costs from a few hundred euros to tens of millions, plus unusable rows.
fn dataset() -> Vec<TenderRecord> {
    let mut records: Vec<TenderRecord> = (1..=600)
        .map(|i| {
            let cost = 200.0 * 1.02f64.powi(i as i32);
            tender(i, Some(cost), if i % 2 == 0 { "GENERAL" } else { "UTILITIES" }, false)
        })
        .collect();
    records.push(tender(601, None, "GENERAL", false));
    records.push(tender(602, Some(0.0), "GENERAL", false));
    records.push(tender(603, Some(5_000_000.0), "GENERAL", true));
    records
}

fn included(records: &[TenderRecord]) -> usize {
    records.iter().filter(|r| r.included_cost().is_some()).count()
}

#[test]
fn test_counts_cover_every_included_record() {
    let source = MemoryTenderSource::new(dataset());
    let selections = [
        TenderFilters::default(),
        TenderFilters {
            sector_code: Some("GENERAL".to_string()),
            ..Default::default()
        },
        TenderFilters {
            cost_min: Some(10_000.0),
            cost_max: Some(2_000_000.0),
            procedure_type_code: Some("OPEN".to_string()),
            ..Default::default()
        },
    ];

    for filters in &selections {
        let records = source.fetch_filtered_records(filters).unwrap();
        for mode in [BucketingMode::Linear, BucketingMode::Logarithmic] {
            let buckets = compute_cost_distribution(&records, 50, mode).unwrap();
            assert_eq!(buckets.len(), 50);

            let counted: u64 = buckets.iter().map(|b| b.count).sum();
            assert_eq!(counted as usize, included(&records));

            for pair in buckets.windows(2) {
                assert!(pair[0].lower_bound < pair[0].upper_bound);
                assert_eq!(pair[0].upper_bound, pair[1].lower_bound);
            }
        }
    }
}

#[test]
fn test_excluded_records_never_counted() {
    let records = dataset();
    let buckets = compute_cost_distribution(&records, 50, BucketingMode::Logarithmic).unwrap();

    let total_value: f64 = buckets.iter().map(|b| b.total_value).sum();
    let expected: f64 = records.iter().filter_map(TenderRecord::included_cost).sum();
    assert_relative_eq!(total_value, expected, max_relative = 1e-9);
    assert_eq!(buckets.iter().map(|b| b.count).sum::<u64>(), 600);
}

#[test]
fn test_log_mode_balances_skewed_data() {
    let records = dataset();
    let linear = compute_cost_distribution(&records, 50, BucketingMode::Linear).unwrap();
    let log = compute_cost_distribution(&records, 50, BucketingMode::Logarithmic).unwrap();

    let max_linear = linear.iter().map(|b| b.count).max().unwrap();
    let max_log = log.iter().map(|b| b.count).max().unwrap();
    assert!(max_linear > 5 * max_log);
}

#[test]
fn test_all_classified_selection_is_empty() {
    let source = MemoryTenderSource::new(dataset());
    let records = source
        .fetch_filtered_records(&TenderFilters {
            cost_min: Some(5_000_000.0),
            cost_max: Some(5_000_000.0),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(records.len(), 1);

    let buckets = compute_cost_distribution(&records, 50, BucketingMode::Logarithmic).unwrap();
    assert!(buckets.is_empty());
}

#[test]
fn test_single_value_selection() {
    let records: Vec<TenderRecord> = (1..=4)
        .map(|i| tender(i, Some(50_000.0), "GENERAL", false))
        .collect();
    let buckets = compute_cost_distribution(&records, 50, BucketingMode::Logarithmic).unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].count, 4);
    assert_eq!(buckets[0].lower_bound, 50_000.0);
    assert_eq!(buckets[0].upper_bound, 50_000.0);
}

#[test]
fn test_label_examples() {
    assert_eq!(format_cost(1_500_000.0), "€1.5M");
    assert_eq!(format_cost(45_000.0), "€45K");
    assert_eq!(format_cost(500.0), "€500");
}

#[test]
fn test_cached_snapshot_matches_direct() {
    let cache = CachedTenderSource::new(
        MemoryTenderSource::new(dataset()),
        std::time::Duration::from_secs(600),
    );
    let engine = DashboardEngine::new(&Config::default()).unwrap();
    let filters = TenderFilters {
        sector_code: Some("UTILITIES".to_string()),
        ..Default::default()
    };

    let first = engine.snapshot(&cache.fetch_filtered_records(&filters).unwrap());
    let second = engine.snapshot(&cache.fetch_filtered_records(&filters).unwrap());

    assert_eq!(first, second);
    assert_eq!(first.summary.total_tenders, 300);
    assert_eq!(first.sectors.len(), 1);
    assert_eq!(first.sectors[0].key, "UTILITIES");
}
