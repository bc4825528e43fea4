// Integration tests for comps
use comps_core::{CorpusFilter, Listing, ListingStore};
use comps_engine::{
    EstimatorConfig, MarketStatsAggregator, NeighborSelector, PriceEstimator, PriceRange,
    SimilarityEngine, Valuator,
};
use comps_store::{ListingCorpus, StoreManager};
use std::sync::Arc;

fn comparable(id: &str, city: &str, price: i64, area: f64) -> Listing {
    Listing::new(id)
        .with_city(city)
        .with_price(price)
        .with_area(area)
}

#[test]
fn test_corpus_upsert_and_query() {
    let corpus = ListingCorpus::new();
    corpus.upsert(comparable("a1", "Riverton", 98_000, 58.0)).unwrap();
    corpus.upsert(comparable("a2", "Riverton", 104_000, 61.0)).unwrap();
    corpus.upsert(comparable("b1", "Lakewood", 75_000, 44.0)).unwrap();
    assert_eq!(corpus.count(), 3);

    let riverton = corpus
        .query(&CorpusFilter::new().with_city("riverton"))
        .unwrap();
    assert_eq!(riverton.len(), 2);

    let everything = corpus.query(&CorpusFilter::new()).unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn test_selector_excludes_self_and_ranks() {
    let corpus = Arc::new(ListingCorpus::new());
    corpus.upsert(comparable("t", "Riverton", 90_000, 60.0)).unwrap();
    corpus.upsert(comparable("near", "Riverton", 95_000, 63.0)).unwrap();
    corpus.upsert(comparable("far", "Riverton", 70_000, 120.0)).unwrap();

    let target = corpus.get_by_str("t").unwrap();
    let selector = NeighborSelector::new(SimilarityEngine::default(), corpus);
    let neighbors = selector.find(&target, None).unwrap();

    assert_eq!(neighbors.len(), 2);
    assert_eq!(neighbors[0].listing.id.to_string(), "near");
    assert!(neighbors[0].score > neighbors[1].score);
}

#[test]
fn test_end_to_end_weighted_valuation() {
    // Candidates share exactly one comparable feature with the target (total
    // area), so each similarity is the area clamp directly: 0.9, 0.8, 0.85.
    let corpus = Arc::new(ListingCorpus::new());
    corpus.upsert(comparable("c1", "Riverton", 1_000_000, 50.0)).unwrap();
    corpus.upsert(comparable("c2", "Riverton", 1_100_000, 40.0)).unwrap();
    corpus.upsert(comparable("c3", "Riverton", 1_050_000, 45.0)).unwrap();

    let target = Listing::new("target").with_area(60.0);

    let selector = NeighborSelector::new(SimilarityEngine::default(), corpus);
    let valuator = Valuator::new(selector, PriceEstimator::default());
    let estimate = valuator.value(&target).unwrap();

    let (s1, s2, s3) = (1.0 - 10.0 / 100.0, 1.0 - 20.0 / 100.0, 1.0 - 15.0 / 100.0);
    // Summed in the estimator's similarity-descending order.
    let expected =
        (1_000_000.0 * s1 + 1_050_000.0 * s3 + 1_100_000.0 * s2) / (s1 + s3 + s2);

    assert_eq!(estimate.estimated_price, expected as i64);
    assert_eq!(estimate.similar_properties_count, 3);
    // floor(3 * 0.1) = 0 and floor(3 * 0.9) = 2: percentile indices coincide
    // with min and max at this sample size.
    assert_eq!(
        estimate.price_range,
        PriceRange { min: 1_000_000, max: 1_100_000 }
    );
    assert!(estimate.confidence <= 0.95);
    assert_eq!(estimate.method, "knn_weighted_average");
    assert_eq!(estimate.similar_properties.len(), 3);
    assert_eq!(estimate.similar_properties[0].id.to_string(), "c1");
}

#[test]
fn test_valuation_with_no_qualifying_comparables() {
    // A corpus exists, but nothing clears the similarity threshold.
    let corpus = Arc::new(ListingCorpus::new());
    corpus.upsert(comparable("other", "Lakewood", 80_000, 45.0)).unwrap();

    let target = Listing::new("target").with_city("Riverton").with_area(60.0);

    let selector = NeighborSelector::new(SimilarityEngine::default(), corpus);
    let valuator = Valuator::new(selector, PriceEstimator::default());

    assert!(valuator.value(&target).is_err());
}

#[test]
fn test_estimator_threshold_per_call_config() {
    let corpus = Arc::new(ListingCorpus::new());
    let mut candidate = comparable("c", "Lakewood", 80_000, 45.0);
    candidate.rooms = Some(3);
    corpus.upsert(candidate).unwrap();

    // The target shares exactly one feature (room count) and it mismatches,
    // so the candidate is retrievable but scores exactly 0.0.
    let mut target = Listing::new("t");
    target.rooms = Some(2);

    let selector = NeighborSelector::new(SimilarityEngine::default(), corpus);
    let neighbors = selector.find(&target, None).unwrap();
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].score, 0.0);

    // The default threshold filters the zero-similarity match out...
    assert!(PriceEstimator::default().estimate(&neighbors).is_err());

    // ...while a permissive threshold admits it, exercising the unweighted
    // mean fallback for zero total weight.
    let permissive = PriceEstimator::new(EstimatorConfig {
        min_similarity: -1.0,
        ..EstimatorConfig::default()
    });
    let estimate = permissive.estimate(&neighbors).unwrap();
    assert_eq!(estimate.estimated_price, 80_000);
}

#[test]
fn test_similarity_invariants_over_random_pairs() {
    use rand::prelude::*;

    fn random_listing(rng: &mut rand::rngs::ThreadRng, id: usize) -> Listing {
        let cities = ["Riverton", "Lakewood", "Fairview"];
        let mut l = Listing::new(format!("r{id}"));
        if rng.random_bool(0.8) {
            l.city = Some(cities[rng.random_range(0..cities.len())].to_string());
        }
        if rng.random_bool(0.8) {
            l.area_total = Some(rng.random_range(20.0..150.0));
        }
        if rng.random_bool(0.5) {
            l.rooms = Some(rng.random_range(1..5));
        }
        if rng.random_bool(0.5) {
            l.floor = Some(rng.random_range(1..20));
            l.total_floors = Some(rng.random_range(1..25));
        }
        if rng.random_bool(0.5) {
            l.year_built = Some(rng.random_range(1950..2024));
        }
        if rng.random_bool(0.4) {
            l.has_balcony = Some(rng.random_bool(0.5));
        }
        l
    }

    let mut rng = rand::rng();
    let engine = SimilarityEngine::default();

    for i in 0..100 {
        let a = random_listing(&mut rng, i);
        let b = random_listing(&mut rng, i + 1000);

        let score = engine.score(&a, &b);
        assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        assert_eq!(score, engine.score(&b, &a), "asymmetric score");

        // Self-similarity is 1.0 whenever any feature is present, 0.0
        // otherwise.
        let self_score = engine.score(&a, &a);
        assert!(self_score == 0.0 || (self_score - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_market_stats_over_corpus() {
    let corpus = Arc::new(ListingCorpus::new());
    corpus.upsert(comparable("a", "Riverton", 100_000, 50.0)).unwrap();
    corpus.upsert(comparable("b", "Riverton", 200_000, 100.0)).unwrap();
    corpus.upsert(comparable("c", "Lakewood", 999_000, 150.0)).unwrap();

    let aggregator = MarketStatsAggregator::new(corpus);
    let stats = aggregator.aggregate(Some("Riverton"), None).unwrap().unwrap();

    assert_eq!(stats.total_listings, 2);
    assert_eq!(stats.avg_price, 150_000);
    assert_eq!(stats.avg_price_per_sqm, 2_000);
    assert_eq!(stats.min_price, 100_000);
    assert_eq!(stats.max_price, 200_000);

    assert!(aggregator.aggregate(Some("Nowhere"), None).unwrap().is_none());
}

#[test]
fn test_store_manager_snapshot_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();

    {
        let store = StoreManager::open_without_autosave(temp_dir.path()).unwrap();
        for i in 0..10 {
            store
                .corpus()
                .upsert(comparable(
                    &format!("l{i}"),
                    "Riverton",
                    90_000 + i * 1_000,
                    50.0 + i as f64,
                ))
                .unwrap();
        }
        store.save().unwrap();
    }

    // Reopen (simulates restart) and value against the restored corpus.
    let store = StoreManager::open_without_autosave(temp_dir.path()).unwrap();
    assert_eq!(store.count(), 10);

    let target = Listing::new("target").with_city("Riverton").with_area(55.0);
    let selector = NeighborSelector::new(SimilarityEngine::default(), store.corpus());
    let valuator = Valuator::new(selector, PriceEstimator::default());
    let estimate = valuator.value(&target).unwrap();

    assert!(estimate.estimated_price >= 90_000);
    assert!(estimate.estimated_price <= 99_000);
    assert_eq!(estimate.similar_properties_count, 10);
    assert_eq!(estimate.similar_properties.len(), 5);
}
