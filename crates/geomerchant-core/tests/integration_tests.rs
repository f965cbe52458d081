//! Integration tests for geomerchant-core
//!
//! These tests exercise the full import → parse → cluster → resolve workflow
//! against a temporary database and the mock place search.

use chrono::NaiveDate;
use geomerchant_core::{
    db::Database,
    import::{parse_defined_companies, parse_transactions, parse_visited_locations},
    models::{NewVisitedLocation, PlaceCandidate, ResolvedRecord, VisitedLocation},
    DoubleMetaphoneEncoder, EngineConfig, MerchantPipeline, MockPlaceSearch, Oracles,
    PlaceSearchClient, SuffixTagger, WordList,
};

fn transactions_csv() -> &'static str {
    "Date,Description,Amount,City,State,Country,Latitude,Longitude
2024-03-09,Starbucks,-4.50,Seattle,WA,US,47.61,-122.33
2024-03-09,Walmart,-52.10,Seattle,WA,US,47.61,-122.33
2024-03-09,Zxqv,-9.99,Seattle,WA,US,47.61,-122.33
2024-03-09,123456,-1.00,Seattle,WA,US,47.61,-122.33
"
}

fn locations_csv() -> &'static str {
    "Date,Latitude,Longitude
2024-03-09T08:00:00,47.60,-122.30
2024-03-09T17:30:00,47.70,-122.40
"
}

fn companies_csv() -> &'static str {
    "Name,Company,Type
walmart,Walmart Inc,department_store
"
}

fn candidate(name: &str, place_id: &str, lat: f64, lng: f64) -> PlaceCandidate {
    PlaceCandidate {
        name: name.to_string(),
        place_type: Some("cafe".to_string()),
        address: Some(format!("{} address", place_id)),
        place_id: Some(place_id.to_string()),
        lat,
        lng,
    }
}

fn pipeline(db: &Database) -> MerchantPipeline {
    let oracles = Oracles::new(
        WordList::from_words(["the", "coffee", "blue", "bottle"]),
        DoubleMetaphoneEncoder::default(),
        SuffixTagger,
    );
    MerchantPipeline::new(db.clone(), oracles, EngineConfig::default())
}

fn load_fixtures(db: &Database) {
    for tx in parse_transactions(transactions_csv().as_bytes()).unwrap() {
        db.insert_transaction(&tx).unwrap();
    }
    for visit in parse_visited_locations(locations_csv().as_bytes()).unwrap() {
        db.insert_visited_location(&visit).unwrap();
    }
    for c in parse_defined_companies(companies_csv().as_bytes()).unwrap() {
        db.upsert_defined_company(&c.name, &c.company, &c.company_type)
            .unwrap();
    }
}

fn mock_search() -> MockPlaceSearch {
    MockPlaceSearch::new().with_results(
        "starbucks",
        vec![
            candidate("Starbucks Downtown", "far", 47.90, -122.90),
            candidate("Starbucks Pike", "near", 47.701, -122.401),
        ],
    )
}

fn find_id(db: &Database, description: &str) -> i64 {
    db.list_transactions(100)
        .unwrap()
        .into_iter()
        .find(|t| t.description == description)
        .map(|t| t.id)
        .unwrap()
}

// =============================================================================
// Full workflow
// =============================================================================

#[tokio::test]
async fn test_full_pipeline() {
    let db = Database::in_memory().expect("Failed to create database");
    load_fixtures(&db);
    let pipeline = pipeline(&db);

    let parsed = pipeline.parse_new_transactions().unwrap();
    assert_eq!(parsed.descriptions, 4);
    assert_eq!(parsed.skipped_numeric, 1);
    assert_eq!(parsed.fingerprints, 3);
    assert_eq!(parsed.tokens_counted, 3);

    // Single-token descriptions are their own predicted names
    let fp = db.get_fingerprint("Starbucks").unwrap().unwrap();
    assert_eq!(fp.predicted_name, "Starbucks");
    assert_eq!(fp.first_letter, Some('s'));
    assert!(db.get_fingerprint("123456").unwrap().is_none());

    let canon = pipeline.canonicalize().unwrap();
    assert_eq!(canon.fingerprints, 3);
    assert_eq!(
        db.get_general_name("Walmart").unwrap().as_deref(),
        Some("walmart")
    );

    let mock = mock_search();
    let search = PlaceSearchClient::mock(mock.clone());
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();
    assert_eq!(resolved.processed, 4);
    assert_eq!(resolved.placed, 1);
    assert_eq!(resolved.predefined, 1);
    assert_eq!(resolved.blank, 2);
    assert_eq!(resolved.failed, 0);

    // Predefined company and numeric description never reach the search
    assert_eq!(mock.call_count(), 2);

    let starbucks = db.get_resolved(find_id(&db, "Starbucks")).unwrap().unwrap();
    assert_eq!(starbucks.place_name.as_deref(), Some("Starbucks Pike"));
    assert_eq!(starbucks.place_id.as_deref(), Some("near"));
    assert_eq!(starbucks.company_type.as_deref(), Some("cafe"));
    assert_eq!(starbucks.lat, Some(47.701));
    assert_eq!(starbucks.lng, Some(-122.401));

    let walmart = db.get_resolved(find_id(&db, "Walmart")).unwrap().unwrap();
    assert_eq!(walmart.company_type.as_deref(), Some("department_store"));
    assert_eq!(walmart.place_name, None);
    assert_eq!(walmart.lat, None);

    let rows = db.list_resolved(10).unwrap();
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.resolved));
}

#[tokio::test]
async fn test_unmatched_description_gets_blank_record() {
    let db = Database::in_memory().unwrap();
    load_fixtures(&db);
    let pipeline = pipeline(&db);

    pipeline.parse_new_transactions().unwrap();
    let search = PlaceSearchClient::mock(MockPlaceSearch::new());
    pipeline.resolve_transactions(&search).await.unwrap();

    let id = find_id(&db, "Zxqv");
    assert_eq!(db.get_resolved(id).unwrap(), Some(ResolvedRecord::blank(id)));
}

#[tokio::test]
async fn test_punctuated_name_clusters_and_searches_clean() {
    let db = Database::in_memory().unwrap();
    for tx in parse_transactions(
        "Date,Description,Amount,City,Latitude,Longitude
2024-03-09,*STARBUCKS,-3.10,Seattle,47.61,-122.33
2024-03-09,STARBUCKS,-4.50,Seattle,47.61,-122.33
"
        .as_bytes(),
    )
    .unwrap()
    {
        db.insert_transaction(&tx).unwrap();
    }
    for visit in parse_visited_locations(locations_csv().as_bytes()).unwrap() {
        db.insert_visited_location(&visit).unwrap();
    }
    let pipeline = pipeline(&db);

    pipeline.parse_new_transactions().unwrap();
    let fp = db.get_fingerprint("*STARBUCKS").unwrap().unwrap();
    assert_eq!(fp.predicted_name, "*STARBUCKS");
    assert_eq!(fp.first_letter, Some('s'));

    let canon = pipeline.canonicalize().unwrap();
    assert_eq!(canon.clustered, 2);

    let search = PlaceSearchClient::mock(mock_search());
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();
    assert_eq!(resolved.placed, 2);

    let starred = db.get_resolved(find_id(&db, "*STARBUCKS")).unwrap().unwrap();
    assert_eq!(starred.place_id.as_deref(), Some("near"));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let db = Database::in_memory().unwrap();
    load_fixtures(&db);
    let pipeline = pipeline(&db);
    let mock = mock_search();
    let search = PlaceSearchClient::mock(mock.clone());

    pipeline.parse_new_transactions().unwrap();
    pipeline.canonicalize().unwrap();
    pipeline.resolve_transactions(&search).await.unwrap();

    let words_before = db.load_word_counts().unwrap();
    let stats_before = db.get_stats().unwrap();
    let calls_before = mock.call_count();

    // Only the numeric description is still unparsed, and it is skipped again
    let parsed = pipeline.parse_new_transactions().unwrap();
    assert_eq!(parsed.fingerprints, 0);
    assert_eq!(parsed.skipped_numeric, 1);
    assert_eq!(db.load_word_counts().unwrap(), words_before);

    pipeline.canonicalize().unwrap();
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();
    assert_eq!(resolved.processed, 0);
    assert_eq!(mock.call_count(), calls_before);

    let stats_after = db.get_stats().unwrap();
    assert_eq!(stats_after.fingerprints, stats_before.fingerprints);
    assert_eq!(stats_after.general_names, stats_before.general_names);
    assert_eq!(stats_after.resolved, stats_before.resolved);
}

#[tokio::test]
async fn test_duplicate_import_skipped() {
    let db = Database::in_memory().unwrap();
    load_fixtures(&db);
    load_fixtures(&db);
    assert_eq!(db.count_transactions().unwrap(), 4);
    assert_eq!(db.get_stats().unwrap().visited_locations, 2);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_missing_visited_locations_fails_only_that_transaction() {
    let db = Database::in_memory().unwrap();
    for tx in parse_transactions(transactions_csv().as_bytes()).unwrap() {
        db.insert_transaction(&tx).unwrap();
    }
    let pipeline = pipeline(&db);
    pipeline.parse_new_transactions().unwrap();

    let search = PlaceSearchClient::mock(mock_search());
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();
    assert_eq!(resolved.failed, 1);
    // Walmart is not predefined here, so it is searched and found nothing
    assert_eq!(resolved.blank, 3);

    let starbucks_id = find_id(&db, "Starbucks");
    assert!(db.get_resolved(starbucks_id).unwrap().is_none());

    // Once the day's locations arrive, the transaction resolves
    db.insert_visited_location(&NewVisitedLocation {
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        location: VisitedLocation::new(47.90, -122.89),
    })
    .unwrap();
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();
    assert_eq!(resolved.processed, 1);
    assert_eq!(resolved.placed, 1);

    let record = db.get_resolved(starbucks_id).unwrap().unwrap();
    assert_eq!(record.place_id.as_deref(), Some("far"));
}

#[tokio::test]
async fn test_search_failure_yields_blank_records() {
    let db = Database::in_memory().unwrap();
    load_fixtures(&db);
    let pipeline = pipeline(&db);
    pipeline.parse_new_transactions().unwrap();

    let mock = MockPlaceSearch::failing();
    let search = PlaceSearchClient::mock(mock.clone());
    let resolved = pipeline.resolve_transactions(&search).await.unwrap();

    assert_eq!(resolved.failed, 0);
    assert_eq!(resolved.predefined, 1);
    assert_eq!(resolved.blank, 3);
    // Starbucks and Zxqv: one attempt plus the configured retries each
    let attempts = 1 + EngineConfig::default().place_search.max_retries as usize;
    assert_eq!(mock.call_count(), 2 * attempts);
}

// =============================================================================
// Extraction through the pipeline
// =============================================================================

#[test]
fn test_connector_survives_low_scores() {
    let db = Database::in_memory().unwrap();
    let pipeline = pipeline(&db);

    let parsed = pipeline.parse_descriptions(&["the xyz123"]).unwrap();
    assert_eq!(parsed.fingerprints, 1);

    let fp = db.get_fingerprint("the xyz123").unwrap().unwrap();
    assert_eq!(fp.predicted_name, "the");

    let explanation = pipeline.explain("the xyz123").unwrap();
    assert_eq!(explanation.predicted_name.as_deref(), Some("the"));
    assert_eq!(explanation.threshold, 3.0);
    let xyz = explanation
        .decisions
        .iter()
        .find(|d| d.token == "xyz123")
        .unwrap();
    assert!(!xyz.included);
    assert!(xyz.score.unwrap() < 3.0);
}

#[test]
fn test_explain_requires_counted_tokens() {
    let db = Database::in_memory().unwrap();
    let pipeline = pipeline(&db);
    assert!(pipeline.explain("never seen before").is_err());

    let numeric = pipeline.explain("98765").unwrap();
    assert!(numeric.numeric_only);
    assert_eq!(numeric.threshold, 3.0);
    assert!(numeric.predicted_name.is_none());
}
