//! End-to-end pipeline test: crawl a scripted site, enrich the records with
//! a canned completer, persist into the in-memory sink.

use welfare_crawler::testing::{MockCompleter, MockRenderer};
use welfare_crawler::{
    persist_records, CrawlConfig, FrontierWalker, MemorySink, RecordOutcome, RelevancePipeline,
    WelfareService,
};

/// Scripted site: `/` links to `/apply` and `/about`; `/apply` is a real
/// announcement that links one level deeper; `/about` is boilerplate.
fn scripted_site() -> MockRenderer {
    MockRenderer::new()
        .with_page(
            "https://example.org/",
            "Example Foundation",
            "Welcome to the Example Foundation. We run scholarship and welfare programs for students nationwide.",
            ["https://example.org/apply", "https://example.org/about"],
        )
        .with_page(
            "https://example.org/apply",
            "2026 Scholarship",
            "scholarship application period: March 1-31. Open to undergraduate students from low-income households.",
            ["https://example.org/apply/details"],
        )
        .with_page(
            "https://example.org/about",
            "About Us",
            "Our founding history begins in 1987. Board of directors and organizational chart below.",
            Vec::<String>::new(),
        )
        .with_page(
            "https://example.org/apply/details",
            "Details",
            "Full eligibility criteria for the scholarship program.",
            Vec::<String>::new(),
        )
}

#[tokio::test]
async fn test_crawl_scenario_depth_one() {
    let walker =
        FrontierWalker::new(scripted_site()).with_config(CrawlConfig::new().with_delay_ms(0));
    let report = walker.crawl("https://example.org/", 1).await.unwrap();

    // Three records; nothing beyond depth 1 even though /apply links deeper.
    assert_eq!(report.count, 3);
    assert!(report.truncated.is_none());

    let by_url = |url: &str| report.data.iter().find(|r| r.url == url).unwrap();

    let home = by_url("https://example.org/");
    let apply = by_url("https://example.org/apply");
    let about = by_url("https://example.org/about");

    assert!(!home.excerpt.is_empty());
    assert!(apply.excerpt.contains("scholarship application period"));
    // Boilerplate-suppressed: rendered, reported, but content-free.
    assert!(about.excerpt.is_empty());
    assert!(about.error.is_none());

    assert!(report
        .data
        .iter()
        .all(|r| r.url != "https://example.org/apply/details"));

    // Excerpts are bounded and fully whitespace-collapsed.
    for record in &report.data {
        assert!(record.excerpt.chars().count() <= 1500);
        assert!(!record.excerpt.contains('\n'));
        assert!(!record.excerpt.contains('\t'));
    }
}

#[tokio::test]
async fn test_full_pipeline_persists_only_valid_records() {
    let walker =
        FrontierWalker::new(scripted_site()).with_config(CrawlConfig::new().with_delay_ms(0));
    let report = walker.crawl("https://example.org/", 1).await.unwrap();

    // The apply page verifies VALID, the home page INVALID; the about page
    // never reaches the verifier (no content).
    // Stage markers are registered before title markers: the summarize and
    // title prompts embed page titles too, and the first match wins.
    let completer = MockCompleter::new()
        .with_response(
            "1-3 sentence summary",
            "Scholarships for low-income undergraduate students; apply in March.",
        )
        .with_response(
            "generated_title",
            r#"{"generated_title": "2026 Undergraduate Scholarship",
                "target_audience": "low-income undergraduate students",
                "note": "applications close March 31",
                "categories": ["education", "low-income"]}"#,
        )
        .with_response("2026 Scholarship", "VALID")
        .with_response("Example Foundation", "INVALID");

    let pipeline = RelevancePipeline::new(completer);
    let outcomes = pipeline.enrich(&report.data).await;

    let enriched: Vec<_> = outcomes.iter().filter_map(|o| o.enriched()).cloned().collect();
    assert_eq!(enriched.len(), 1);
    assert_eq!(enriched[0].url, "https://example.org/apply");
    assert_eq!(enriched[0].categories, vec!["education", "low-income"]);

    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, RecordOutcome::Skipped { .. }))
        .count();
    assert_eq!(skipped, 1);

    let sink = MemorySink::new();
    let stored = persist_records(&sink, &enriched).await;
    assert_eq!(stored, 1);

    let services = {
        use welfare_crawler::ServiceSink;
        sink.list_services().await.unwrap()
    };
    assert_eq!(services.len(), 1);
    assert_eq!(
        services[0].service.service_id,
        WelfareService::id_for_link("https://example.org/apply")
    );
    assert_eq!(services[0].service.policy_name, "2026 Undergraduate Scholarship");
    assert_eq!(services[0].categories, vec!["education", "low-income"]);
}

#[tokio::test]
async fn test_rerunning_pipeline_converges_on_one_row() {
    let sink = MemorySink::new();

    for _ in 0..2 {
        let walker =
            FrontierWalker::new(scripted_site()).with_config(CrawlConfig::new().with_delay_ms(0));
        let report = walker.crawl("https://example.org/", 1).await.unwrap();

        let completer = MockCompleter::new()
            .with_response("output exactly", "VALID")
            .with_response("1-3 sentence summary", "Scholarships for students.")
            .with_response(
                "generated_title",
                r#"{"generated_title": "Scholarship", "categories": ["education"]}"#,
            );
        let pipeline = RelevancePipeline::new(completer);
        let outcomes = pipeline.enrich(&report.data).await;
        let enriched: Vec<_> = outcomes.iter().filter_map(|o| o.enriched()).cloned().collect();
        persist_records(&sink, &enriched).await;
    }

    // Same pages, same deterministic ids: no duplicate rows.
    assert_eq!(sink.service_count(), 2);
}
