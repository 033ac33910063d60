use sleuth::RequestOptions;

use crate::helpers::{builder, cache_dir, searcher};

#[tokio::test]
async fn max_results_is_forwarded_to_the_provider() {
    let dir = cache_dir();
    let a = searcher("a");
    let sleuth = builder(&dir, &["a"]).with_connector(a.clone()).build().unwrap();

    let report = sleuth
        .search("q", &RequestOptions::new().max_results(2))
        .await;

    assert_eq!(report.response.result_count(), 2);
    assert_eq!(a.seen(), ["q"]);
}

#[test]
fn default_limit_applies_outside_an_async_test() {
    let dir = cache_dir();
    let sleuth = builder(&dir, &["a"])
        .with_connector(searcher("a"))
        .build()
        .unwrap();

    let report = tokio_test::block_on(sleuth.search("q", &RequestOptions::new()));
    assert!(report.response.success());
    assert_eq!(report.response.result_count(), 3);
}
