use alertsync::parser;
use alertsync::types::{
    AlertsError, DeliveryMode, FetchConfig, Frequency, ResultVolume, Subscription,
};
use alertsync::FeedAggregator;
use std::sync::Once;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::info;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();
    });
}

fn subscription(name: &str, feed_address: Option<String>) -> Subscription {
    Subscription {
        id: format!("id-{}", name),
        name: name.to_string(),
        feed_address,
        delivery_mode: DeliveryMode::Feed,
        frequency: Frequency::AtMostOncePerDay,
        language: "en".to_string(),
        region: "any".to_string(),
        result_volume: ResultVolume::Best,
    }
}

fn rss_document(channel: &str, titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|title| {
            format!(
                "<item><title>{}</title><link>https://news.example.com/{}</link></item>",
                title, title
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>{}</title>{}</channel></rss>",
        channel, items
    )
}

/// Serve one HTTP response on an ephemeral local port and return the URL.
async fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut request = [0u8; 2048];
            let _ = stream.read(&mut request).await;
            let response = format!(
                "{}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{}/feed.xml", addr)
}

fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: "alertsync-test/0.1".to_string(),
        timeout_seconds: 10,
        follow_redirects: true,
        max_redirects: 5,
    }
}

#[tokio::test]
async fn missing_feed_address_yields_empty_result_with_warning() {
    init_tracing();

    let feed_url = serve_once(
        "HTTP/1.1 200 OK",
        rss_document("B alerts", &["first", "second"]),
    )
    .await;

    let subscriptions = vec![
        subscription("A", None),
        subscription("B", Some(feed_url)),
    ];

    let aggregator = FeedAggregator::new(&test_fetch_config()).expect("aggregator");
    let results = aggregator
        .aggregate(&subscriptions)
        .await
        .expect("aggregation should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].subscription_name, "A");
    assert!(results[0].entries.is_empty());
    assert_eq!(results[1].subscription_name, "B");
    assert_eq!(results[1].entries.len(), 2);
    assert_eq!(results[1].entries[0].title, "first");
    assert_eq!(results[1].entries[1].title, "second");
}

#[tokio::test]
async fn aggregation_preserves_listing_order() {
    init_tracing();

    let first = serve_once("HTTP/1.1 200 OK", rss_document("one", &["1a"])).await;
    let second = serve_once("HTTP/1.1 200 OK", rss_document("two", &["2a", "2b"])).await;
    let third = serve_once("HTTP/1.1 200 OK", rss_document("three", &["3a"])).await;

    let subscriptions = vec![
        subscription("one", Some(first)),
        subscription("two", Some(second)),
        subscription("three", Some(third)),
    ];

    let aggregator = FeedAggregator::new(&test_fetch_config()).expect("aggregator");
    let results = aggregator
        .aggregate(&subscriptions)
        .await
        .expect("aggregation should succeed");

    let names: Vec<&str> = results
        .iter()
        .map(|r| r.subscription_name.as_str())
        .collect();
    assert_eq!(names, vec!["one", "two", "three"]);
    assert_eq!(results[1].entries.len(), 2);
}

#[tokio::test]
async fn one_failed_fetch_rejects_the_whole_aggregation() {
    init_tracing();

    let good = serve_once("HTTP/1.1 200 OK", rss_document("good", &["ok"])).await;
    let broken = serve_once("HTTP/1.1 500 Internal Server Error", String::new()).await;
    let also_good = serve_once("HTTP/1.1 200 OK", rss_document("also", &["fine"])).await;

    let subscriptions = vec![
        subscription("good", Some(good)),
        subscription("broken", Some(broken.clone())),
        subscription("also-good", Some(also_good)),
    ];

    let aggregator = FeedAggregator::new(&test_fetch_config()).expect("aggregator");
    let err = aggregator
        .aggregate(&subscriptions)
        .await
        .expect_err("aggregation should fail");

    info!("aggregation error: {}", err);
    match err {
        AlertsError::FeedFetch { url, reason } => {
            assert_eq!(url, broken);
            assert!(reason.contains("500"), "reason should carry the status: {}", reason);
        }
        other => panic!("expected FeedFetch error, got {:?}", other),
    }
}

#[test]
fn parse_feed_extracts_titles_links_and_channel() {
    init_tracing();

    let parsed =
        parser::parse_feed(&rss_document("Keyword alerts", &["alpha", "beta"])).expect("parse");

    assert_eq!(parsed.title.as_deref(), Some("Keyword alerts"));
    assert_eq!(parsed.entries.len(), 2);
    assert_eq!(parsed.entries[0].title, "alpha");
    assert_eq!(
        parsed.entries[0].link.as_deref(),
        Some("https://news.example.com/alpha")
    );
}

#[test]
fn parse_feed_defaults_missing_titles() {
    init_tracing();

    let document = "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>t</title>\
                    <item><link>https://news.example.com/untitled</link></item>\
                    </channel></rss>";
    let parsed = parser::parse_feed(document).expect("parse");

    assert_eq!(parsed.entries.len(), 1);
    assert_eq!(parsed.entries[0].title, "Untitled");
}

#[test]
fn parse_feed_rejects_non_feed_content() {
    init_tracing();

    let err = parser::parse_feed("this is not a feed").expect_err("should fail");
    assert!(matches!(err, AlertsError::FeedParse(_)));
}
