//! Page Preflight Integration Test
//!
//! Serves the download page from a local HTTP server and validates the
//! static link check used by `doctor --online`:
//! - Both download links resolved with hrefs made absolute
//! - Missing links reported as absent
//! - HTTP status carried through

use goatherd::page;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOWNLOAD_PAGE: &str = r#"<!doctype html>
<html>
  <body>
    <nav><a href="/">Home</a></nav>
    <main>
      <h1>Downloads</h1>
      <ul>
        <li><a href="/download/card-definitions.zip">Card definitions</a></li>
        <li><a href="/download/price-history.zip">Price history</a></li>
      </ul>
    </main>
  </body>
</html>"#;

async fn serve(body: &str, status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download-prices"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn preflight_finds_both_links() {
    let server = serve(DOWNLOAD_PAGE, 200).await;
    let url = format!("{}/download-prices", server.uri());

    let check = page::preflight(&url).await.unwrap();

    assert_eq!(check.status, 200);
    assert!(check.ready());

    let price = check.price_link.unwrap();
    assert_eq!(
        price.href,
        format!("{}/download/price-history.zip", server.uri())
    );
    assert_eq!(price.text, "Price history");

    let defs = check.definitions_link.unwrap();
    assert!(defs.href.ends_with("/download/card-definitions.zip"));
    assert_eq!(defs.text, "Card definitions");
}

#[tokio::test]
async fn preflight_reports_missing_definitions_link() {
    let body = r#"<html><body><main>
        <a href="/download/price-history.zip">Price history</a>
    </main></body></html>"#;
    let server = serve(body, 200).await;
    let url = format!("{}/download-prices", server.uri());

    let check = page::preflight(&url).await.unwrap();

    assert!(check.price_link.is_some());
    assert!(check.definitions_link.is_none());
    assert!(!check.ready());
}

#[tokio::test]
async fn preflight_carries_http_status() {
    let server = serve("<html><body><main></main></body></html>", 503).await;
    let url = format!("{}/download-prices", server.uri());

    let check = page::preflight(&url).await.unwrap();

    assert_eq!(check.status, 503);
    assert!(!check.ready());
}
