use catalog_search::backend::{HttpBackend, SearchBackend, SearchRequest};
use catalog_search::error::SearchError;
use catalog_search::facets::FacetSelections;
use mockito::{Matcher, Server};
use std::time::Duration;

const RESPONSE: &str = r#"{
    "items": [
        {"id": "r1", "title": "Groundwater levels", "authors": ["Ada"], "date": "2021-04-01"},
        {"id": "r2", "title": "Water quality survey"}
    ],
    "total": 12,
    "page_size": 10,
    "facets": {
        "type": [
            {"label": "Article", "value": "article", "count": 7},
            {"label": "Dataset", "value": "dataset", "count": 5}
        ]
    }
}"#;

fn request(facets: FacetSelections) -> SearchRequest {
    SearchRequest {
        text: "water".to_string(),
        page: 2,
        page_size: 10,
        facets,
    }
}

fn backend(server: &Server) -> HttpBackend {
    HttpBackend::new(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_sends_query_and_decodes_result() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/search/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "water".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("page_size".into(), "10".into()),
            Matcher::UrlEncoded("type".into(), "article".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(RESPONSE)
        .create_async()
        .await;

    let facets = FacetSelections::new().toggle("type", "article");
    let result = backend(&server).search(request(facets)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(result.total, 12);
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].authors, ["Ada"]);
    assert_eq!(result.items[1].date, None);
    assert_eq!(result.facets["type"][1].count, 5);
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let err = backend(&server)
        .search(request(FacetSelections::new()))
        .await
        .unwrap_err();
    assert_eq!(err, SearchError::status(500, "Internal Server Error"));
}

#[tokio::test]
async fn test_unexpected_body_is_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/search/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": []}"#)
        .create_async()
        .await;

    let err = backend(&server)
        .search(request(FacetSelections::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Malformed { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_failure() {
    let backend = HttpBackend::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = backend
        .search(request(FacetSelections::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport { status: None, .. }));
}
