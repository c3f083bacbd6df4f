//! Integration tests for the esearch/efetch pair using mocked HTTP responses.
//!
//! wiremock stands in for NCBI so no real API calls are made.

use pubmed_industry::{load_csv, save_csv, ClientConfig, FetcherError, PaperRecord, PubMedClient};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EFETCH_EXAMPLE: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">12345</PMID>
      <Article PubModel="Print">
        <ArticleTitle>Example</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Biotech Inc.</Affiliation>
            </AffiliationInfo>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

const EFETCH_TWO_ARTICLES: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">222</PMID>
      <Article>
        <ArticleTitle>Checkpoint inhibitors in practice</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Rossi</LastName>
            <ForeName>Marco</ForeName>
            <AffiliationInfo>
              <Affiliation>Clinical Development, Helix Pharmaceuticals, Milan, Italy. marco.rossi@helix.example.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author>
            <LastName>Bauer</LastName>
            <ForeName>Lena</ForeName>
            <AffiliationInfo>
              <Affiliation>Department of Oncology, University of Vienna, Austria.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author>
            <LastName>Novak</LastName>
            <ForeName>Petr</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">111</PMID>
      <Article>
        <ArticleTitle>Tumour microenvironment review</ArticleTitle>
        <AuthorList>
          <Author>
            <LastName>Smith</LastName>
            <ForeName>Ann</ForeName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

fn esearch_body(ids: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "header": {"type": "esearch", "version": "0.3"},
        "esearchresult": {
            "count": ids.len().to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
}

fn client_for(server: &MockServer) -> PubMedClient {
    PubMedClient::new(ClientConfig::with_base_url(server.uri())).expect("client builds")
}

#[tokio::test]
async fn test_search_sends_expected_params_and_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("term", "cancer immunotherapy"))
        .and(query_param("retmode", "json"))
        .and(query_param("retmax", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&["30", "10", "20"])))
        .expect(1)
        .mount(&server)
        .await;

    let ids = client_for(&server).search("cancer immunotherapy", 3).await;
    assert_eq!(ids, vec!["30", "10", "20"]);
}

#[tokio::test]
async fn test_search_never_exceeds_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(esearch_body(&["5", "4", "3", "2", "1"])),
        )
        .mount(&server)
        .await;

    let ids = client_for(&server).search("anything", 2).await;
    assert_eq!(ids, vec!["5", "4"]);
}

#[tokio::test]
async fn test_search_zero_matches_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&[])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search("zzzz no such topic", 10).await.is_empty());
    assert!(client
        .try_search("zzzz no such topic", 10)
        .await
        .expect("zero matches is not an error")
        .is_empty());
}

#[tokio::test]
async fn test_search_http_500_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search("cancer", 10).await.is_empty());

    let err = client.try_search("cancer", 10).await.expect_err("500 is a failure");
    assert!(matches!(err, FetcherError::Api { code: 500, .. }));
}

#[tokio::test]
async fn test_search_malformed_json_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search("cancer", 10).await.is_empty());
    assert!(matches!(
        client.try_search("cancer", 10).await,
        Err(FetcherError::Json(_))
    ));
}

#[tokio::test]
async fn test_search_timeout_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(esearch_body(&["1"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(200),
        ..ClientConfig::with_base_url(server.uri())
    };
    let client = PubMedClient::new(config).expect("client builds");

    assert!(client.search("slow", 1).await.is_empty());
}

#[tokio::test]
async fn test_fetch_details_empty_ids_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_EXAMPLE))
        .expect(0)
        .mount(&server)
        .await;

    let records = client_for(&server).fetch_details(&[]).await;
    assert!(records.is_empty());
    // expect(0) is verified when the server drops
}

#[tokio::test]
async fn test_fetch_details_single_batched_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "pubmed"))
        .and(query_param("id", "222,111"))
        .and(query_param("retmode", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_TWO_ARTICLES))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec!["222".to_string(), "111".to_string()];
    let records = client_for(&server).fetch_details(&ids).await;

    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.pubmed_id, "222");
    assert_eq!(first.authors, "Marco Rossi, Lena Bauer");
    assert_eq!(
        first.company_affiliations,
        "Clinical Development, Helix Pharmaceuticals, Milan, Italy. marco.rossi@helix.example."
    );
    assert_eq!(
        first.corresponding_author_email,
        "Clinical Development, Helix Pharmaceuticals, Milan, Italy. marco.rossi@helix.example."
    );

    let second = &records[1];
    assert_eq!(second.pubmed_id, "111");
    assert_eq!(second.authors, "");
    assert_eq!(second.company_affiliations, "N/A");
    assert_eq!(second.corresponding_author_email, "N/A");
}

#[tokio::test]
async fn test_fetch_details_http_error_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ids = vec!["1".to_string()];
    assert!(client_for(&server).fetch_details(&ids).await.is_empty());
}

#[tokio::test]
async fn test_fetch_details_malformed_xml_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<PubmedArticleSet><PubmedArticle><PMID>1</PMID>"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids = vec!["1".to_string()];
    assert!(client.fetch_details(&ids).await.is_empty());
    assert!(matches!(
        client.try_fetch_details(&ids).await,
        Err(FetcherError::XmlParse(_))
    ));
}

#[tokio::test]
async fn test_end_to_end_scenario_exports_expected_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "cancer immunotherapy"))
        .and(query_param("retmax", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(esearch_body(&["12345"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_EXAMPLE))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ids = client.search("cancer immunotherapy", 1).await;
    assert_eq!(ids, vec!["12345"]);

    let records = client.fetch_details(&ids).await;
    let expected = PaperRecord {
        title: "Example".to_string(),
        pubmed_id: "12345".to_string(),
        authors: "Jane Doe".to_string(),
        company_affiliations: "Acme Biotech Inc.".to_string(),
        corresponding_author_email: "N/A".to_string(),
    };
    assert_eq!(records, vec![expected]);

    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("pubmed_papers.csv");
    assert_eq!(save_csv(&csv_path, &records).expect("write CSV"), 1);
    assert_eq!(load_csv(&csv_path).expect("read CSV"), records);
}
