// ═══════════════════════════════════════════════════════════════════
// Provider Tests: CSV reference feed, Gemini client
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use etf_dividend_core::errors::{CoreError, GenerationError};
use etf_dividend_core::models::etf::Category;
use etf_dividend_core::providers::csv_feed::{parse_date, parse_reference_csv, CsvFeedProvider, CsvSource};
use etf_dividend_core::providers::gemini::GeminiClient;
use etf_dividend_core::providers::traits::{ReferenceDataProvider, TextGenerator};

const HEADER: &str = "code,name,category,issuer,type,price_start,price_recent,yield,est_yield,return_rate,return_rate_with_div,issue_date,dividends";

fn sample_csv() -> String {
    format!(
        "{HEADER}\n\
         0056,元大高股息,季一,元大,高股息,30.1,36.2,7.5,8.0,20.3,28.1,2007/12/26,2025/01/16|2025/02/13|1.07;2025/04/17|2025/05/15|0.866\n\
         00679b,元大美債20年,債券,元大,投資等級債,30,28.4,4.1,,−,,2017/01/17,\n\
         00940,元大台灣價值高息,月配,元大,高股息,10,,,,,,2024-04-01,\n"
    )
}

// ═══════════════════════════════════════════════════════════════════
// CSV parsing
// ═══════════════════════════════════════════════════════════════════

mod csv_parsing {
    use super::*;

    #[test]
    fn parses_full_row() {
        let etfs = parse_reference_csv(&sample_csv()).unwrap();
        let e = &etfs[0];
        assert_eq!(e.code, "0056");
        assert_eq!(e.name, "元大高股息");
        assert_eq!(e.category, Category::QuarterlyPhase1);
        assert_eq!(e.issuer, "元大");
        assert_eq!(e.fund_type, "高股息");
        assert_eq!(e.price_start, 30.1);
        assert_eq!(e.price_recent, 36.2);
        assert_eq!(e.annual_yield, 7.5);
        assert_eq!(e.est_yield, 8.0);
        assert_eq!(e.return_rate_with_div, 28.1);
        assert_eq!(e.issue_date, NaiveDate::from_ymd_opt(2007, 12, 26));
        assert_eq!(e.dividend_history.len(), 2);
        assert_eq!(e.dividend_history[1].amount, 0.866);
        assert_eq!(e.dividend_history[0].pay_date, NaiveDate::from_ymd_opt(2025, 2, 13).unwrap());
    }

    #[test]
    fn unparsable_number_skips_row() {
        // 00679B has a non-numeric return_rate
        let etfs = parse_reference_csv(&sample_csv()).unwrap();
        let codes: Vec<&str> = etfs.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["0056", "00940"]);
    }

    #[test]
    fn blank_price_means_no_quote() {
        let etfs = parse_reference_csv(&sample_csv()).unwrap();
        let e = etfs.iter().find(|e| e.code == "00940").unwrap();
        assert_eq!(e.price_recent, 0.0);
        assert!(!e.has_quote());
        assert_eq!(e.issue_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert!(e.dividend_history.is_empty());
    }

    #[test]
    fn code_is_uppercased_and_est_yield_defaults() {
        let text = format!("{HEADER}\n00679b,元大美債20年,債券,元大,投資等級債,30,28.4,4.1,,,,,\n");
        let etfs = parse_reference_csv(&text).unwrap();
        assert_eq!(etfs[0].code, "00679B");
        assert_eq!(etfs[0].est_yield, 4.1);
        assert_eq!(etfs[0].issue_date, None);
    }

    #[test]
    fn unknown_category_skips_row() {
        let text = format!("{HEADER}\n0050,元大台灣50,半年配,元大,市值,100,180,3,,,,,\n0056,元大高股息,季一,元大,高股息,30,36,7,,,,,\n");
        let etfs = parse_reference_csv(&text).unwrap();
        assert_eq!(etfs.len(), 1);
        assert_eq!(etfs[0].code, "0056");
    }

    #[test]
    fn bad_dividend_entry_skips_row() {
        let text = format!("{HEADER}\n0056,元大高股息,季一,元大,高股息,30,36,7,,,,,2025/01/16|1.07\n");
        assert!(parse_reference_csv(&text).unwrap().is_empty());
    }

    #[test]
    fn duplicate_code_keeps_first() {
        let text = format!(
            "{HEADER}\n0056,first,季一,,,,36,7,,,,,\n0056,second,季一,,,,37,7,,,,,\n"
        );
        let etfs = parse_reference_csv(&text).unwrap();
        assert_eq!(etfs.len(), 1);
        assert_eq!(etfs[0].name, "first");
    }

    #[test]
    fn short_rows_are_tolerated() {
        let text = format!("{HEADER}\n00878,國泰永續高股息,季二,國泰,高股息,20,22,6\n");
        let etfs = parse_reference_csv(&text).unwrap();
        assert_eq!(etfs.len(), 1);
        assert_eq!(etfs[0].category, Category::QuarterlyPhase2);
        assert_eq!(etfs[0].annual_yield, 6.0);
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_reference_csv(HEADER).unwrap().is_empty());
    }

    #[test]
    fn date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(parse_date("2025/03/07").unwrap(), expected);
        assert_eq!(parse_date(" 2025-03-07 ").unwrap(), expected);
        assert!(matches!(parse_date("07/03/2025"), Err(CoreError::ReferenceData(_))));
    }

    #[test]
    fn source_parsing() {
        assert_eq!(
            CsvSource::parse("https://example.com/etf.csv"),
            CsvSource::Url("https://example.com/etf.csv".into())
        );
        assert_eq!(
            CsvSource::parse("data/etf.csv"),
            CsvSource::Path("data/etf.csv".into())
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// CsvFeedProvider
// ═══════════════════════════════════════════════════════════════════

mod csv_feed {
    use super::*;

    #[tokio::test]
    async fn reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("etfs.csv");
        std::fs::write(&file, sample_csv()).unwrap();

        let provider = CsvFeedProvider::from_location(file.to_str().unwrap());
        assert_eq!(provider.name(), "CSV feed");
        let etfs = provider.fetch_all().await.unwrap();
        assert_eq!(etfs.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = CsvFeedProvider::new(CsvSource::Path(tmp.path().join("nope.csv")));
        assert!(matches!(provider.fetch_all().await, Err(CoreError::FileIO(_))));
    }

    #[tokio::test]
    async fn fetches_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/etfs.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_csv()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CsvFeedProvider::from_location(&format!("{}/etfs.csv", server.uri()));
        let etfs = provider.fetch_all().await.unwrap();
        assert_eq!(etfs[0].code, "0056");
    }

    #[tokio::test]
    async fn http_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/etfs.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = CsvFeedProvider::from_location(&format!("{}/etfs.csv", server.uri()));
        let err = provider.fetch_all().await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "CSV feed"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// GeminiClient
// ═══════════════════════════════════════════════════════════════════

mod gemini {
    use super::*;

    const MODEL: &str = "gemini-test";
    const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(format!("{}/", server.uri()), MODEL)
    }

    #[tokio::test]
    async fn sends_key_in_header_and_joins_parts() {
        let server = MockServer::start().await;
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "| 標的 |"}, {"text": " 配置 |"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "secret-key"))
            .and(body_string_contains("分析"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).generate("secret-key", "分析此組合").await.unwrap();
        assert_eq!(text, "| 標的 | 配置 |");

        let requests = server.received_requests().await.unwrap_or_default();
        assert!(requests.iter().all(|r| r.url.query().is_none()));
    }

    #[tokio::test]
    async fn api_key_invalid_is_unauthorized() {
        let server = MockServer::start().await;
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        }"#;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let err = client(&server).generate("bad", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server).generate("revoked", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn other_bad_request_is_api_error() {
        let server = MockServer::start().await;
        let body = r#"{"error": {"code": 400, "message": "Invalid JSON payload", "status": "INVALID_ARGUMENT"}}"#;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let err = client(&server).generate("key", "hi").await.unwrap_err();
        match err {
            GenerationError::Api { status, message, .. } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid JSON payload");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server).generate("key", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"candidates": []}"#, "application/json"))
            .mount(&server)
            .await;

        let err = client(&server).generate("key", "hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse { .. }));
    }

    #[test]
    fn defaults() {
        let c = GeminiClient::default();
        assert_eq!(c.model(), "gemini-3-flash-preview");
        assert_eq!(c.name(), "Gemini");
    }
}
