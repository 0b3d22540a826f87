use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use market_collector_lib::constituents::{DataHubSource, WikipediaSource};
use market_collector_lib::pipeline::collect;
use market_collector_lib::{
    BulkDownloader, CollectConfig, CollectError, CsvDirectory, DailyBar, DateRange,
    DownloadError, FixedClock, NoopObserver, PriceProvider, Ticker, TickerResolver,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

type RequestLog = Arc<Mutex<Vec<String>>>;

struct CannedProvider {
    bars: HashMap<String, Vec<DailyBar>>,
    requests: RequestLog,
}

impl CannedProvider {
    fn new(symbols: &[&str], requests: &RequestLog) -> Self {
        let bars = symbols
            .iter()
            .map(|s| {
                let day = |d: u32, px: f64| DailyBar {
                    date: date(2024, 1, d),
                    open: px,
                    high: px + 2.0,
                    low: px - 2.0,
                    close: px + 1.0,
                    adj_close: px + 0.5,
                    volume: 5_000.0,
                };
                (s.to_string(), vec![day(2, 100.0), day(3, 102.0), day(4, 104.0)])
            })
            .collect();
        Self {
            bars,
            requests: Arc::clone(requests),
        }
    }
}

#[async_trait::async_trait]
impl PriceProvider for CannedProvider {
    async fn daily_history(
        &self,
        symbol: &str,
        _range: &DateRange,
    ) -> Result<Vec<DailyBar>, DownloadError> {
        self.requests.lock().unwrap().push(symbol.to_string());
        self.bars
            .get(symbol)
            .cloned()
            .ok_or_else(|| DownloadError::ParseFailed(format!("no data for {}", symbol)))
    }
}

fn config() -> CollectConfig {
    let mut config = CollectConfig::new(&FixedClock(date(2024, 1, 5)));
    config.start = date(2024, 1, 1);
    config.extra_tickers = vec![Ticker::normalize("ARKK")];
    config
}

async fn mount_failing_wikipedia(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/wiki"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_datahub(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/constituents.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn resolver(server: &MockServer) -> TickerResolver<WikipediaSource, DataHubSource> {
    TickerResolver::new(
        WikipediaSource::with_url(&format!("{}/wiki", server.uri())).unwrap(),
        DataHubSource::with_url(&format!("{}/constituents.csv", server.uri())).unwrap(),
    )
}

#[tokio::test]
async fn fallback_resolution_feeds_download_and_writes_both_files() {
    let server = MockServer::start().await;
    mount_failing_wikipedia(&server).await;
    mount_datahub(&server, "Symbol,Security\nAAPL,Apple Inc.\nBRK.B,Berkshire Hathaway\n").await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    let requests = RequestLog::default();

    let downloader = BulkDownloader::new(CannedProvider::new(
        &["AAPL", "BRK-B", "^GSPC", "GC=F", "^IRX", "ARKK"],
        &requests,
    ));
    let mut sink = CsvDirectory::new(&data_dir);

    let summary = collect(&config(), &resolver(&server), &downloader, &mut sink, &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(
        *requests.lock().unwrap(),
        vec!["AAPL", "BRK-B", "^GSPC", "GC=F", "^IRX", "ARKK"]
    );
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.columns, 36);

    let raw = std::fs::read_to_string(data_dir.join("sp500_data.csv")).unwrap();
    let raw_lines: Vec<&str> = raw.lines().collect();
    assert_eq!(raw_lines.len(), 6);
    assert!(raw_lines[0].starts_with("Ticker,AAPL,AAPL,AAPL,AAPL,AAPL,AAPL,BRK-B,"));
    assert!(raw_lines[1].starts_with("Price,Open,High,Low,Close,Adj Close,Volume,Open,"));
    assert!(raw_lines[2].starts_with("Date,,"));
    assert!(raw_lines[3].starts_with("2024-01-02,100,102,98,101,100.5,5000,"));

    let flat = std::fs::read_to_string(data_dir.join("market_data.csv")).unwrap();
    let header: Vec<&str> = flat.lines().next().unwrap().split(',').collect();
    assert_eq!(header[0], "Date");
    assert_eq!(header.len(), 37);
    assert!(header[1..].windows(2).all(|w| w[0] <= w[1]));
    assert!(header.contains(&"BRK-B_AdjClose"));
    assert!(header.contains(&"^GSPC_Volume"));
    assert_eq!(flat.lines().count(), 4);
}

#[tokio::test]
async fn empty_download_leaves_existing_files_untouched() {
    let server = MockServer::start().await;
    mount_failing_wikipedia(&server).await;
    mount_datahub(&server, "Symbol\nAAPL\n").await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("sp500_data.csv"), "previous run").unwrap();

    let downloader = BulkDownloader::new(CannedProvider::new(&[], &RequestLog::default()));
    let mut sink = CsvDirectory::new(&data_dir);

    let err = collect(&config(), &resolver(&server), &downloader, &mut sink, &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::EmptyDownload));
    assert_eq!(
        std::fs::read_to_string(data_dir.join("sp500_data.csv")).unwrap(),
        "previous run"
    );
    assert!(!data_dir.join("market_data.csv").exists());
}

#[tokio::test]
async fn both_sources_failing_is_fatal() {
    let server = MockServer::start().await;
    mount_failing_wikipedia(&server).await;
    Mock::given(method("GET"))
        .and(path("/constituents.csv"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");
    let requests = RequestLog::default();
    let downloader = BulkDownloader::new(CannedProvider::new(&["AAPL"], &requests));
    let mut sink = CsvDirectory::new(&data_dir);

    let err = collect(&config(), &resolver(&server), &downloader, &mut sink, &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, CollectError::Resolution(_)));
    assert!(err.to_string().contains("500"));
    assert!(requests.lock().unwrap().is_empty());
    assert!(!data_dir.exists());
}

#[tokio::test]
async fn slow_primary_page_falls_back_to_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<table><tr><th>Symbol</th></tr><tr><td>ZZZ</td></tr></table>")
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_datahub(&server, "Symbol\nMSFT\nBF.B\n").await;

    let resolver = TickerResolver::new(
        WikipediaSource::with_url_and_timeout(
            &format!("{}/wiki", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap(),
        DataHubSource::with_url(&format!("{}/constituents.csv", server.uri())).unwrap(),
    );

    let tickers = resolver.resolve().await.unwrap();

    let names: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
    assert_eq!(names, vec!["MSFT", "BF-B"]);
}

#[tokio::test]
async fn output_lands_only_in_the_sink_directory() {
    let server = MockServer::start().await;
    mount_failing_wikipedia(&server).await;
    mount_datahub(&server, "Symbol\nAAPL\n").await;

    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("nested").join("out");
    let downloader = BulkDownloader::new(CannedProvider::new(
        &["AAPL", "^GSPC", "GC=F", "^IRX", "ARKK"],
        &RequestLog::default(),
    ));
    let mut sink = CsvDirectory::new(&data_dir);

    let summary = collect(&config(), &resolver(&server), &downloader, &mut sink, &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(summary.raw_path, data_dir.join("sp500_data.csv"));
    assert_eq!(summary.flat_path, data_dir.join("market_data.csv"));
    assert!(summary.raw_path.is_file());
    assert!(summary.flat_path.is_file());
}
