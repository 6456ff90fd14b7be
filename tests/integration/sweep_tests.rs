use contact_sweep::config::Config;
use contact_sweep::crawler::{run_sweep, Coordinator, HttpFetcher, RunReport};
use contact_sweep::output::SinkOutcome;
use contact_sweep::state::TaskOutcome;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration; `fetcher_extra` is appended to the `[fetcher]` table
fn create_test_config(results_dir: &str, fetcher_extra: &str) -> Config {
    let content = format!(
        r#"
[crawler]
workers = 4
task-timeout = 10
progress-interval = 1

[fetcher]
request-timeout = 5
retry-delay = 10
{fetcher_extra}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
results-dir = "{results_dir}"
label = "integration test"
"#
    );
    toml::from_str(&content).expect("test config should parse")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn sweep(config: Config, seeds: &[String]) -> RunReport {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher).unwrap();
    let coordinator = Coordinator::new(config, fetcher).unwrap();
    coordinator.seed(seeds);
    coordinator.run().await
}

#[tokio::test]
async fn test_end_to_end_extraction_and_contact_link() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<div>Capt. John Smith, (555) 123-4567, john@example.com</div>
               <a href="/contact-us">Contact Us</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contact-us"))
        .respond_with(html(
            r#"<footer><p>Ms. Ann Lee 555.987.6543 ann@Example.COM</p></footer>
               <a href="/">Contact</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let report = sweep(config, &[format!("{}/", base)]).await;

    assert_eq!(report.pool.frontier.total, 2);
    assert_eq!(report.pool.frontier.processed, 2);
    assert_eq!(report.pool.count(TaskOutcome::Extracted), 2);

    let smith = report
        .table
        .rows
        .iter()
        .find(|r| r.last_name1.as_deref() == Some("Smith"))
        .expect("record for John Smith");
    assert_eq!(smith.salutation1.as_deref(), Some("Capt."));
    assert_eq!(smith.first_name1.as_deref(), Some("John"));
    assert_eq!(smith.phone1.as_deref(), Some("(555) 123-4567"));
    assert_eq!(smith.email1.as_deref(), Some("john@example.com"));
    assert_eq!(smith.source, format!("{}/", base));

    let lee = report
        .table
        .rows
        .iter()
        .find(|r| r.last_name1.as_deref() == Some("Lee"))
        .expect("record for Ann Lee");
    assert_eq!(lee.phone1.as_deref(), Some("(555) 987-6543"));
    assert_eq!(lee.email1.as_deref(), Some("ann@example.com"));
    assert_eq!(lee.source, format!("{}/contact-us", base));
}

#[tokio::test]
async fn test_equivalent_urls_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("<p>info@example.com</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let seeds = vec![
        format!("{}/page?sid=abc", base),
        format!("{}/page", base),
        format!("{}/page#team", base),
    ];
    let report = sweep(config, &seeds).await;

    assert_eq!(report.pool.frontier.total, 1);
    assert_eq!(report.table.len(), 1);
}

#[tokio::test]
async fn test_robots_disallow_skips_fetch() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(html("<p>555-123-4567</p>"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(html("<p>555-123-4567</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let report = sweep(
        config,
        &[format!("{}/private", base), format!("{}/public", base)],
    )
    .await;

    assert_eq!(report.pool.count(TaskOutcome::AccessDenied), 1);
    assert_eq!(report.pool.count(TaskOutcome::Extracted), 1);
    assert_eq!(report.table.len(), 1);
}

#[tokio::test]
async fn test_forbidden_robots_disallows_everything() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>555-123-4567</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let report = sweep(config, &[format!("{}/", base)]).await;

    assert_eq!(report.pool.count(TaskOutcome::AccessDenied), 1);
    assert!(report.table.is_empty());
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "User-agent: *\nDisallow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>555-123-4567</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "respect-robots = false");
    let report = sweep(config, &[format!("{}/", base)]).await;

    assert_eq!(report.pool.count(TaskOutcome::Extracted), 1);
}

#[tokio::test]
async fn test_server_errors_retried_then_failed() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    // One initial attempt plus two retries
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "max-retries = 2");
    let report = sweep(
        config,
        &[format!("{}/flaky", base), format!("{}/missing", base)],
    )
    .await;

    assert_eq!(report.pool.count(TaskOutcome::Failed), 2);
    assert_eq!(report.pool.frontier.processed, 2);
    assert!(report.table.is_empty());
}

#[tokio::test]
async fn test_non_html_is_empty_outcome() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("555-123-4567 fake@example.com", "application/pdf"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let report = sweep(config, &[format!("{}/brochure.pdf", base)]).await;

    assert_eq!(report.pool.count(TaskOutcome::Empty), 1);
    assert_eq!(report.raw_records, 0);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>555-123-4567</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(html("<p>555-123-4567</p>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path().to_str().unwrap(), "max-retries = 0");
    config.crawler.task_timeout = 1;
    let report = sweep(
        config,
        &[format!("{}/slow", base), format!("{}/fast", base)],
    )
    .await;

    assert_eq!(report.pool.count(TaskOutcome::TimedOut), 1);
    assert_eq!(report.pool.count(TaskOutcome::Extracted), 1);
    assert_eq!(report.table.len(), 1);
}

#[tokio::test]
async fn test_slow_attempt_retried_within_task_budget() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    // Each attempt gives up after the 1s request timeout, well inside the task budget
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>555-123-4567</p>").set_delay(Duration::from_secs(3)))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path().to_str().unwrap(), "max-retries = 1");
    config.fetcher.request_timeout = 1;
    config.crawler.task_timeout = 10;
    let report = sweep(config, &[format!("{}/slow", base)]).await;

    assert_eq!(report.pool.count(TaskOutcome::TimedOut), 1);
    assert!(report.pool.elapsed < Duration::from_secs(6));
}

#[tokio::test]
async fn test_contact_link_on_directory_page() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/guides/"))
        .respond_with(html(r#"<a href="contact">Contact</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guides/contact"))
        .respond_with(html("<p>Mr. Sam Ortiz 555-222-3333</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let report = sweep(config, &[format!("{}/guides/", base)]).await;

    assert_eq!(report.pool.frontier.processed, 2);
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.table.rows[0].source, format!("{}/guides/contact", base));
}

#[tokio::test]
async fn test_run_sweep_writes_csv() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_robots(&server, "").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<div>Dr. Mae Fin 5551234567</div><div>Dr. Mae Fin 555-123-4567</div>",
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");
    let csv_path = dir.path().join("out").join("contacts.csv");

    let outcome = run_sweep(config, &[format!("{}/", base)], Some(csv_path.as_path()))
        .await
        .unwrap();

    assert_eq!(outcome.seeded, 1);
    // Both blocks standardize to the same row
    assert_eq!(outcome.report.raw_records, 2);
    assert_eq!(
        outcome.sink,
        SinkOutcome::Written {
            path: csv_path.clone(),
            rows: 1
        }
    );

    let content = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("phone1,email1,salutation1,first_name1,last_name1,source")
    );
    assert_eq!(
        lines.next(),
        Some(format!("(555) 123-4567,,Dr.,Mae,Fin,{}/", base).as_str())
    );
}

#[tokio::test]
async fn test_empty_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path().to_str().unwrap(), "");

    let outcome = run_sweep(config, &["not a url".to_string()], None)
        .await
        .unwrap();

    assert_eq!(outcome.seeded, 0);
    assert_eq!(outcome.sink, SinkOutcome::NoData);
    assert!(outcome.report.table.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
