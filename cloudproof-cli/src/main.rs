#![deny(missing_docs)]
//! CloudProof command-line interface.
//!
//! Fetches activity payloads from the API, reads them from disk, or scores
//! local CloudTrail logs, then prints the heatmap report.

mod client;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::{ActivityClient, ReqwestActivityClient, ServerArgs, normalize_server_url};
use cloudproof_core::{
    ActivityLedger, ActivityPayload, Clock, DEFAULT_ACTIVITY_DAYS, DEFAULT_PROFILE_DAYS,
    FixedClock, HeatmapView, IntensityTier, StdLogSource, SystemClock, WindowSpan, build_view,
    format_event, format_service_breakdown, ingest_logs, render_json, render_view_markdown,
    report_window, window_for,
};
use env_logger::Env;
use log::info;
use std::fmt::Write;
use std::path::PathBuf;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "cloudproof", version, about = "CloudProof CLI")]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Args, Clone, Default)]
struct DateArgs {
    /// Treat this day (YYYY-MM-DD) as today.
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,
}

impl DateArgs {
    fn clock(&self) -> Box<dyn Clock + Send + Sync> {
        match self.today {
            Some(day) => Box::new(FixedClock(day)),
            None => Box::new(SystemClock::new()),
        }
    }
}

#[derive(Args, Clone)]
struct SpanArgs {
    /// Trailing window length in days.
    #[arg(long, default_value_t = DEFAULT_ACTIVITY_DAYS, conflicts_with = "year")]
    days: u32,
    /// Show one calendar year back from today instead.
    #[arg(long)]
    year: bool,
}

impl SpanArgs {
    fn span(&self) -> WindowSpan {
        if self.year {
            WindowSpan::YearBack
        } else {
            WindowSpan::TrailingDays(self.days)
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a user's activity from the API.
    User {
        /// Numeric user id.
        #[arg(long)]
        id: u64,
        /// Trailing window length in days.
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_DAYS)]
        days: u32,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Fetch a public profile from the API.
    Profile {
        /// Public username.
        #[arg(long)]
        username: String,
        #[command(flatten)]
        server: ServerArgs,
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Build a report from a payload JSON file.
    File {
        /// Path to the payload file.
        #[arg(long)]
        path: PathBuf,
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Score local CloudTrail logs (`.json` or `.json.gz`).
    ///
    /// JSON output is the activity payload; text and Markdown show the view.
    Ingest {
        /// Directory (or single file) holding CloudTrail logs.
        #[arg(long)]
        dir: PathBuf,
        /// Trailing window length in days.
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_DAYS)]
        days: u32,
        #[command(flatten)]
        date: DateArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::User {
            id,
            days,
            server,
            date,
            report,
        } => {
            let client = ReqwestActivityClient::new()?;
            run_user(&client, &server.server_url, id, days, &date, &report).await?
        }
        Commands::Profile {
            username,
            server,
            date,
            report,
        } => {
            let client = ReqwestActivityClient::new()?;
            run_profile(&client, &server.server_url, &username, &date, &report).await?
        }
        Commands::File {
            path,
            span,
            date,
            report,
        } => run_file(path, span.span(), &date, &report).await?,
        Commands::Ingest {
            dir,
            days,
            date,
            report,
        } => run_ingest(dir, days, &date, &report).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

#[cfg_attr(test, allow(dead_code))]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn parse_today(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

async fn run_user<C: ActivityClient + ?Sized>(
    client: &C,
    server_url: &str,
    user_id: u64,
    days: u32,
    date: &DateArgs,
    report: &OutputArgs,
) -> CliResult<()> {
    let window = window_for(date.clock().as_ref(), WindowSpan::TrailingDays(days))?;
    let server_url = normalize_server_url(server_url)?;
    let payload = client.fetch_user_activity(&server_url, user_id, days).await?;
    emit_view(&build_view(&payload, window), report).await
}

async fn run_profile<C: ActivityClient + ?Sized>(
    client: &C,
    server_url: &str,
    username: &str,
    date: &DateArgs,
    report: &OutputArgs,
) -> CliResult<()> {
    let username = username.trim();
    if username.is_empty() {
        return Err("username is required".into());
    }
    let window = window_for(
        date.clock().as_ref(),
        WindowSpan::TrailingDays(DEFAULT_PROFILE_DAYS),
    )?;
    let server_url = normalize_server_url(server_url)?;
    let payload = client.fetch_profile(&server_url, username).await?;
    emit_view(&build_view(&payload, window), report).await
}

async fn run_file(
    path: PathBuf,
    span: WindowSpan,
    date: &DateArgs,
    report: &OutputArgs,
) -> CliResult<()> {
    let window = window_for(date.clock().as_ref(), span)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let payload = ActivityPayload::from_json_slice(&bytes)?;
    emit_view(&build_view(&payload, window), report).await
}

async fn run_ingest(
    dir: PathBuf,
    days: u32,
    date: &DateArgs,
    report: &OutputArgs,
) -> CliResult<()> {
    let today = date.clock().today();
    let window = report_window(today, days)?;

    let ledger = tokio::task::spawn_blocking(move || {
        let mut ledger = ActivityLedger::new();
        ingest_logs(&StdLogSource::new(), &dir, &mut ledger).map(|_| ledger)
    })
    .await??;
    let activity = ledger.report(today, days)?;
    info!(
        "ingested {} activities into {} active days",
        ledger.activities().len(),
        activity.heatmap.len()
    );

    if report.format == OutputFormat::Json {
        return emit_output(report, with_newline(render_json(&activity)?)).await;
    }
    let payload = activity.to_payload()?;
    emit_view(&build_view(&payload, window), report).await
}

async fn emit_view(view: &HeatmapView, output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_view_text(view),
        OutputFormat::Markdown => render_view_markdown(view),
        OutputFormat::Json => with_newline(render_json(view)?),
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn with_newline(mut contents: String) -> String {
    contents.push('\n');
    contents
}

fn render_view_text(view: &HeatmapView) -> String {
    let mut output = String::new();
    if let Some(username) = &view.username {
        let _ = writeln!(output, "User: {username}");
    }
    let _ = writeln!(
        output,
        "Window: {} to {}",
        view.window.start_date(),
        view.window.end_date()
    );
    let _ = writeln!(output, "Total score: {}", view.summary.total_score);
    let _ = writeln!(output, "Window score: {}", view.window_score());

    let counts = view.tier_counts();
    let _ = writeln!(output, "Days by intensity:");
    for tier in IntensityTier::ALL {
        let _ = writeln!(
            output,
            "- {}: {}",
            tier.label(),
            counts.get(&tier).copied().unwrap_or(0)
        );
    }

    if view.summary.services.is_empty() {
        let _ = writeln!(output, "Services: none");
    } else {
        let _ = writeln!(output, "Services ({}):", view.summary.service_count);
        for (service, score) in format_service_breakdown(&view.summary.services) {
            let _ = writeln!(output, "- {service}: {score}");
        }
    }

    if view.summary.recent_events.is_empty() {
        let _ = writeln!(output, "Recent activity: none");
    } else {
        let _ = writeln!(output, "Recent activity:");
        for event in &view.summary.recent_events {
            let _ = writeln!(output, "- {}", format_event(event));
        }
    }

    let _ = writeln!(output);
    output
}

#[cfg(test)]
mod tests {
    use super::{
        ActivityClient, Cli, CliResult, Commands, DateArgs, OutputArgs, OutputFormat, SpanArgs,
        emit_view, parse_today, render_view_text, run_file, run_ingest, run_profile, run_user,
    };
    use chrono::NaiveDate;
    use clap::Parser;
    use cloudproof_core::{ActivityPayload, HeatmapWindow, WindowSpan, build_view};
    use serde_json::{Value, json};
    use std::future::Future;
    use std::path::PathBuf;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct FakeActivityClient {
        payload: Value,
        calls: Mutex<Vec<String>>,
    }

    impl FakeActivityClient {
        fn new(payload: Value) -> Self {
            Self {
                payload,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl ActivityClient for FakeActivityClient {
        fn fetch_user_activity<'a>(
            &'a self,
            server_url: &'a str,
            user_id: u64,
            days: u32,
        ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(format!("{server_url} user {user_id} {days}"));
            let payload = ActivityPayload::from_value(self.payload.clone());
            Box::pin(async move { Ok(payload) })
        }

        fn fetch_profile<'a>(
            &'a self,
            server_url: &'a str,
            username: &'a str,
        ) -> Pin<Box<dyn Future<Output = CliResult<ActivityPayload>> + Send + 'a>> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(format!("{server_url} profile {username}"));
            let payload = ActivityPayload::from_value(self.payload.clone());
            Box::pin(async move { Ok(payload) })
        }
    }

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("cloudproof_cli_test_{nanos}_{counter}"))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn pinned(y: i32, m: u32, d: u32) -> DateArgs {
        DateArgs {
            today: Some(day(y, m, d)),
        }
    }

    fn json_output(path: &std::path::Path) -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            report_output: Some(path.to_path_buf()),
        }
    }

    fn read_json(path: &std::path::Path) -> Value {
        let contents = std::fs::read_to_string(path).expect("read report");
        serde_json::from_str(&contents).expect("parse report")
    }

    #[test]
    fn parse_today_accepts_iso_dates() {
        assert_eq!(parse_today(" 2025-02-20 "), Ok(day(2025, 2, 20)));
        assert!(parse_today("2025/02/20").is_err());
        assert!(parse_today("2025-02-30").is_err());
    }

    #[test]
    fn file_command_rejects_days_with_year() {
        let result = Cli::try_parse_from([
            "cloudproof",
            "file",
            "--path",
            "payload.json",
            "--days",
            "30",
            "--year",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn file_command_defaults_to_trailing_days() {
        let cli = Cli::try_parse_from(["cloudproof", "file", "--path", "payload.json"])
            .expect("parse");
        match cli.command {
            Commands::File { span, .. } => {
                assert_eq!(span.span(), WindowSpan::TrailingDays(365));
            }
            _ => panic!("expected file command"),
        }
    }

    #[test]
    fn span_args_select_year_back() {
        let span = SpanArgs {
            days: 365,
            year: true,
        };
        assert_eq!(span.span(), WindowSpan::YearBack);
    }

    #[test]
    fn user_command_parses_shared_flags() {
        let cli = Cli::try_parse_from([
            "cloudproof",
            "user",
            "--id",
            "7",
            "--server-url",
            "http://api.test",
            "--today",
            "2025-02-21",
            "--format",
            "markdown",
        ])
        .expect("parse");
        match cli.command {
            Commands::User {
                id,
                days,
                server,
                date,
                report,
            } => {
                assert_eq!(id, 7);
                assert_eq!(days, 365);
                assert_eq!(server.server_url, "http://api.test");
                assert_eq!(date.today, Some(day(2025, 2, 21)));
                assert_eq!(report.format, OutputFormat::Markdown);
            }
            _ => panic!("expected user command"),
        }
    }

    #[tokio::test]
    async fn run_user_fetches_and_windows_payload() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let report_path = root.join("user.json");
        let client = FakeActivityClient::new(json!({
            "heatmap": { "2025-02-20": 14, "2024-01-01": 3 },
            "total_score": 17,
            "services": { "EC2": 17 }
        }));

        run_user(
            &client,
            "http://api.test/",
            7,
            30,
            &pinned(2025, 2, 21),
            &json_output(&report_path),
        )
        .await
        .expect("run user");

        assert_eq!(client.calls(), vec!["http://api.test user 7 30".to_string()]);
        let report = read_json(&report_path);
        assert_eq!(report["window"]["startDate"], "2025-01-23");
        assert_eq!(report["window"]["endDate"], "2025-02-21");
        assert_eq!(report["cells"].as_array().map(Vec::len), Some(1));
        assert_eq!(report["cells"][0]["tier"], "high");
        assert_eq!(report["summary"]["totalScore"], 17);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_profile_uses_profile_window() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let report_path = root.join("profile.json");
        let client = FakeActivityClient::new(json!({
            "username": "octo",
            "heatmap": { "2023-03-03": 2, "2023-03-02": 9 }
        }));

        run_profile(
            &client,
            "http://api.test",
            " octo ",
            &pinned(2025, 3, 1),
            &json_output(&report_path),
        )
        .await
        .expect("run profile");

        assert_eq!(client.calls(), vec!["http://api.test profile octo".to_string()]);
        let report = read_json(&report_path);
        assert_eq!(report["username"], "octo");
        assert_eq!(report["window"]["startDate"], "2023-03-03");
        assert_eq!(report["cells"].as_array().map(Vec::len), Some(1));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_profile_rejects_blank_username() {
        let client = FakeActivityClient::new(json!({}));
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        let result = run_profile(&client, "http://api.test", "  ", &pinned(2025, 3, 1), &output).await;
        assert!(result.is_err());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn run_file_renders_markdown_for_year_span() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create root");
        let payload_path = root.join("payload.json");
        std::fs::write(
            &payload_path,
            r#"{"heatmap": {"2025-02-20": 22, "2024-02-19": 5}, "services": {"S3": 4}}"#,
        )
        .expect("write payload");
        let report_path = root.join("out/report.md");
        let output = OutputArgs {
            format: OutputFormat::Markdown,
            report_output: Some(report_path.clone()),
        };

        run_file(
            payload_path,
            WindowSpan::YearBack,
            &pinned(2025, 2, 20),
            &output,
        )
        .await
        .expect("run file");

        let contents = std::fs::read_to_string(&report_path).expect("read markdown");
        assert!(contents.contains("2024-02-20 to 2025-02-20"));
        assert!(contents.contains("- 2025-02-20: 22 (very high)"));
        assert!(!contents.contains("2024-02-19"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_file_reports_missing_file() {
        let path = std::env::temp_dir().join(unique_dir_name()).join("missing.json");
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        let err = run_file(path, WindowSpan::YearBack, &DateArgs::default(), &output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn run_ingest_writes_activity_payload() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let logs = root.join("logs");
        std::fs::create_dir_all(&logs).expect("create logs");
        std::fs::write(
            logs.join("trail.json"),
            json!({
                "Records": [
                    { "eventTime": "2025-02-20T09:00:00Z", "eventSource": "ec2.amazonaws.com", "eventName": "RunInstances" },
                    { "eventTime": "2025-02-20T09:01:00Z", "eventSource": "s3.amazonaws.com", "eventName": "ListBuckets" },
                    { "eventTime": "2025-02-21T09:00:00Z", "eventSource": "iam.amazonaws.com", "eventName": "CreateRole" }
                ]
            })
            .to_string(),
        )
        .expect("write log");
        let report_path = root.join("activity.json");

        run_ingest(
            logs.clone(),
            365,
            &pinned(2025, 2, 21),
            &json_output(&report_path),
        )
        .await
        .expect("run ingest");

        let report = read_json(&report_path);
        assert_eq!(report["heatmap"]["2025-02-20"], 3);
        assert_eq!(report["heatmap"]["2025-02-21"], 2);
        assert_eq!(report["total_score"], 5);
        assert_eq!(report["recent_actions"][0]["action"], "CreateRole");

        let text_path = root.join("activity.txt");
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: Some(text_path.clone()),
        };
        run_ingest(logs, 365, &pinned(2025, 2, 21), &output)
            .await
            .expect("run ingest text");
        let contents = std::fs::read_to_string(&text_path).expect("read text");
        assert!(contents.contains("Total score: 5"));
        assert!(contents.contains("- low: 2"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_ingest_view_covers_every_reported_day() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::write(
            root.join("trail.json"),
            json!({
                "Records": [
                    { "eventTime": "2025-02-19T09:00:00Z", "eventSource": "s3.amazonaws.com", "eventName": "CreateBucket" },
                    { "eventTime": "2025-02-20T09:00:00Z", "eventSource": "ec2.amazonaws.com", "eventName": "RunInstances" },
                    { "eventTime": "2025-02-21T09:00:00Z", "eventSource": "iam.amazonaws.com", "eventName": "CreateRole" }
                ]
            })
            .to_string(),
        )
        .expect("write log");
        let text_path = root.join("out/activity.txt");
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: Some(text_path.clone()),
        };

        run_ingest(root.clone(), 1, &pinned(2025, 2, 21), &output)
            .await
            .expect("run ingest");

        let contents = std::fs::read_to_string(&text_path).expect("read text");
        assert!(contents.contains("Window: 2025-02-20 to 2025-02-21"));
        assert!(contents.contains("Total score: 5"));
        assert!(contents.contains("Window score: 5"));
        assert!(!contents.contains("CreateBucket"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_ingest_rejects_out_of_range_days() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create root");
        let output = OutputArgs {
            format: OutputFormat::Json,
            report_output: None,
        };
        let result = run_ingest(root.clone(), 731, &pinned(2025, 2, 21), &output).await;
        assert!(result.is_err());
        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn render_view_text_covers_sections() {
        let payload = ActivityPayload::from_value(json!({
            "username": "octo",
            "heatmap": { "2025-02-20": 14, "2025-02-21": 4 },
            "total_score": 18,
            "services": { "S3": 4, "EC2": 14 },
            "recent_actions": [{ "service": "EC2", "action": "RunInstances", "score": 3 }]
        }));
        let window = HeatmapWindow::trailing_days(day(2025, 2, 21), 7).expect("window");
        let output = render_view_text(&build_view(&payload, window));

        assert!(output.contains("User: octo"));
        assert!(output.contains("Window: 2025-02-15 to 2025-02-21"));
        assert!(output.contains("Window score: 18"));
        assert!(output.contains("- high: 1"));
        assert!(output.contains("- low: 1"));
        assert!(output.contains("Services (2):\n- EC2: 14\n- S3: 4"));
        assert!(output.contains("- EC2 RunInstances +3"));
    }

    #[test]
    fn render_view_text_handles_empty_payload() {
        let window = HeatmapWindow::trailing_days(day(2025, 2, 21), 1).expect("window");
        let output = render_view_text(&build_view(&ActivityPayload::default(), window));
        assert!(!output.contains("User:"));
        assert!(output.contains("Services: none"));
        assert!(output.contains("Recent activity: none"));
        assert!(output.contains("- empty: 0"));
    }

    #[tokio::test]
    async fn emit_view_prints_to_stdout_without_report_path() {
        let window = HeatmapWindow::trailing_days(day(2025, 2, 21), 1).expect("window");
        let view = build_view(&ActivityPayload::default(), window);
        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        emit_view(&view, &output).await.expect("emit text");
    }
}
