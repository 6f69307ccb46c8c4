//! Whole-program runs: flags in, mock server on the wire, report out.
//!
//! `--wait 0` keeps pacing instant; none of these runs hit backoff except
//! the unreachable-server case, which is capped at zero retries.

use std::io::Write;

use clap::Parser;
use invite_core::{HttpMethod, HttpRequest, InviteStatus, ResolvedTeam, Transport, TransportError};
use mock_server::Db;
use org_invite::{try_run, Cli, Failure, UreqTransport};

const TOKEN: &str = "ghp_cli";

fn spawn(db: Db) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, db).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn input(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn cli(base: &str, file: &tempfile::NamedTempFile, extra: &[&str]) -> Cli {
    let path = file.path().to_str().unwrap().to_string();
    let mut args = vec![
        "org-invite".to_string(),
        "--file".to_string(),
        path,
        "--token".to_string(),
        TOKEN.to_string(),
        "--org".to_string(),
        "acme".to_string(),
        "--api-base".to_string(),
        base.to_string(),
        "--wait".to_string(),
        "0".to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn text_file_run_with_team_slug() {
    let db = Db::new(TOKEN, "acme").with_team("students", 42);
    let base = spawn(db.clone());
    let file = input(".txt", "a@ohio.edu\nnot-an-address\nb@ohio.edu\na@ohio.edu\n");

    let report = try_run(&cli(&base, &file, &["--team-slug", "students"])).unwrap();
    assert_eq!(report.team, ResolvedTeam::Id(42));
    assert_eq!(report.invited(), 2);
    assert!(report.is_clean());
    let emails: Vec<_> = db.invitations().into_iter().map(|i| i.email).collect();
    assert_eq!(emails, ["a@ohio.edu", "b@ohio.edu"]);
}

#[test]
fn csv_run_with_team_id_skips_lookup() {
    let db = Db::new(TOKEN, "acme").with_team("students", 9);
    let base = spawn(db.clone());
    let file = input(".csv", "name,emailHandle\nAda,al1\nBob,bb2\n");

    let report = try_run(&cli(&base, &file, &["--team-id", "9", "--team-slug", "ignored"])).unwrap();
    assert_eq!(report.invited(), 2);
    assert!(db.requests().iter().all(|r| r.starts_with("POST")));
    let emails: Vec<_> = db.invitations().into_iter().map(|i| i.email).collect();
    assert_eq!(emails, ["al1@ohio.edu", "bb2@ohio.edu"]);
}

#[test]
fn csv_export_with_quoted_names_and_bom() {
    let db = Db::new(TOKEN, "acme").with_team("students", 5);
    let base = spawn(db.clone());
    let file = input(".csv", "\u{feff}name,emailHandle\r\n\"Doe, Jane\",jd123\r\n\"Roe, Rick\",rr7\r\n");

    let report = try_run(&cli(&base, &file, &["--team-id", "5"])).unwrap();
    assert_eq!(report.invited(), 2);
    let emails: Vec<_> = db.invitations().into_iter().map(|i| i.email).collect();
    assert_eq!(emails, ["jd123@ohio.edu", "rr7@ohio.edu"]);
}

#[test]
fn dry_run_sends_nothing() {
    let db = Db::new(TOKEN, "acme").with_team("students", 1);
    let base = spawn(db.clone());
    let file = input(".txt", "a@ohio.edu\n");

    let report = try_run(&cli(&base, &file, &["--team-slug", "students", "--dry-run"])).unwrap();
    assert_eq!(report.results[0].status, InviteStatus::DryRun);
    assert!(db.requests().is_empty());
}

#[test]
fn missing_team_id_in_lookup_exits_with_resolution_code() {
    let db = Db::new(TOKEN, "acme").with_team_without_id("ghost");
    let base = spawn(db.clone());
    let file = input(".txt", "a@ohio.edu\n");

    let err = try_run(&cli(&base, &file, &["--team-slug", "ghost"])).unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(db.invitations().is_empty());
}

#[test]
fn missing_input_file_is_an_input_error() {
    let file = input(".txt", "");
    let mut cli = cli("http://127.0.0.1:9", &file, &["--team-id", "1"]);
    cli.file = file.path().with_extension("missing");

    let err = try_run(&cli).unwrap_err();
    assert!(matches!(err, Failure::Input(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn config_errors_come_before_input_errors() {
    let file = input(".txt", "a@ohio.edu\n");
    let mut cli = cli("http://127.0.0.1:9", &file, &[]);
    cli.team_id = None;
    cli.team_slug = None;
    cli.file = file.path().with_extension("missing");

    let err = try_run(&cli).unwrap_err();
    assert!(matches!(err, Failure::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unreachable_server_gives_up_without_retrying_when_capped() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let file = input(".txt", "a@ohio.edu\n");
    let cli = cli(
        &format!("http://127.0.0.1:{port}"),
        &file,
        &["--team-id", "1", "--max-retries", "0"],
    );

    let report = try_run(&cli).unwrap();
    assert!(matches!(report.results[0].status, InviteStatus::GaveUp { attempts: 1, .. }));
    assert!(!report.is_clean());
}

#[test]
fn transport_returns_error_statuses_as_data() {
    let db = Db::new(TOKEN, "acme");
    let base = spawn(db);
    let transport = UreqTransport::default();

    let req = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{base}/orgs/acme/teams/nope"),
        headers: vec![("Authorization".to_string(), format!("token {TOKEN}"))],
        body: None,
    };
    let resp = transport.send(&req).unwrap();
    assert_eq!(resp.status, 404);
    assert!(resp.body.contains("Not Found"));
}

#[test]
fn transport_reports_refused_connection_as_network_failure() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let req = HttpRequest {
        method: HttpMethod::Post,
        url: format!("http://127.0.0.1:{port}/orgs/acme/invitations"),
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: Some("{}".to_string()),
    };
    let err = UreqTransport::default().send(&req).unwrap_err();
    assert!(matches!(err, TransportError::Network(_)), "{err}");
}
