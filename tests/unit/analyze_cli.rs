//! Unit tests for the analyze CLI surface

use clap::Parser;
use gramscope::cli::{Cli, Commands};
use std::path::Path;

#[test]
fn test_analyze_defaults() {
    let cli = Cli::parse_from(["gramscope", "analyze", "someone"]);

    let Commands::Analyze(args) = cli.command else {
        panic!("expected analyze command");
    };
    assert_eq!(args.usernames, vec!["someone"]);
    assert_eq!(args.max_posts, 30);
    assert_eq!(args.max_follow, 500);
    assert_eq!(args.short_delay, 2.0);
    assert_eq!(args.long_break_every, 20);
    assert_eq!(args.max_retries, 3);
    assert_eq!(args.output_dir, Path::new("profiles"));
    assert!(!args.no_export);
    assert!(!args.quiet);
    assert_eq!(args.schedule, None);
}

#[test]
fn test_analyze_custom_flags() {
    let cli = Cli::parse_from([
        "gramscope",
        "analyze",
        "@one",
        "two",
        "--max-posts",
        "100",
        "--max-retries",
        "0",
        "--short-delay",
        "0.5",
        "--output-dir",
        "out",
        "--no-export",
        "--quiet",
        "--schedule",
        "60",
    ]);

    let Commands::Analyze(args) = cli.command else {
        panic!("expected analyze command");
    };
    // The leading '@' survives parsing; it is stripped at run time.
    assert_eq!(args.usernames, vec!["@one", "two"]);
    assert_eq!(args.max_posts, 100);
    assert_eq!(args.max_retries, 0);
    assert_eq!(args.short_delay, 0.5);
    assert_eq!(args.output_dir, Path::new("out"));
    assert!(args.no_export);
    assert!(args.quiet);
    assert_eq!(args.schedule, Some(60));
}

#[test]
fn test_analyze_requires_at_least_one_username() {
    assert!(Cli::try_parse_from(["gramscope", "analyze"]).is_err());
}

#[test]
fn test_max_retries_range_is_enforced() {
    assert!(Cli::try_parse_from(["gramscope", "analyze", "x", "--max-retries", "11"]).is_err());
    assert!(Cli::try_parse_from(["gramscope", "analyze", "x", "--max-retries", "10"]).is_ok());
}

#[test]
fn test_zero_short_delay_is_rejected() {
    assert!(Cli::try_parse_from(["gramscope", "analyze", "x", "--short-delay", "0"]).is_err());
}

#[test]
fn test_login_subcommand_parses() {
    let cli = Cli::parse_from(["gramscope", "--login-user", "me", "login"]);
    assert!(matches!(cli.command, Commands::Login(_)));
    assert_eq!(cli.login_user.as_deref(), Some("me"));
}
