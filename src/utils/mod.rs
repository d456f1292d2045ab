pub mod timer;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Maps a `--log-level` argument to a tracing level, `INFO` when unknown.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs the global fmt subscriber. Returns false if one was already set.
pub fn init_tracing(level: &str) -> bool {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[test]
fn test_parse_level() {
    assert_eq!(parse_level("DEBUG"), Level::DEBUG);
    assert_eq!(parse_level("warn"), Level::WARN);
    assert_eq!(parse_level("loud"), Level::INFO);
}
