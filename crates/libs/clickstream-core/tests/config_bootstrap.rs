#![cfg(not(feature = "loom-tests"))]

mod common;

use clickstream_core::{set_log_level, Clickstream, LogLevel, TrackerConfig};
use common::{data_source, SlowFactory};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}

const CONFIG: &str = r#"
app_prefix = "Grocery App"
log_level = "error"

[network]
endpoint = "wss://events.example.com/v1"
credential = "token"
"#;

#[test]
fn config_file_bootstraps_session_and_log_level() {
    init_logging();
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CONFIG.as_bytes()).expect("write config");

    let config = TrackerConfig::from_path(file.path()).expect("config loads");
    let factory = Arc::new(SlowFactory::new(Duration::ZERO));
    let clickstream = Clickstream::new(Arc::clone(&factory));
    let session = clickstream
        .initialise_from_config(config, &data_source(), None)
        .expect("initialise from config");

    assert_eq!(session.app_prefix(), "groceryapp");
    assert_eq!(log::max_level(), log::LevelFilter::Error);

    set_log_level(LogLevel::Verbose);
    assert_eq!(log::max_level(), log::LevelFilter::Trace);
    set_log_level(LogLevel::Off);
    assert_eq!(log::max_level(), log::LevelFilter::Off);
}
