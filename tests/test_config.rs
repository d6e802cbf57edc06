use std::env;
use std::time::Duration;

use space_invaders::config::*;
use tracing::level_filters::LevelFilter;

#[test]
fn defaults() {
    let config = GameConfig::default();
    assert_eq!(config.render_hz, 61);
    assert_eq!(config.logic_hz, 122);
    assert_eq!(config.diagnostic_period(), Duration::from_secs(1));
    assert_eq!(config.blink_period(), Duration::from_millis(250));
    assert!(config.log_path.is_none());
}

#[test]
fn periods_follow_rates() {
    let config = GameConfig {
        render_hz: 50,
        logic_hz: 100,
        ..GameConfig::default()
    };
    assert_eq!(config.render_period(), Duration::from_millis(20));
    assert_eq!(config.logic_period(), Duration::from_millis(10));
}

#[test]
fn logic_runs_twice_per_frame_by_default() {
    let config = GameConfig::default();
    let ratio = config.render_period().as_secs_f64() / config.logic_period().as_secs_f64();
    assert!((ratio - 2.0).abs() < 0.01);
}

#[test]
fn env_value_parsed() {
    env::set_var("INVADERS_TEST_PARSED", "42");
    assert_eq!(read_env_u64("INVADERS_TEST_PARSED", 7), 42);
}

#[test]
fn env_missing_uses_default() {
    env::remove_var("INVADERS_TEST_MISSING");
    assert_eq!(read_env_u64("INVADERS_TEST_MISSING", 7), 7);
}

#[test]
fn env_malformed_uses_default() {
    env::set_var("INVADERS_TEST_MALFORMED", "fast");
    assert_eq!(read_env_u64("INVADERS_TEST_MALFORMED", 7), 7);
}

#[test]
fn env_zero_uses_default() {
    env::set_var("INVADERS_TEST_ZERO", "0");
    assert_eq!(read_env_u64("INVADERS_TEST_ZERO", 7), 7);
}

#[test]
fn log_filter_defaults_to_info() {
    let config = GameConfig::default();
    assert_eq!(config.log_filter().max_level_hint(), Some(LevelFilter::INFO));
}

#[test]
fn log_filter_honours_user_directives() {
    for (directives, level) in [("debug", LevelFilter::DEBUG), ("trace", LevelFilter::TRACE)] {
        let config = GameConfig {
            log_directives: Some(directives.to_string()),
            ..GameConfig::default()
        };
        assert_eq!(config.log_filter().max_level_hint(), Some(level));
    }
}
