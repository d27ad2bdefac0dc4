//! Basic provider usage example
//!
//! Demonstrates the default console and file channels, message templates,
//! scopes and attached errors.
//!
//! Run with: cargo run --example basic_usage

use scyber_log::prelude::*;
use scyber_log::{log, LoggerSetup};
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== ScyberLog - Basic Usage Example ===\n");

    let log_dir = std::env::temp_dir().join("scyber_log_demo");
    let config = ScyberLogConfig {
        file_name_template: format!("{}/{{1}}-{{0:%Y-%m-%d}}.log", log_dir.display()),
        min_level: LogLevel::Trace,
        additional_loggers: vec![LoggerSetup::new("json").with_sink("console")],
        ..ScyberLogConfig::default()
    };

    let provider = LoggerProvider::builder()
        .config(config)
        .with_default_components()
        .build()?;
    let logger = provider.create_logger("Demo")?;

    println!("1. Logging at different levels:");
    for level in [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ] {
        log!(logger, level, "This is a {Level} message", level.to_str())?;
    }

    println!("\n2. Templates keep their values:");
    log!(
        logger,
        LogLevel::Info,
        "{Greeting} {Kilo}",
        "HELLO",
        1000,
        Duration::from_secs(10)
    )?;

    println!("\n3. Scopes:");
    {
        let _request = logger.begin_scope(State::from("request 42"))?;
        log!(logger, LogLevel::Info, "Handling {Path}", "/index.html")?;
    }

    println!("\n4. Attached errors:");
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");
    log!(logger, LogLevel::Error, error = err, "Loading {File} failed", "config.toml")?;

    println!("\nFile output written under {}", log_dir.display());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
