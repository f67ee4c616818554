use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use powlink_engine::{create_engine, EngineGateway};
use powlink_peer::{Broker, BrokerConfig, BrokerContext};
use tracing::{info, warn};

use crate::cmd::{LogSettings, ServeArgs};
use crate::exit::{config_error, engine_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::logging::{init_logging, LogLevel};

pub fn run(args: ServeArgs, log: LogSettings) -> CliResult<i32> {
    let config = resolve_config(&args)?;

    let level = log.level.unwrap_or_else(|| {
        LogLevel::from_config(&config.log.level).unwrap_or(LogLevel::Info)
    });
    init_logging(log.format, level);
    if log.level.is_none() && LogLevel::from_config(&config.log.level).is_none() {
        warn!(level = %config.log.level, "unknown log.level in config, using info");
    }

    let engine = create_engine(&config.engine.engine_type, &config.engine_options())
        .map_err(|err| engine_error("engine setup failed", err))?;
    let gateway = Arc::new(EngineGateway::new(engine));
    info!(
        engine_type = %gateway.descriptor().engine_type,
        engine_version = %gateway.descriptor().engine_version,
        max_difficulty = config.engine.max_difficulty,
        "engine ready"
    );

    let ctx = BrokerContext::new(gateway, config.engine.max_difficulty);
    let broker = Broker::bind(&config.server.endpoint_path, ctx)
        .map_err(|err| transport_error("bind failed", err))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(Arc::clone(&shutdown), broker.path())?;

    broker
        .serve(&shutdown)
        .map_err(|err| transport_error("accept failed", err))?;

    Ok(SUCCESS)
}

/// Flag overrides sit above the file and environment layers.
fn resolve_config(args: &ServeArgs) -> CliResult<BrokerConfig> {
    let mut config = BrokerConfig::load(args.config.as_deref()).map_err(config_error)?;

    if let Some(endpoint) = &args.endpoint {
        config.server.endpoint_path = endpoint.clone();
    }
    if let Some(engine) = &args.engine {
        config.engine.engine_type = engine.clone();
    }
    if let Some(max_difficulty) = args.max_difficulty {
        config.engine.max_difficulty = max_difficulty;
    }
    if let Some(device_path) = &args.device_path {
        config.engine.device_path = Some(device_path.clone());
    }
    if let Some(firmware_file) = &args.firmware_file {
        config.engine.firmware_file = Some(firmware_file.clone());
    }

    config.validate().map_err(config_error)?;
    Ok(config)
}

fn install_ctrlc_handler(shutdown: Arc<AtomicBool>, endpoint: &Path) -> CliResult<()> {
    let endpoint = endpoint.to_path_buf();
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
        // Wake the blocking accept so the loop observes the flag.
        let _ = std::os::unix::net::UnixStream::connect(&endpoint);
    })
    .map_err(|err| {
        CliError::new(
            INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn flags_override_the_loaded_config() {
        let args = ServeArgs {
            config: None,
            endpoint: Some(PathBuf::from("/tmp/override.sock")),
            engine: Some("curl".to_string()),
            max_difficulty: Some(9),
            device_path: None,
            firmware_file: None,
        };

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.server.endpoint_path, PathBuf::from("/tmp/override.sock"));
        assert_eq!(config.engine.max_difficulty, 9);
    }

    #[test]
    fn out_of_range_flag_difficulty_is_rejected() {
        let args = ServeArgs {
            config: None,
            endpoint: None,
            engine: None,
            max_difficulty: Some(250),
            device_path: None,
            firmware_file: None,
        };

        let err = resolve_config(&args).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
