use tracing::{info, warn};

use tint_observe::{LEVEL_ONLY_FORMAT, LoggerConfig, Severity, logger_init};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Logger
    let cfg = LoggerConfig {
        name: "demo".to_string(),
        level: Severity::Debug,
        ..Default::default()
    };
    let mut logger = logger_init(&cfg)?;
    info!("logger initialized");

    // 2) Every severity through the leveled methods
    logger.debug("debug label is blue");
    logger.info("info label is green");
    logger.warning("warning label is yellow");
    logger.error("error label is red");
    logger.critical("critical label is red too");

    // 3) Plain tracing macros reach the same handler
    warn!(attempt = 3, "retrying connection");
    tracing::error!(critical = true, "disk full");

    // 4) Reconfigure
    logger.set_format(LEVEL_ONLY_FORMAT)?;
    info!("switched to level-only format");

    logger.set_use_color(false);
    info!("color disabled");

    logger.set_format("%(asctime)s %(name)s %(levelname)-8s %(message)s")?;
    info!("custom format with timestamp");

    Ok(())
}
