use powlink_peer::PowDriver;

use crate::cmd::{parse_duration, InfoArgs, LogSettings};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::logging::{init_logging, LogLevel};
use crate::output::{print_info, OutputFormat};

pub fn run(args: InfoArgs, format: OutputFormat, log: LogSettings) -> CliResult<i32> {
    init_logging(log.format, log.level.unwrap_or(LogLevel::Info));

    let timeout = parse_duration(&args.timeout)?;
    let driver = PowDriver::new(&args.endpoint, Some(timeout), Some(timeout))
        .map_err(|err| client_error("endpoint rejected", err))?;

    let info = driver
        .pow_info()
        .map_err(|err| client_error("probe failed", err))?;

    print_info(&args.endpoint, &info, format);
    Ok(SUCCESS)
}
