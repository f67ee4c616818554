use powlink_engine::Trytes;
use powlink_peer::PowDriver;

use crate::cmd::{parse_duration, LogSettings, PowArgs};
use crate::exit::{client_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::logging::{init_logging, LogLevel};
use crate::output::{print_nonce, OutputFormat};

pub fn run(args: PowArgs, format: OutputFormat, log: LogSettings) -> CliResult<i32> {
    init_logging(log.format, log.level.unwrap_or(LogLevel::Info));

    let timeout = parse_duration(&args.timeout)?;
    let input = resolve_input(&args)?;

    let driver = PowDriver::new(&args.endpoint, Some(timeout), Some(timeout))
        .map_err(|err| client_error("endpoint rejected", err))?;

    let nonce = driver
        .do_work(&input, args.mwm)
        .map_err(|err| client_error("pow failed", err))?;

    print_nonce(&nonce, args.mwm, format);
    Ok(SUCCESS)
}

fn resolve_input(args: &PowArgs) -> CliResult<Trytes> {
    let text = if let Some(trytes) = &args.trytes {
        trytes.clone()
    } else if let Some(path) = &args.file {
        std::fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    } else {
        return Err(CliError::new(USAGE, "either --trytes or --file is required"));
    };

    Trytes::try_from(text.trim())
        .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))
}
