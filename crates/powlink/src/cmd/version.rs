use crate::cmd::{LogSettings, VersionArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::logging::{init_logging, LogLevel};

pub fn run(args: VersionArgs, log: LogSettings) -> CliResult<i32> {
    init_logging(log.format, log.level.unwrap_or(LogLevel::Info));

    if !args.extended {
        println!("powlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: powlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));

    Ok(SUCCESS)
}
