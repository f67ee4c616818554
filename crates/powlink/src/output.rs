use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use powlink_engine::Trytes;
use powlink_peer::PowInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    endpoint: &'a str,
    server_version: &'a str,
    engine_type: &'a str,
    engine_version: &'a str,
}

pub fn print_info(endpoint: &str, info: &PowInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = InfoOutput {
                endpoint,
                server_version: &info.server_version,
                engine_type: &info.engine_type,
                engine_version: &info.engine_version,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ENDPOINT", "SERVER", "ENGINE", "ENGINE VERSION"])
                .add_row(vec![
                    endpoint.to_string(),
                    info.server_version.clone(),
                    info.engine_type.clone(),
                    info.engine_version.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "endpoint={endpoint} server={} engine={} engine_version={}",
                info.server_version, info.engine_type, info.engine_version
            );
        }
    }
}

#[derive(Serialize)]
struct NonceOutput<'a> {
    nonce: &'a str,
    difficulty: u8,
}

pub fn print_nonce(nonce: &Trytes, difficulty: u8, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = NonceOutput {
                nonce: nonce.as_str(),
                difficulty,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{nonce}");
        }
    }
}
