#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use powlink_peer::PowClient;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/powlink-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_broker(path: &Path, timeout: Duration) -> PowClient {
    let client = PowClient::new(path).with_read_timeout(Some(Duration::from_secs(5)));
    let start = Instant::now();
    loop {
        match client.server_version() {
            Ok(_) => return client,
            Err(err) => {
                if start.elapsed() >= timeout {
                    panic!("broker never came up: {err}");
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

#[test]
fn serve_answers_metadata_and_work_requests() {
    let dir = unique_temp_dir("serve");
    let sock_path = dir.join("broker.sock");

    let mut child = Command::new(env!("CARGO_BIN_EXE_powlink"))
        .arg("--log-level")
        .arg("error")
        .arg("serve")
        .arg("--endpoint")
        .arg(&sock_path)
        .arg("--engine")
        .arg("curl")
        .arg("--max-difficulty")
        .arg("14")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("serve command should start");

    let client = wait_for_broker(&sock_path, Duration::from_secs(5));

    let info = client.pow_info().expect("pow_info should succeed");
    assert_eq!(info.server_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(info.engine_type, "Curl");

    let text: String = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ"
        .chars()
        .cycle()
        .take(powlink_engine::TRANSACTION_TRYTES)
        .collect();
    let input = powlink_engine::Trytes::try_from(text.as_str()).unwrap();
    let nonce = client.do_work(&input, 1).expect("pow should succeed");
    assert_eq!(nonce.len(), powlink_engine::NONCE_TRYTES);

    child.kill().expect("serve process should be killable");
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn serve_refuses_an_unknown_engine_type() {
    let dir = unique_temp_dir("badengine");
    let sock_path = dir.join("broker.sock");

    let output = Command::new(env!("CARGO_BIN_EXE_powlink"))
        .arg("serve")
        .arg("--endpoint")
        .arg(&sock_path)
        .arg("--engine")
        .arg("fpga")
        .output()
        .expect("serve command should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown engine type"), "{stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}
