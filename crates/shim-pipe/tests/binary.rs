//! Spawns the `precompile-pipe` binary and talks to it over real pipes.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use sha2::{Digest, Sha256};
use shim_client::{Caller, CommunicationError};

const BIN: &str = env!("CARGO_BIN_EXE_precompile-pipe");

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .env_remove("PRECOMPILE_SHIM_GAS_BUDGET")
        .env_remove("PRECOMPILE_SHIM_FORK")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn request(address: u8, body: &[u8]) -> Vec<u8> {
    let mut frame = (body.len() as u16).to_be_bytes().to_vec();
    frame.push(address);
    frame.extend_from_slice(body);
    frame
}

#[test]
fn test_sha256_frame() {
    let body = [0x42u8; 32];
    let out = run_with_stdin(&[], &request(0x02, &body));

    assert!(out.status.success());
    assert_eq!(&out.stdout[..3], &[0x00, 0x20, 0x00]);
    assert_eq!(&out.stdout[3..], Sha256::digest(body).as_slice());
}

#[test]
fn test_unknown_address_frame() {
    let out = run_with_stdin(&[], &[0x00, 0x00, 0xff]);

    assert!(out.status.success());
    let len = u16::from_be_bytes([out.stdout[0], out.stdout[1]]) as usize;
    assert!(len > 0);
    assert_eq!(out.stdout[2], 1);
    assert_eq!(&out.stdout[3..], b"precompile 0xff does not exist");
}

#[test]
fn test_closed_stdin_exits_cleanly() {
    let out = run_with_stdin(&[], &[]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_truncated_frame_gets_no_reply() {
    let mut stdin = request(0x04, b"ok");
    stdin.extend_from_slice(&[0x00, 0x10, 0x04, 0x01]);

    let out = run_with_stdin(&[], &stdin);
    assert!(out.status.success());
    assert_eq!(out.stdout, [0x00, 0x02, 0x00, b'o', b'k']);
}

#[test]
fn test_gas_budget_flag() {
    // ripemd160 of 32 bytes costs 600 + 120 gas
    let out = run_with_stdin(&["--gas-budget", "700"], &request(0x03, &[0u8; 32]));
    assert!(out.status.success());
    assert_eq!(out.stdout[2], 1);
}

#[test]
fn test_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"gas_budget": 700, "fork": "homestead"}}"#).unwrap();
    let path = file.path().to_str().unwrap();

    let out = run_with_stdin(&["--config", path], &request(0x03, &[0u8; 32]));
    assert!(out.status.success());
    assert_eq!(out.stdout[2], 1);

    // blake2f does not exist before istanbul
    let out = run_with_stdin(&["--config", path], &request(0x09, &[0u8; 213]));
    assert_eq!(&out.stdout[3..], b"precompile 0x09 does not exist");
}

#[test]
fn test_zero_gas_budget_rejected() {
    let out = run_with_stdin(&["--gas-budget", "0"], &request(0x02, &[]));
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

#[test]
fn test_caller_session() {
    let mut caller = Caller::spawn(BIN).unwrap();

    let digest = caller.run_precompile(0x02, b"abc").unwrap();
    assert_eq!(
        hex::encode(digest),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    let err = caller.run_precompile(0x00, &[]).unwrap_err();
    assert!(matches!(err, CommunicationError::Remote(_)));

    // still serving after an error frame
    assert_eq!(caller.run_precompile(0x04, b"echo").unwrap(), b"echo");

    let status = caller.shutdown().unwrap();
    assert!(status.success());
}
