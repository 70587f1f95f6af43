//! # Pipe Loop Integration Tests
//!
//! Drives `PipeServer` over in-memory streams with the real revm registry and
//! with a test double, checking the bytes that come back.

use std::io::{self, Cursor, Read};

use rand::{rngs::StdRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};
use shim_core::prelude::*;

fn request_bytes(frames: &[(u8, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (address, body) in frames {
        write_request(&mut buf, *address, body).unwrap();
    }
    buf
}

fn responses(mut output: &[u8]) -> Vec<ResponseFrame> {
    let mut frames = Vec::new();
    while !output.is_empty() {
        frames.push(read_response(&mut output).unwrap());
    }
    frames
}

fn serve_with<D: PrecompileDispatch>(dispatcher: D, input: Vec<u8>) -> (ServeStats, Vec<u8>) {
    let mut reader = Cursor::new(input);
    let mut output = Vec::new();
    let stats = PipeServer::new(dispatcher)
        .serve(&mut reader, &mut output)
        .unwrap();
    (stats, output)
}

/// Random-sized reads, to show framing does not depend on chunking.
struct Chunked {
    inner: Cursor<Vec<u8>>,
    rng: StdRng,
}

impl Read for Chunked {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let max = buf.len().min(self.rng.gen_range(1..17));
        self.inner.read(&mut buf[..max])
    }
}

#[test]
fn test_sha256_end_to_end() {
    let data = [0x11u8; 32];
    let mut input = vec![0x00, 0x20, 0x02];
    input.extend_from_slice(&data);

    let dispatcher = Dispatcher::from_config(&ShimConfig::default());
    let (stats, output) = serve_with(&dispatcher, input);

    let expected = Sha256::digest(data);
    assert_eq!(output.len(), 3 + 32);
    assert_eq!(&output[..3], &[0x00, 0x20, 0x00]);
    assert_eq!(&output[3..], expected.as_slice());
    assert_eq!(stats.successful, 1);
}

#[test]
fn test_unassigned_address_end_to_end() {
    let dispatcher = Dispatcher::from_config(&ShimConfig::default());
    let (stats, output) = serve_with(&dispatcher, vec![0x00, 0x00, 0xff]);

    let frames = responses(&output);
    assert_eq!(frames.len(), 1);
    assert!(frames[0].is_error());
    assert!(!frames[0].body.is_empty());
    assert_eq!(frames[0].message(), "precompile 0xff does not exist");
    assert_eq!(stats.unknown_address, 1);
}

#[test]
fn test_loop_continues_after_errors() {
    let dispatcher = Dispatcher::from_config(&ShimConfig::default());
    let input = request_bytes(&[
        (0xff, &b""[..]),
        (0x09, &b"too short for blake2f"[..]),
        (0x04, &b"still here"[..]),
    ]);
    let (stats, output) = serve_with(&dispatcher, input);

    let frames = responses(&output);
    assert_eq!(frames.len(), 3);
    assert!(frames[0].is_error());
    assert!(frames[1].is_error());
    assert_eq!(frames[2], ResponseFrame::success(b"still here".to_vec()));
    assert_eq!(
        stats,
        ServeStats {
            frames_received: 3,
            successful: 1,
            failed: 1,
            unknown_address: 1,
        }
    );
}

#[test]
fn test_truncated_trailing_frame_gets_no_reply() {
    let dispatcher = Dispatcher::from_config(&ShimConfig::default());
    let mut input = request_bytes(&[(0x04, &b"complete"[..])]);
    input.extend_from_slice(&[0x00, 0x10, 0x04, 0xaa]);
    let (stats, output) = serve_with(&dispatcher, input);

    assert_eq!(stats.frames_received, 1);
    assert_eq!(responses(&output).len(), 1);
}

#[test]
fn test_empty_input_writes_nothing() {
    let dispatcher = Dispatcher::from_config(&ShimConfig::default());
    let (stats, output) = serve_with(&dispatcher, Vec::new());
    assert!(output.is_empty());
    assert_eq!(stats, ServeStats::default());
}

#[test]
fn test_fragmented_stream_with_test_double() {
    let registry = InMemoryRegistry::new().with(0x01, |input, _| {
        let reversed: Vec<u8> = input.iter().rev().copied().collect();
        Ok(PrecompileOutput::new(1, reversed))
    });
    let dispatcher = Dispatcher::new(registry, 1_000_000);

    let mut rng = StdRng::seed_from_u64(7);
    let bodies: Vec<Vec<u8>> = [0usize, 1, 500, MAX_BODY_LEN]
        .iter()
        .map(|&len| (0..len).map(|_| rng.gen()).collect())
        .collect();
    let frames: Vec<(u8, &[u8])> = bodies.iter().map(|b| (0x01, b.as_slice())).collect();

    let mut reader = Chunked {
        inner: Cursor::new(request_bytes(&frames)),
        rng: StdRng::seed_from_u64(99),
    };
    let mut output = Vec::new();
    PipeServer::new(&dispatcher)
        .serve(&mut reader, &mut output)
        .unwrap();

    let replies = responses(&output);
    assert_eq!(replies.len(), bodies.len());
    for (reply, body) in replies.iter().zip(&bodies) {
        let reversed: Vec<u8> = body.iter().rev().copied().collect();
        assert_eq!(reply, &ResponseFrame::success(reversed));
    }
}

#[test]
fn test_gas_budget_from_config() {
    // 600 + 120 per word for ripemd160; 32 bytes need 720.
    let config = ShimConfig {
        gas_budget: 700,
        ..ShimConfig::default()
    };
    let dispatcher = Dispatcher::from_config(&config);
    let (stats, output) = serve_with(&dispatcher, request_bytes(&[(0x03, &[0u8; 32][..])]));

    let frames = responses(&output);
    assert!(frames[0].is_error());
    assert_eq!(stats.failed, 1);
}
