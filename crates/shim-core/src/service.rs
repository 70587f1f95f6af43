//! # Dispatch Service
//!
//! `Dispatcher` maps `(address, input)` to a precompile result under a gas
//! budget fixed at construction. `PipeServer` drives it from a request stream
//! and writes one response frame per request.
//!
//! ## Loop Termination
//!
//! - Any read-side failure (end of input, truncated frame, I/O error) ends
//!   the loop cleanly. Nothing is written for a frame that was not fully read.
//! - A write failure ends the loop with an error.
//! - Unknown addresses and precompile failures are answered with error frames
//!   and the loop continues.

use std::io::{Read, Write};

use tracing::{debug, info, warn};

use crate::adapters::stdio::{read_request, write_response};
use crate::adapters::RevmRegistry;
use crate::config::ShimConfig;
use crate::domain::{DispatchResult, RequestFrame, ResponseFrame, Status, MAX_BODY_LEN};
use crate::errors::{DispatchError, WireError, WireResult};
use crate::ports::{PrecompileDispatch, PrecompileRegistry};

// =============================================================================
// DISPATCHER
// =============================================================================

/// Looks up precompiles in an injected registry and runs them.
pub struct Dispatcher<R> {
    registry: R,
    gas_budget: u64,
}

impl<R: PrecompileRegistry> Dispatcher<R> {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: R, gas_budget: u64) -> Self {
        Self {
            registry,
            gas_budget,
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }
}

impl Dispatcher<RevmRegistry> {
    /// Dispatcher over the `revm-precompile` set selected by `config`.
    #[must_use]
    pub fn from_config(config: &ShimConfig) -> Self {
        Self::new(RevmRegistry::new(config.fork), config.gas_budget)
    }
}

impl<R: PrecompileRegistry> PrecompileDispatch for Dispatcher<R> {
    fn gas_budget(&self) -> u64 {
        self.gas_budget
    }

    fn dispatch(&self, address: u8, input: &[u8]) -> DispatchResult {
        let Some(precompile) = self.registry.get(address) else {
            debug!("No precompile at 0x{:02x}", address);
            return Err(DispatchError::UnknownPrecompile(address));
        };

        let result = precompile.execute(input, self.gas_budget);
        match &result {
            Ok(out) => debug!(
                "0x{:02x}: {} bytes in, {} bytes out, {} gas",
                address,
                input.len(),
                out.output.len(),
                out.gas_used
            ),
            Err(e) => debug!("0x{:02x}: {} bytes in, failed: {}", address, input.len(), e),
        }
        result
    }
}

// =============================================================================
// PIPE SERVER
// =============================================================================

/// Counters for one pipe session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    /// Request frames fully read.
    pub frames_received: u64,
    /// Success frames written.
    pub successful: u64,
    /// Error frames written because the precompile failed.
    pub failed: u64,
    /// Error frames written because the address was unknown.
    pub unknown_address: u64,
}

/// Convert a dispatch result into the response frame for the wire.
///
/// Output that cannot fit the 16-bit length field becomes an error frame.
#[must_use]
pub fn frame_result(result: DispatchResult) -> ResponseFrame {
    match result {
        Ok(out) if out.output.len() > MAX_BODY_LEN => ResponseFrame::error(
            DispatchError::OutputTooLarge {
                len: out.output.len(),
                max: MAX_BODY_LEN,
            }
            .to_string(),
        ),
        Ok(out) => ResponseFrame::success(out.output),
        Err(e) => {
            let mut message = e.to_string();
            if message.len() > MAX_BODY_LEN {
                let mut end = MAX_BODY_LEN;
                while !message.is_char_boundary(end) {
                    end -= 1;
                }
                message.truncate(end);
            }
            ResponseFrame::error(message)
        }
    }
}

/// Sequential request/response loop over one stream pair.
pub struct PipeServer<D> {
    dispatcher: D,
    stats: ServeStats,
}

impl<D: PrecompileDispatch> PipeServer<D> {
    /// Create a server around `dispatcher`.
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            stats: ServeStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> ServeStats {
        self.stats
    }

    /// Answer one request.
    pub fn handle(&mut self, request: &RequestFrame) -> ResponseFrame {
        self.stats.frames_received += 1;
        let result = self.dispatcher.dispatch(request.address, &request.body);
        let unknown = matches!(&result, Err(e) if e.is_unknown_precompile());

        // Oversized output is framed as an error, so count by the frame.
        let response = frame_result(result);
        match (response.status, unknown) {
            (Status::Success, _) => self.stats.successful += 1,
            (Status::Error, true) => self.stats.unknown_address += 1,
            (Status::Error, false) => self.stats.failed += 1,
        }
        response
    }

    /// Serve frames until the input ends.
    ///
    /// # Errors
    ///
    /// Only write failures are returned; read failures end the session.
    pub fn serve<Rd, W>(&mut self, reader: &mut Rd, writer: &mut W) -> WireResult<ServeStats>
    where
        Rd: Read + ?Sized,
        W: Write + ?Sized,
    {
        info!(
            "Serving precompile requests (gas budget {})",
            self.dispatcher.gas_budget()
        );

        loop {
            let request = match read_request(reader) {
                Ok(request) => request,
                Err(WireError::Closed) => {
                    debug!("Input closed");
                    break;
                }
                Err(e) if e.is_end_of_input() => {
                    warn!("Stopping on read failure: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            };

            let response = self.handle(&request);
            write_response(writer, &response)?;
        }

        info!(
            "Session finished: {} frames, {} ok, {} failed, {} unknown address",
            self.stats.frames_received,
            self.stats.successful,
            self.stats.failed,
            self.stats.unknown_address
        );
        Ok(self.stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRegistry;
    use crate::domain::PrecompileOutput;

    fn test_registry() -> InMemoryRegistry {
        InMemoryRegistry::new()
            .with(0x04, |input, _| Ok(PrecompileOutput::new(15, input)))
            .with(0x06, |_, _| Err(DispatchError::Execution("bn254 point not on curve".into())))
            .with(0x07, |_, gas| Ok(PrecompileOutput::new(gas, vec![0u8; MAX_BODY_LEN + 1])))
    }

    #[test]
    fn test_unknown_address() {
        let dispatcher = Dispatcher::new(test_registry(), 1_000);
        for input in [&b""[..], &b"anything"[..]] {
            let err = dispatcher.dispatch(0xff, input).unwrap_err();
            assert_eq!(err, DispatchError::UnknownPrecompile(0xff));
        }
    }

    #[test]
    fn test_success_output_unchanged() {
        let dispatcher = Dispatcher::new(test_registry(), 1_000);
        let out = dispatcher.dispatch(0x04, &[0, 1, 2, 255]).unwrap();
        assert_eq!(out.output, vec![0, 1, 2, 255]);
        assert_eq!(out.gas_used, 15);
    }

    #[test]
    fn test_gas_budget_passed_through() {
        let dispatcher = Dispatcher::new(test_registry(), 1_234);
        assert_eq!(dispatcher.gas_budget(), 1_234);
        let out = dispatcher.dispatch(0x07, &[]).unwrap();
        assert_eq!(out.gas_used, 1_234);
    }

    #[test]
    fn test_execution_failure_message() {
        let dispatcher = Dispatcher::new(test_registry(), 1_000);
        let frame = frame_result(dispatcher.dispatch(0x06, &[1, 2, 3]));
        assert_eq!(frame.status, Status::Error);
        assert_eq!(frame.message(), "bn254 point not on curve");
    }

    #[test]
    fn test_oversized_output_becomes_error_frame() {
        let dispatcher = Dispatcher::new(test_registry(), 1_000);
        let frame = frame_result(dispatcher.dispatch(0x07, &[]));
        assert!(frame.is_error());
        assert!(frame.message().contains("exceeds frame limit"));
    }

    #[test]
    fn test_handle_counts() {
        let mut server = PipeServer::new(Dispatcher::new(test_registry(), 1_000));
        server.handle(&RequestFrame::new(0x04, b"x".to_vec()));
        server.handle(&RequestFrame::new(0x06, Vec::new()));
        server.handle(&RequestFrame::new(0x42, Vec::new()));
        assert_eq!(
            server.stats(),
            ServeStats {
                frames_received: 3,
                successful: 1,
                failed: 1,
                unknown_address: 1,
            }
        );
    }
}
