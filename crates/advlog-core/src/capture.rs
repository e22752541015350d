//! Capture loop: read raw HCI events from a source and append them to a log.
//!
//! The platform socket lives outside this crate. Anything that can hand
//! over one HCI event packet at a time implements [`EventSource`].

use std::io::{self, ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::log::LogWriter;

/// Packet type byte plus the 2-byte event header stripped from each event.
pub const HCI_EVENT_PREFIX_LEN: usize = 3;

/// Largest HCI event packet: type, header and a 255-byte parameter block.
pub const HCI_MAX_EVENT_SIZE: usize = 260;

/// A blocking source of raw HCI event packets.
pub trait EventSource {
    /// Read the next packet into `buf`, returning its length.
    ///
    /// `Ok(None)` means the read was interrupted without data; the capture
    /// loop re-checks its stop flag and calls again.
    fn next_event(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;

    /// Put back whatever event filter was installed before capture began.
    fn restore_filter(&mut self) -> io::Result<()>;
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        (**self).next_event(buf)
    }

    fn restore_filter(&mut self) -> io::Result<()> {
        (**self).restore_filter()
    }
}

/// Source of frame timestamps.
pub trait Clock {
    /// Whole seconds since capture start.
    fn elapsed_secs(&self) -> u64;
}

/// Monotonic clock started when constructed.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl<F: Fn() -> u64> Clock for F {
    fn elapsed_secs(&self) -> u64 {
        self()
    }
}

/// Outcome of a finished capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Frames written to the log.
    pub frames: u64,
}

/// Capture events until `stop` is set or the source fails.
///
/// Each event is written as one frame with the 3-byte HCI prefix removed.
/// The source filter is restored exactly once before returning, whether
/// capture ended normally or with an error. A source or write error takes
/// precedence over a failure to restore the filter.
pub fn capture<S, W, C>(
    source: &mut S,
    writer: &mut LogWriter<W>,
    stop: &AtomicBool,
    clock: &C,
) -> Result<CaptureSummary>
where
    S: EventSource + ?Sized,
    W: Write,
    C: Clock + ?Sized,
{
    let mut buf = [0u8; HCI_MAX_EVENT_SIZE];
    let mut summary = CaptureSummary::default();

    let outcome = loop {
        if stop.load(Ordering::Relaxed) {
            break Ok(());
        }

        let len = match source.next_event(&mut buf) {
            Ok(Some(len)) => len.min(buf.len()),
            Ok(None) => continue,
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                continue;
            }
            Err(e) => break Err(e.into()),
        };

        if len < HCI_EVENT_PREFIX_LEN {
            debug!(len, "Skipping runt HCI packet");
            continue;
        }

        let timestamp = clock.elapsed_secs();
        if let Err(e) = writer.write_frame(timestamp, &buf[HCI_EVENT_PREFIX_LEN..len]) {
            break Err(e);
        }
        summary.frames += 1;
    };

    let restored = source.restore_filter();
    info!("Captured {} advertisements", summary.frames);

    match (outcome, restored) {
        (Err(e), restored) => {
            if let Err(restore_err) = restored {
                warn!(error = %restore_err, "Failed to restore event filter");
            }
            Err(e)
        }
        (Ok(()), Err(e)) => Err(e.into()),
        (Ok(()), Ok(())) => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::log::{Frame, LogReader};
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Arc;

    enum Step {
        Event(Vec<u8>),
        Interrupted,
        Fail,
    }

    struct ScriptedSource {
        steps: VecDeque<Step>,
        stop: Arc<AtomicBool>,
        restored: usize,
        fail_restore: bool,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>, stop: Arc<AtomicBool>) -> Self {
            Self {
                steps: steps.into(),
                stop,
                restored: 0,
                fail_restore: false,
            }
        }
    }

    impl EventSource for ScriptedSource {
        fn next_event(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
            match self.steps.pop_front() {
                Some(Step::Event(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(Some(bytes.len()))
                }
                Some(Step::Interrupted) => Ok(None),
                Some(Step::Fail) => Err(io::Error::new(ErrorKind::BrokenPipe, "device gone")),
                None => {
                    self.stop.store(true, Ordering::Relaxed);
                    Ok(None)
                }
            }
        }

        fn restore_filter(&mut self) -> io::Result<()> {
            self.restored += 1;
            if self.fail_restore {
                Err(io::Error::new(ErrorKind::PermissionDenied, "filter"))
            } else {
                Ok(())
            }
        }
    }

    fn event(body: &[u8]) -> Step {
        let mut bytes = vec![0x04, 0x3e, body.len() as u8];
        bytes.extend_from_slice(body);
        Step::Event(bytes)
    }

    fn frames(bytes: Vec<u8>) -> Vec<Frame> {
        LogReader::new(Cursor::new(bytes))
            .collect::<Result<_>>()
            .unwrap()
    }

    #[test]
    fn test_strips_prefix_and_timestamps() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = ScriptedSource::new(
            vec![event(&[0x02, 0x00]), Step::Interrupted, event(&[0x02, 0x01, 0xAA])],
            stop.clone(),
        );
        let mut writer = LogWriter::new(Vec::new());
        let clock = || 5u64;

        let summary = capture(&mut source, &mut writer, &stop, &clock).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(source.restored, 1);
        assert_eq!(
            frames(writer.into_inner().unwrap()),
            [Frame::new(5, vec![0x02, 0x00]), Frame::new(5, vec![0x02, 0x01, 0xAA])]
        );
    }

    #[test]
    fn test_stop_flag_set_before_start() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut source = ScriptedSource::new(vec![event(&[0x02])], stop.clone());
        let mut writer = LogWriter::new(Vec::new());

        let summary = capture(&mut source, &mut writer, &stop, &MonotonicClock::start()).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(source.restored, 1);
        assert_eq!(source.steps.len(), 1);
    }

    #[test]
    fn test_source_error_still_restores_filter() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = ScriptedSource::new(vec![event(&[0x02]), Step::Fail], stop.clone());
        source.fail_restore = true;
        let mut writer = LogWriter::new(Vec::new());

        let err = capture(&mut source, &mut writer, &stop, &|| 0u64).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
        assert_eq!(source.restored, 1);
        assert_eq!(writer.frames_written(), 1);
    }

    #[test]
    fn test_restore_failure_is_reported() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = ScriptedSource::new(vec![], stop.clone());
        source.fail_restore = true;
        let mut writer = LogWriter::new(Vec::new());

        let err = capture(&mut source, &mut writer, &stop, &|| 0u64).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_runt_packets_are_skipped() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = ScriptedSource::new(
            vec![Step::Event(vec![0x04, 0x3e]), event(&[0x02])],
            stop.clone(),
        );
        let mut writer = LogWriter::new(Vec::new());

        let summary = capture(&mut source, &mut writer, &stop, &|| 1u64).unwrap();
        assert_eq!(summary.frames, 1);
    }
}
