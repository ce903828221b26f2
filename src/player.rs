//! The playback core: the load session state machine plus the scheduler
//! that advances a decoded sequence against a caller-supplied clock.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::decode::{FrameDecoder, GifFrameDecoder, has_gif_signature};
use crate::error::LoadError;
use crate::frames::FrameSequence;
use crate::sink::{AspectSink, DisplaySink, NullSink};

/// Session state. Exactly one load/play session is active at a time;
/// there is no queue of pending loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded; the display shows nothing.
    None,
    /// A load is in flight; the display is unchanged.
    Loading,
    /// A sequence is installed, cursor at frame 0, not advancing.
    Ready,
    /// The cursor advances on the tick schedule.
    Playing,
    /// Advancing suspended; the display holds the last shown frame.
    Pause,
}

struct PendingLoad {
    rx: oneshot::Receiver<Result<FrameSequence, LoadError>>,
    auto_play: bool,
}

/// Looping animated-image playback.
///
/// All mutation happens on the caller's thread through these methods; the
/// only asynchronous work is the decode closure on the blocking pool,
/// whose sole output travels over a oneshot channel owned here. Dropping
/// that receiver (on [`clear`](Self::clear), replacement, or drop of the
/// player) is the cancellation guard: a late decode completion has
/// nowhere to land and is discarded.
pub struct GifPlayer {
    decoder: Arc<dyn FrameDecoder>,
    display: Box<dyn DisplaySink>,
    aspect: Box<dyn AspectSink>,
    state: PlaybackState,
    sequence: Option<FrameSequence>,
    index: usize,
    due: Instant,
    loops_done: u32,
    pending: Option<PendingLoad>,
}

impl GifPlayer {
    pub fn new(
        display: Box<dyn DisplaySink>,
        aspect: Box<dyn AspectSink>,
        cfg: &PlayerConfig,
    ) -> Self {
        let decoder = GifFrameDecoder::new(cfg.min_frame_delay, cfg.max_frames);
        Self::with_decoder(Arc::new(decoder), display, aspect)
    }

    /// Player with a caller-supplied decoder. Tests use this to drive the
    /// load pipeline with canned or gated sequences.
    pub fn with_decoder(
        decoder: Arc<dyn FrameDecoder>,
        display: Box<dyn DisplaySink>,
        aspect: Box<dyn AspectSink>,
    ) -> Self {
        Self {
            decoder,
            display,
            aspect,
            state: PlaybackState::None,
            sequence: None,
            index: 0,
            due: Instant::now(),
            loops_done: 0,
            pending: None,
        }
    }

    /// Player with no display attached.
    pub fn headless(cfg: &PlayerConfig) -> Self {
        Self::new(Box::new(NullSink), Box::new(NullSink), cfg)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Loop count of the installed sequence; 0 both for "loop forever"
    /// and for "nothing installed".
    pub fn loop_count(&self) -> u32 {
        self.sequence.as_ref().map_or(0, FrameSequence::loop_count)
    }

    pub fn width(&self) -> u32 {
        self.sequence.as_ref().map_or(0, FrameSequence::width)
    }

    pub fn height(&self) -> u32 {
        self.sequence.as_ref().map_or(0, FrameSequence::height)
    }

    /// Index of the frame currently on display.
    pub fn frame_index(&self) -> usize {
        self.index
    }

    pub fn loops_done(&self) -> u32 {
        self.loops_done
    }

    pub fn is_load_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a load session for the GIF at `path`.
    ///
    /// Guards run synchronously before anything else: an empty path fails
    /// with `InvalidArgument` and a load already in flight fails with
    /// `AlreadyLoading`, both without touching the current session. Once
    /// accepted, the read and the signature check also run synchronously;
    /// only the decode goes to the blocking pool. The completed decode is
    /// picked up by the next [`advance`](Self::advance).
    pub fn load_from_path(&mut self, path: &Path, auto_play: bool) -> Result<(), LoadError> {
        if path.as_os_str().is_empty() {
            return Err(LoadError::InvalidArgument);
        }
        if self.state == PlaybackState::Loading {
            warn!("load rejected: already loading");
            return Err(LoadError::AlreadyLoading);
        }
        self.state = PlaybackState::Loading;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.state = PlaybackState::None;
                return Err(LoadError::Read(err));
            }
        };
        debug!(path = %path.display(), len = bytes.len(), "read gif source");
        self.start_decode(bytes, auto_play)
    }

    /// Same pipeline as [`load_from_path`](Self::load_from_path), minus
    /// the file read.
    pub fn load_from_bytes(&mut self, bytes: Vec<u8>, auto_play: bool) -> Result<(), LoadError> {
        if self.state == PlaybackState::Loading {
            warn!("load rejected: already loading");
            return Err(LoadError::AlreadyLoading);
        }
        self.state = PlaybackState::Loading;
        self.start_decode(bytes, auto_play)
    }

    fn start_decode(&mut self, bytes: Vec<u8>, auto_play: bool) -> Result<(), LoadError> {
        if bytes.is_empty() {
            self.state = PlaybackState::None;
            return Err(LoadError::Read(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "source is empty",
            )));
        }
        if !has_gif_signature(&bytes) {
            self.state = PlaybackState::None;
            return Err(LoadError::InvalidFormat);
        }

        // The previous sequence (and any stale in-flight decode) goes
        // away before the replacement is produced.
        self.clear();
        self.state = PlaybackState::Loading;

        let (tx, rx) = oneshot::channel();
        let decoder = Arc::clone(&self.decoder);
        spawn_blocking(move || {
            let outcome = decoder.decode(&bytes).map_err(LoadError::Decode);
            // Fails if the session was cleared or the player dropped while
            // decoding; the result is discarded then.
            let _ = tx.send(outcome);
        });
        self.pending = Some(PendingLoad { rx, auto_play });
        Ok(())
    }

    /// Installs a pre-decoded sequence directly, bypassing the loader.
    ///
    /// Behaves like a synchronous decode success except that it never
    /// auto-plays: the session lands in `Ready` with frame 0 on display.
    /// An empty sequence leaves the session untouched.
    pub fn set_frames(&mut self, seq: FrameSequence, now: Instant) {
        if seq.is_empty() {
            warn!("ignoring empty frame sequence");
            return;
        }
        self.clear();
        self.install(seq, now);
    }

    /// No-op unless the session is `Ready` or `Pause`.
    pub fn play(&mut self) {
        if matches!(self.state, PlaybackState::Ready | PlaybackState::Pause) {
            debug!(index = self.index, "play");
            self.state = PlaybackState::Playing;
        }
    }

    /// No-op unless the session is `Playing`. The display keeps the
    /// current frame.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Playing {
            debug!(index = self.index, "stop");
            self.state = PlaybackState::Pause;
        }
    }

    /// Tears the session down from any state: releases the frame buffers,
    /// clears the display, zeroes every counter and dimension, and
    /// discards any decode still in flight.
    pub fn clear(&mut self) {
        self.pending = None;
        self.sequence = None;
        self.index = 0;
        self.loops_done = 0;
        self.state = PlaybackState::None;
        self.display.clear();
    }

    /// One scheduler tick; call from any loop with a monotonic `now`.
    ///
    /// Polls an in-flight decode first, then advances the cursor when the
    /// current frame's deadline has passed. Each deadline is scheduled
    /// relative to the instant the switch actually happened, so tick
    /// jitter never accumulates as drift.
    pub fn advance(&mut self, now: Instant) {
        self.poll_pending(now);
        if self.state != PlaybackState::Playing {
            return;
        }
        // Defensive: Playing without a sequence should not occur.
        let Some(seq) = self.sequence.as_ref() else {
            return;
        };
        if seq.is_empty() {
            return;
        }
        if now < self.due {
            return;
        }

        self.index = (self.index + 1) % seq.len();
        if self.index == 0 && seq.loop_count() > 0 {
            self.loops_done += 1;
            if self.loops_done >= seq.loop_count() {
                // Freeze at frame 0 without displaying it; the last frame
                // of the final loop stays on screen.
                info!(loops = self.loops_done, "loop limit reached");
                self.state = PlaybackState::Pause;
                return;
            }
        }
        let Some(frame) = seq.frame(self.index) else {
            return;
        };
        self.display.show(frame);
        self.due = now + frame.delay;
    }

    fn poll_pending(&mut self, now: Instant) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        match pending.rx.try_recv() {
            Ok(Ok(seq)) => {
                self.install(seq, now);
                if pending.auto_play {
                    self.play();
                }
            }
            Ok(Err(err)) => {
                error!(error = %err, "gif load failed");
                self.state = PlaybackState::None;
            }
            Err(TryRecvError::Empty) => {
                self.pending = Some(pending);
            }
            Err(TryRecvError::Closed) => {
                error!("decode task vanished without a result");
                self.state = PlaybackState::None;
            }
        }
    }

    fn install(&mut self, seq: FrameSequence, now: Instant) {
        info!(
            frames = seq.len(),
            loop_count = seq.loop_count(),
            width = seq.width(),
            height = seq.height(),
            "sequence installed"
        );
        self.index = 0;
        self.loops_done = 0;
        self.aspect.on_dimensions(seq.width(), seq.height());
        self.sequence = Some(seq);
        if let Some(first) = self.sequence.as_ref().and_then(|seq| seq.frame(0)) {
            self.display.show(first);
            self.due = now + first.delay;
        }
        self.state = PlaybackState::Ready;
    }
}

impl Drop for GifPlayer {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::Frame;
    use std::time::Duration;

    fn sequence(frames: usize, delay: Duration, loop_count: u32) -> FrameSequence {
        let frames = (0..frames)
            .map(|i| Frame {
                pixels: vec![i as u8; 4],
                width: 1,
                height: 1,
                delay,
            })
            .collect();
        FrameSequence::new(frames, loop_count, 1, 1)
    }

    fn player() -> GifPlayer {
        GifPlayer::headless(&PlayerConfig::default())
    }

    #[test]
    fn play_and_stop_are_gated_by_state() {
        let mut p = player();
        p.play();
        assert_eq!(p.state(), PlaybackState::None);
        p.stop();
        assert_eq!(p.state(), PlaybackState::None);

        let now = Instant::now();
        p.set_frames(sequence(2, Duration::from_millis(50), 0), now);
        assert_eq!(p.state(), PlaybackState::Ready);
        p.stop();
        assert_eq!(p.state(), PlaybackState::Ready);
        p.play();
        assert_eq!(p.state(), PlaybackState::Playing);
        p.play();
        assert_eq!(p.state(), PlaybackState::Playing);
        p.stop();
        assert_eq!(p.state(), PlaybackState::Pause);
    }

    #[test]
    fn empty_injection_is_a_no_op_from_any_state() {
        let mut p = player();
        let now = Instant::now();
        p.set_frames(FrameSequence::default(), now);
        assert_eq!(p.state(), PlaybackState::None);

        p.set_frames(sequence(2, Duration::from_millis(50), 0), now);
        p.play();
        p.set_frames(FrameSequence::default(), now);
        assert_eq!(p.state(), PlaybackState::Playing);
        assert_eq!(p.loop_count(), 0);
        assert_eq!(p.width(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut p = player();
        let now = Instant::now();
        p.set_frames(sequence(3, Duration::from_millis(10), 2), now);
        p.play();
        p.advance(now + Duration::from_millis(10));
        assert_eq!(p.frame_index(), 1);

        p.clear();
        assert_eq!(p.state(), PlaybackState::None);
        assert_eq!(p.frame_index(), 0);
        assert_eq!(p.loops_done(), 0);
        assert_eq!(p.loop_count(), 0);
        assert_eq!((p.width(), p.height()), (0, 0));
        assert!(!p.is_load_pending());
    }

    #[test]
    fn advance_before_the_deadline_is_a_no_op() {
        let mut p = player();
        let now = Instant::now();
        p.set_frames(sequence(2, Duration::from_millis(100), 0), now);
        p.play();
        p.advance(now + Duration::from_millis(99));
        assert_eq!(p.frame_index(), 0);
        p.advance(now + Duration::from_millis(100));
        assert_eq!(p.frame_index(), 1);
    }

    #[test]
    fn injection_never_auto_plays() {
        let mut p = player();
        let now = Instant::now();
        p.set_frames(sequence(2, Duration::from_millis(10), 0), now);
        assert_eq!(p.state(), PlaybackState::Ready);
        p.advance(now + Duration::from_secs(1));
        assert_eq!(p.frame_index(), 0);
    }
}
