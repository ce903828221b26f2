//! Frame decoding behind a trait, so playback can be driven by canned
//! sequences in tests and by other codecs later.

use std::io::Cursor;
use std::time::Duration;

use anyhow::{Context, Result, bail, ensure};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder};
use tracing::debug;

use crate::frames::{Frame, FrameSequence};

/// Accepted six-byte file signatures.
const GIF_SIGNATURES: [&[u8; 6]; 2] = [b"GIF87a", b"GIF89a"];

/// Returns true when `bytes` starts with `GIF87a` or `GIF89a`.
pub fn has_gif_signature(bytes: &[u8]) -> bool {
    bytes.len() >= 6 && GIF_SIGNATURES.iter().any(|sig| &bytes[..6] == *sig)
}

/// Turns raw encoded bytes into an ordered frame sequence, or fails.
///
/// Implementations run on the blocking pool; they may take their time but
/// must not touch playback state.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<FrameSequence>;
}

/// Decoder backed by the `image` crate's animated GIF support.
#[derive(Debug, Clone)]
pub struct GifFrameDecoder {
    min_frame_delay: Duration,
    max_frames: usize,
}

impl GifFrameDecoder {
    pub fn new(min_frame_delay: Duration, max_frames: usize) -> Self {
        Self {
            min_frame_delay,
            max_frames,
        }
    }
}

impl FrameDecoder for GifFrameDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<FrameSequence> {
        let decoder = GifDecoder::new(Cursor::new(bytes)).context("opening gif stream")?;
        let (width, height) = decoder.dimensions();
        let loop_count = netscape_loop_count(bytes);

        let mut frames = Vec::new();
        for frame in decoder.into_frames() {
            let frame = frame.context("decoding gif frame")?;
            if frames.len() >= self.max_frames {
                bail!("gif exceeds the {}-frame limit", self.max_frames);
            }
            // Zero and near-zero delays are common in the wild; clamp so
            // the installed sequence always has strictly positive delays.
            let delay = Duration::from(frame.delay()).max(self.min_frame_delay);
            let buffer = frame.into_buffer();
            let (w, h) = buffer.dimensions();
            frames.push(Frame {
                pixels: buffer.into_raw(),
                width: w,
                height: h,
                delay,
            });
        }
        ensure!(!frames.is_empty(), "gif contains no frames");

        debug!(
            frames = frames.len(),
            loop_count, width, height, "decoded gif"
        );
        Ok(FrameSequence::new(frames, loop_count, width, height))
    }
}

/// Reads the NETSCAPE2.0 loop extension, which the `image` crate does not
/// surface. The stored value is the loop count with 0 meaning forever; a
/// stream without the extension also loops forever, matching how most
/// players treat animated GIFs.
fn netscape_loop_count(bytes: &[u8]) -> u32 {
    const IDENT: &[u8] = b"NETSCAPE2.0";
    let Some(pos) = bytes.windows(IDENT.len()).position(|window| window == IDENT) else {
        return 0;
    };
    // The identifier is followed by a data sub-block: length 3, id 1,
    // then the count as a little-endian u16.
    let rest = &bytes[pos + IDENT.len()..];
    if rest.len() >= 4 && rest[0] == 0x03 && rest[1] == 0x01 {
        u32::from(u16::from_le_bytes([rest[2], rest[3]]))
    } else {
        0
    }
}
