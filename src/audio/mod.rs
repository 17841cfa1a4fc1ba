/*!
 * Audio boundary: PCM buffers and the codec backend.
 *
 * - `buffer`: the in-memory PCM buffer the timeline core works on
 * - `ffmpeg`: decode/encode through the ffmpeg command line tools
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::AudioError;

pub use self::buffer::AudioBuffer;
pub use self::ffmpeg::FfmpegCodec;

pub mod buffer;
pub mod ffmpeg;

/// Common trait for codec backends
///
/// Converts between container files on disk and in-memory PCM. The timeline
/// core never touches files; the controller decodes before and encodes after.
#[async_trait]
pub trait AudioCodec: Send + Sync + Debug {
    /// Decode the first audio stream of `path` into PCM
    async fn decode(&self, path: &Path) -> Result<AudioBuffer, AudioError>;

    /// Encode `buffer` into `path`, picking the container from its extension
    async fn encode(&self, buffer: &AudioBuffer, path: &Path) -> Result<(), AudioError>;
}
