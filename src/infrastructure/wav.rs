// WAV packaging for buffered model speech
use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::domain::live::{SAMPLE_RATE, pcm_samples};

/// Wraps raw 16-bit little-endian PCM in a mono 24 kHz WAV container and
/// base64-encodes the file.
pub fn pcm_to_wav_base64(pcm: &[u8]) -> Result<String, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let spec = WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in pcm_samples(pcm) {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(BASE64.encode(cursor.into_inner()))
}
