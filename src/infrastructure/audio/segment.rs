use std::io::Cursor;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::AudioError;

/// Decoded audio held as interleaved signed 16-bit samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    /// `duration_ms` of digital silence; zero gives an empty segment
    pub fn silence(duration_ms: u32, sample_rate: u32, channels: u16) -> Self {
        let frames = (u64::from(duration_ms) * u64::from(sample_rate) / 1000) as usize;
        Self {
            samples: vec![0; frames * usize::from(channels)],
            sample_rate,
            channels,
        }
    }

    /// Decode an encoded stream (MP3) into PCM
    pub fn decode(bytes: &[u8]) -> Result<Self, AudioError> {
        Self::decode_indexed(bytes, 0)
    }

    pub(super) fn decode_indexed(bytes: &[u8], index: usize) -> Result<Self, AudioError> {
        let fail = |reason: String| AudioError::Decode { index, reason };

        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("mp3");

        let format_opts = FormatOptions {
            enable_gapless: true,
            ..Default::default()
        };

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &MetadataOptions::default())
            .map_err(|e| fail(format!("unrecognized stream: {e}")))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| fail("no decodable audio track".to_string()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| fail(format!("unsupported codec: {e}")))?;

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(fail(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    sample_rate.get_or_insert(spec.rate);
                    channels.get_or_insert(spec.channels.count() as u16);

                    let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
                // A corrupt frame is skipped, the rest of the stream is still usable
                Err(SymphoniaError::DecodeError(reason)) => {
                    tracing::warn!(segment_index = index, reason = reason, "Skipping undecodable frame");
                }
                Err(e) => return Err(fail(e.to_string())),
            }
        }

        let (Some(sample_rate), Some(channels)) = (sample_rate, channels) else {
            return Err(fail("stream has no sample rate or channel layout".to_string()));
        };
        if samples.is_empty() {
            return Err(fail("stream contains no audio frames".to_string()));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / usize::from(self.channels)
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }

    /// Append `other`, which must already share this segment's layout
    pub(super) fn append(&mut self, other: &AudioSegment) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        debug_assert_eq!(self.channels, other.channels);
        self.samples.extend_from_slice(&other.samples);
    }

    /// Convert to the given layout: channels are duplicated or averaged,
    /// the sample rate is changed by linear interpolation.
    pub(super) fn conform(self, sample_rate: u32, channels: u16) -> AudioSegment {
        let remixed = if self.channels == channels {
            self
        } else {
            self.remix(channels)
        };

        if remixed.sample_rate == sample_rate {
            remixed
        } else {
            remixed.resample(sample_rate)
        }
    }

    fn remix(self, channels: u16) -> AudioSegment {
        let source_channels = usize::from(self.channels);
        let target_channels = usize::from(channels);

        let samples = self
            .samples
            .chunks_exact(source_channels)
            .flat_map(|frame| {
                let mono = if target_channels == 1 {
                    let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                    Some((sum / source_channels as i32) as i16)
                } else {
                    None
                };
                (0..target_channels)
                    .map(move |c| mono.unwrap_or_else(|| frame[c.min(source_channels - 1)]))
            })
            .collect();

        AudioSegment {
            samples,
            sample_rate: self.sample_rate,
            channels,
        }
    }

    fn resample(self, sample_rate: u32) -> AudioSegment {
        let channels = usize::from(self.channels);
        let source_frames = self.frames();
        let target_frames =
            (source_frames as u64 * u64::from(sample_rate) / u64::from(self.sample_rate)) as usize;
        let step = f64::from(self.sample_rate) / f64::from(sample_rate);

        let mut samples = Vec::with_capacity(target_frames * channels);
        for frame in 0..target_frames {
            let position = frame as f64 * step;
            let left = (position.floor() as usize).min(source_frames.saturating_sub(1));
            let right = (left + 1).min(source_frames.saturating_sub(1));
            let fraction = position - left as f64;

            for channel in 0..channels {
                let a = f64::from(self.samples[left * channels + channel]);
                let b = f64::from(self.samples[right * channels + channel]);
                samples.push((a + (b - a) * fraction).round() as i16);
            }
        }

        AudioSegment {
            samples,
            sample_rate,
            channels: self.channels,
        }
    }
}
