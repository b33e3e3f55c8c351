use crate::script::AudioCue;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded PCM, interleaved f32
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }
}

/// Decodes narration clips into raw samples
pub struct AudioDecoder;

impl AudioDecoder {
    pub fn decode(path: &Path) -> Result<DecodedAudio> {
        let src = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("Unsupported audio format: {}", path.display()))?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No supported audio track found")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Unsupported codec")?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track.codec_params.channels.unwrap_or_default().count() as u16;

        let mut samples = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e).context("Failed to read audio packet"),
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(path = %path.display(), "skipping undecodable packet: {}", e);
                }
                Err(e) => return Err(e).context("Failed to decode audio"),
            }
        }

        let audio = DecodedAudio {
            samples,
            sample_rate,
            channels: channels.max(1),
        };
        debug!(
            path = %path.display(),
            seconds = audio.duration(),
            sample_rate,
            "decoded narration"
        );
        Ok(audio)
    }
}

/// Lays narration clips onto one output track at their cue offsets
pub struct AudioMixer {
    output_sample_rate: u32,
    output_channels: u16,
    tracks: Vec<PlacedClip>,
}

struct PlacedClip {
    audio: DecodedAudio,
    offset: f32,
    volume: f32,
}

impl AudioMixer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            output_sample_rate: sample_rate,
            output_channels: channels.max(1),
            tracks: Vec::new(),
        }
    }

    pub fn add_track(&mut self, audio: DecodedAudio, offset: f32, volume: f32) {
        self.tracks.push(PlacedClip {
            audio,
            offset,
            volume,
        });
    }

    /// Decode and place every cue, resolving sources against `base`
    pub fn add_cues(&mut self, cues: &[AudioCue], base: &Path) -> Result<()> {
        for cue in cues {
            let path = base.join(&cue.source);
            let audio = AudioDecoder::decode(&path)
                .with_context(|| format!("Failed to load narration for cue '{}'", cue.id))?;
            self.add_track(audio, cue.offset, cue.volume);
        }
        Ok(())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Latest instant any placed clip is still sounding
    pub fn end_time(&self) -> f32 {
        self.tracks
            .iter()
            .map(|t| t.offset + t.audio.duration())
            .fold(0.0, f32::max)
    }

    /// Seconds of narration that fall past `duration_seconds`
    pub fn overrun(&self, duration_seconds: f32) -> f32 {
        (self.end_time() - duration_seconds).max(0.0)
    }

    /// Mix all placed clips into one interleaved buffer of `duration_seconds`
    pub fn mix(&self, duration_seconds: f32) -> Vec<f32> {
        let overrun = self.overrun(duration_seconds);
        if overrun > 0.0 {
            warn!(
                end = self.end_time(),
                duration = duration_seconds,
                "narration runs {:.2}s past the end of the video and will be cut",
                overrun
            );
        }
        let channels = self.output_channels as usize;
        let total_frames = (duration_seconds * self.output_sample_rate as f32).ceil() as usize;
        let mut mixed = vec![0.0; total_frames * channels];

        for track in &self.tracks {
            let audio = &track.audio;
            let in_channels = audio.channels as usize;
            let start_frame = (track.offset * self.output_sample_rate as f32).round() as usize;
            // Nearest-neighbour resampling
            let rate_ratio = audio.sample_rate as f64 / self.output_sample_rate as f64;

            for (frame, out) in mixed
                .chunks_exact_mut(channels)
                .enumerate()
                .skip(start_frame)
            {
                let input_frame = ((frame - start_frame) as f64 * rate_ratio) as usize;
                if input_frame * in_channels >= audio.samples.len() {
                    break;
                }
                for (channel, sample) in out.iter_mut().enumerate() {
                    let input_channel = if in_channels == 1 { 0 } else { channel % in_channels };
                    *sample += audio.samples[input_frame * in_channels + input_channel] * track.volume;
                }
            }
        }

        // Soft clipping
        for sample in &mut mixed {
            *sample = sample.tanh();
        }

        mixed
    }

    /// Export mixed audio to WAV file
    pub fn export(&self, path: &Path, samples: &[f32]) -> Result<()> {
        let spec = hound::WavSpec {
            channels: self.output_channels,
            sample_rate: self.output_sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

        for &sample in samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample")?;
        }

        writer.finalize().context("Failed to finalize WAV file")?;
        Ok(())
    }
}
