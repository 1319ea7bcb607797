use crate::audio::error::AudioError;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::{debug, trace, warn};
use url::Url;

const LOG_TARGET: &str = "r_chatplay::audio::decoder";

/// Turns a media locator into a local path.
///
/// Accepts plain paths and `file://` URLs. Any other scheme is rejected
/// because this crate does no network transport.
pub fn resolve_locator(locator: &str) -> Result<PathBuf, AudioError> {
    if !locator.contains("://") {
        return Ok(PathBuf::from(locator));
    }
    let url = Url::parse(locator)?;
    if url.scheme() != "file" {
        return Err(AudioError::UnsupportedLocator(format!(
            "{} (scheme '{}' needs network transport)",
            locator,
            url.scheme()
        )));
    }
    url.to_file_path()
        .map_err(|()| AudioError::UnsupportedLocator(locator.to_string()))
}

/// Symphonia format reader and decoder for one local track.
pub struct SymphoniaDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: TimeBase,
    duration_seconds: f64,
    /// Packets ending at or before this timestamp are decoded and dropped.
    skip_until_ts: u64,
}

impl SymphoniaDecoder {
    /// Opens and probes the track behind `locator`.
    pub fn open(locator: &str) -> Result<Self, AudioError> {
        let path = resolve_locator(locator)?;
        debug!(target: LOG_TARGET, "Opening media file {}", path.display());
        let file = File::open(&path)?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();
        let probed = symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(AudioError::UnsupportedFormat("No suitable audio track found".to_string()))?
            .clone();
        debug!(target: LOG_TARGET, "Found audio track: ID={}, Codec={:?}", track.id, track.codec_params.codec);

        let time_base = match (track.codec_params.time_base, track.codec_params.sample_rate) {
            (Some(time_base), _) => time_base,
            (None, Some(rate)) => TimeBase::new(1, rate),
            (None, None) => return Err(AudioError::MissingCodecParams("time base")),
        };
        let n_frames = track
            .codec_params
            .n_frames
            .ok_or(AudioError::MissingCodecParams("frame count"))?;
        let duration_seconds = seconds_of(time_base, n_frames);

        let decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            time_base,
            duration_seconds,
            skip_until_ts: 0,
        })
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Decodes the next packet of the track and returns the position at its
    /// end, or `None` at end of stream. Corrupt packets are skipped, as are
    /// packets that end before the last accurate seek target.
    pub fn next_packet_end(&mut self) -> Result<Option<f64>, AudioError> {
        loop {
            let packet = match self.format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref io_err)) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!(target: LOG_TARGET, "End of stream reached.");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != self.track_id {
                trace!(target: LOG_TARGET, "Skipping packet for track {}", packet.track_id());
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(_) => {
                    let end_ts = packet.ts() + packet.dur();
                    if end_ts < self.skip_until_ts {
                        trace!(target: LOG_TARGET, "Dropping packet ending at {} before seek target {}", end_ts, self.skip_until_ts);
                        continue;
                    }
                    let end = seconds_of(self.time_base, end_ts);
                    return Ok(Some(end.min(self.duration_seconds)));
                }
                Err(SymphoniaError::DecodeError(err)) => {
                    warn!(target: LOG_TARGET, "Symphonia decode error (skipping packet): {}", err);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Seeks to `seconds` and returns the requested position. The reader
    /// lands on the packet containing it; frames before it are skipped.
    pub fn seek(&mut self, seconds: f64) -> Result<f64, AudioError> {
        let seeked = self.format_reader.seek(
            SeekMode::Accurate,
            SeekTo::Time {
                time: Time::from(seconds),
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        self.skip_until_ts = seeked.required_ts;
        let reached = seconds_of(self.time_base, seeked.required_ts).min(self.duration_seconds);
        debug!(
            target: LOG_TARGET,
            "Seeked to {:.3}s (packet starts at {:.3}s)",
            reached,
            seconds_of(self.time_base, seeked.actual_ts)
        );
        Ok(reached)
    }
}

fn seconds_of(time_base: TimeBase, ts: u64) -> f64 {
    let time = time_base.calc_time(ts);
    time.seconds as f64 + time.frac
}
