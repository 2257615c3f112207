//! Microphone capture session
//!
//! A `CaptureSession` owns the whole audio graph (stream, context, source
//! and analyser). `close` consumes it, so a released session cannot be
//! sampled again.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, MediaStream, MediaStreamAudioSourceNode, MediaStreamConstraints,
    MediaStreamTrack,
};

use crate::error::{describe_js, UiError};

/// Frequency-domain view of a live input
pub trait Analyser {
    /// Current byte magnitudes, one per bin (`fft_size / 2` bins)
    fn sample(&mut self) -> &[u8];
    fn sample_rate(&self) -> f64;
    /// Release the input device
    fn close(self);
}

/// Something that can open an `Analyser`, e.g. the microphone
#[allow(async_fn_in_trait)]
pub trait AudioSource {
    type Session: Analyser + 'static;

    async fn open(&self) -> Result<Self::Session, UiError>;
}

pub struct CaptureSession {
    stream: MediaStream,
    context: AudioContext,
    source: MediaStreamAudioSourceNode,
    analyser: AnalyserNode,
    buffer: Vec<u8>,
}

impl CaptureSession {
    /// Ask for microphone access and build source -> analyser
    pub async fn open(fft_size: u32) -> Result<Self, UiError> {
        let win = web_sys::window().ok_or(UiError::NoWindow)?;
        let devices = win
            .navigator()
            .media_devices()
            .map_err(|e| UiError::media(&e))?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_audio(&JsValue::TRUE);
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(|e| UiError::media(&e))?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(|e| UiError::media(&e))?
            .dyn_into()
            .map_err(|_| UiError::Media("getUserMedia did not return a MediaStream".into()))?;

        match Self::build_graph(&stream, fft_size) {
            Ok((context, source, analyser)) => {
                let bins = analyser.frequency_bin_count() as usize;
                tracing::info!(
                    fft_size,
                    bins,
                    sample_rate = context.sample_rate(),
                    "Audio capture opened"
                );
                Ok(Self {
                    stream,
                    context,
                    source,
                    analyser,
                    buffer: vec![0; bins],
                })
            }
            Err(e) => {
                stop_tracks(&stream);
                Err(e)
            }
        }
    }

    fn build_graph(
        stream: &MediaStream,
        fft_size: u32,
    ) -> Result<(AudioContext, MediaStreamAudioSourceNode, AnalyserNode), UiError> {
        let context = AudioContext::new()?;
        let source = context.create_media_stream_source(stream)?;
        let analyser = context.create_analyser()?;
        analyser.set_fft_size(fft_size);
        source.connect_with_audio_node(&analyser)?;
        Ok((context, source, analyser))
    }
}

impl Analyser for CaptureSession {
    fn sample(&mut self) -> &[u8] {
        self.analyser.get_byte_frequency_data(&mut self.buffer);
        &self.buffer
    }

    fn sample_rate(&self) -> f64 {
        f64::from(self.context.sample_rate())
    }

    fn close(self) {
        if let Err(e) = self.source.disconnect() {
            tracing::warn!(error = %describe_js(&e), "Source disconnect failed");
        }
        // The returned promise only reports completion
        if let Err(e) = self.context.close() {
            tracing::warn!(error = %describe_js(&e), "AudioContext close failed");
        }
        stop_tracks(&self.stream);
        tracing::info!("Audio capture closed");
    }
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

/// The default input device
#[derive(Debug, Clone, Copy)]
pub struct Microphone {
    pub fft_size: u32,
}

impl AudioSource for Microphone {
    type Session = CaptureSession;

    async fn open(&self) -> Result<CaptureSession, UiError> {
        CaptureSession::open(self.fft_size).await
    }
}
