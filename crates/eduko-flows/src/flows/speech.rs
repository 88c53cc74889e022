//! Text-to-speech: wraps the model's raw PCM in a WAV container and returns
//! it as a `data:audio/wav;base64,` URI.

use std::io::Cursor;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::generator::Generator;

use super::check_nonempty;

/// The TTS model emits 16-bit mono PCM at 24 kHz.
const SAMPLE_RATE: u32 = 24_000;

/// Prebuilt voices offered by the TTS model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voice {
    #[default]
    Algenib,
    Arcturus,
    Canopus,
    Antares,
    Altair,
    Achernar,
    Spica,
    Sirius,
}

impl Voice {
    /// Voice name as the generation API expects it.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Algenib => "Algenib",
            Self::Arcturus => "Arcturus",
            Self::Canopus => "Canopus",
            Self::Antares => "Antares",
            Self::Altair => "Altair",
            Self::Achernar => "Achernar",
            Self::Spica => "Spica",
            Self::Sirius => "Sirius",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechInput {
    /// The text to be converted to speech.
    pub text: String,
    /// Prebuilt voice to use; defaults to Algenib.
    #[serde(default)]
    pub voice: Voice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechOutput {
    /// `data:audio/wav;base64,...`
    pub audio_data_uri: String,
}

impl SpeechInput {
    fn validate(&self) -> Result<(), FlowError> {
        let mut details = Vec::new();
        check_nonempty(&mut details, "text", &self.text);
        FlowError::validation(details)
    }
}

/// Wrap raw 16-bit little-endian PCM in a WAV container.
fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, FlowError> {
    if pcm.len() % 2 != 0 {
        return Err(FlowError::InvalidResponse(
            "audio payload has an odd byte length, expected 16-bit samples".to_string(),
        ));
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| FlowError::InvalidResponse(format!("WAV encoding failed: {e}")))?;
        for sample in pcm.chunks_exact(2) {
            let value = i16::from_le_bytes([sample[0], sample[1]]);
            writer
                .write_sample(value)
                .map_err(|e| FlowError::InvalidResponse(format!("WAV encoding failed: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| FlowError::InvalidResponse(format!("WAV encoding failed: {e}")))?;
    }
    Ok(cursor.into_inner())
}

/// Run the speech synthesis flow.
pub async fn run(generator: &dyn Generator, input: SpeechInput) -> Result<SpeechOutput, FlowError> {
    input.validate()?;
    let pcm = generator
        .generate_speech(&input.text, input.voice.as_str())
        .await?;
    if pcm.is_empty() {
        return Err(FlowError::InvalidResponse(
            "no audio media was returned from the model".to_string(),
        ));
    }

    let wav = pcm_to_wav(&pcm)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&wav);
    Ok(SpeechOutput {
        audio_data_uri: format!("data:audio/wav;base64,{encoded}"),
    })
}
