/// Container formats accepted by Whisper-style transcription APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Ogg,
    Webm,
    Mp4,
    Flac,
}

impl AudioFormat {
    /// Sniffs the container from magic bytes, defaulting to WAV.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            [b'R', b'I', b'F', b'F', ..] => AudioFormat::Wav,
            [b'O', b'g', b'g', b'S', ..] => AudioFormat::Ogg,
            [b'f', b'L', b'a', b'C', ..] => AudioFormat::Flac,
            [0x1A, 0x45, 0xDF, 0xA3, ..] => AudioFormat::Webm,
            [b'I', b'D', b'3', ..] | [0xFF, 0xE0..=0xFF, ..] => AudioFormat::Mp3,
            [_, _, _, _, b'f', b't', b'y', b'p', ..] => AudioFormat::Mp4,
            _ => AudioFormat::Wav,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio.wav",
            AudioFormat::Mp3 => "audio.mp3",
            AudioFormat::Ogg => "audio.ogg",
            AudioFormat::Webm => "audio.webm",
            AudioFormat::Mp4 => "audio.m4a",
            AudioFormat::Flac => "audio.flac",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Flac => "audio/flac",
        }
    }
}
