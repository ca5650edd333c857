//! Модуль конфигурации библиотеки revoice
//!
//! Все пороги и параметры конвейера собраны здесь как значения по умолчанию,
//! которые встраивающее приложение может переопределить. Конфигурация
//! читается один раз при старте процесса и передаётся клиентам сервисов;
//! она никогда не перечитывается в середине запроса.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Переменная окружения с API-ключом речевых сервисов
pub const API_KEY_ENV: &str = "REVOICE_API_KEY";

/// Формат итогового трека
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    /// MP3 (кодируется внешним ffmpeg)
    Mp3,
    /// Несжатый WAV
    Wav,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Mp3
    }
}

impl OutputFormat {
    /// MIME-тип формата
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mp3",
            Self::Wav => "audio/wav",
        }
    }
}

/// Параметры разбиения по тишине
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Минимальная длительность тишины, считающейся точкой разреза, мс
    pub min_silence_ms: u32,
    /// Порог тишины в дБ относительно полной шкалы
    pub silence_threshold_db: f32,
    /// Сколько тишины оставлять на границах сегмента, мс
    pub keep_silence_ms: u32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 500,
            silence_threshold_db: -40.0,
            keep_silence_ms: 1200,
        }
    }
}

/// Параметры запроса к сервису транскрибации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Восстанавливать пунктуацию
    pub punctuate: bool,
    /// Форматировать текст
    pub format_text: bool,
    /// Автоматически определять язык
    pub language_detection: bool,
    /// Порог уверенности определения языка; ниже — сегмент не переводится
    pub language_confidence_floor: f32,
    /// Уровень качества модели распознавания
    pub speech_model: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            punctuate: true,
            format_text: true,
            language_detection: true,
            language_confidence_floor: 0.8,
            speech_model: "best".to_string(),
        }
    }
}

/// Конфигурация голоса для синтеза речи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Идентификатор голосовой модели
    pub model: String,
    /// Идентификатор диктора внутри модели
    pub speaker_id: u32,
    /// Скорость речи (1.0 — номинальная)
    pub speech_rate: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            model: "vosk-model-tts-ru-0.7-multi".to_string(),
            speaker_id: 4,
            speech_rate: 0.9,
        }
    }
}

/// Адреса и учётные данные внешних речевых сервисов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API-ключ, общий для всех сервисов
    pub api_key: String,
    /// Адрес сервиса транскрибации
    pub transcription_url: String,
    /// Адрес сервиса перевода
    pub translation_url: String,
    /// Адрес сервиса синтеза речи
    pub synthesis_url: String,
    /// Таймаут одного запроса, секунды
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            transcription_url: "http://127.0.0.1:7860/v1/transcribe".to_string(),
            translation_url: "http://127.0.0.1:7860/v1/translate".to_string(),
            synthesis_url: "http://127.0.0.1:7860/v1/synthesize".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Конфигурация библиотеки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevoiceConfig {
    /// Внешние сервисы
    pub services: ServiceConfig,
    /// Разбиение по тишине
    pub segmentation: SegmentationConfig,
    /// Транскрибация
    pub transcription: TranscriptionConfig,
    /// Голос синтеза
    pub voice: VoiceConfig,
    /// Частота дискретизации, к которой приводится весь конвейер, Гц
    pub analysis_sample_rate: u32,
    /// Длительность паузы после синтезированного сегмента, мс
    pub synthesis_pad_ms: u32,
    /// Целевой пиковый уровень итогового трека (0.0 - 1.0)
    pub target_peak_level: f32,
    /// Язык, подлежащий переводу
    pub source_language: String,
    /// Язык синтезируемой речи
    pub target_language: String,
    /// Формат итогового трека
    pub output_format: OutputFormat,
}

impl Default for RevoiceConfig {
    fn default() -> Self {
        Self {
            services: ServiceConfig::default(),
            segmentation: SegmentationConfig::default(),
            transcription: TranscriptionConfig::default(),
            voice: VoiceConfig::default(),
            analysis_sample_rate: 16_000,
            synthesis_pad_ms: 650,
            target_peak_level: 0.99,
            source_language: "en".to_string(),
            target_language: "ru".to_string(),
            output_format: OutputFormat::default(),
        }
    }
}

impl RevoiceConfig {
    /// Создать конфигурацию, прочитав учётные данные из окружения.
    ///
    /// Читает `REVOICE_API_KEY` (обязательно) и, если заданы,
    /// `REVOICE_TRANSCRIPTION_URL`, `REVOICE_TRANSLATION_URL`,
    /// `REVOICE_SYNTHESIS_URL`. Вызывается один раз при старте процесса.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            Error::Configuration(format!("{} is not set", API_KEY_ENV))
        })?;

        let mut config = Self::default();
        config.services.api_key = api_key;

        if let Ok(url) = std::env::var("REVOICE_TRANSCRIPTION_URL") {
            config.services.transcription_url = url;
        }
        if let Ok(url) = std::env::var("REVOICE_TRANSLATION_URL") {
            config.services.translation_url = url;
        }
        if let Ok(url) = std::env::var("REVOICE_SYNTHESIS_URL") {
            config.services.synthesis_url = url;
        }

        Ok(config)
    }

    /// Создать конфигурацию с указанным API-ключом и остальными значениями
    /// по умолчанию
    pub fn with_api_key(api_key: &str) -> Self {
        let mut config = Self::default();
        config.services.api_key = api_key.to_string();
        config
    }
}
