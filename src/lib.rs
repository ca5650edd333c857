//! # revoice
//!
//! Библиотека переозвучивания аудиозаписей: английская речь во входном файле
//! переводится на русский и синтезируется заново, остальные фрагменты
//! проходят без изменений. Вход — байты аудиофайла любого распространённого
//! формата, выход — один нормализованный трек.
//!
//! Распознавание, перевод и синтез выполняются внешними сервисами; сама
//! библиотека отвечает за разбиение по тишине, порядок сегментов, деградацию
//! при посегментных сбоях и сборку итогового трека.
//!
//! ```no_run
//! use revoice::{RevoiceConfig, Revoice};
//!
//! # async fn example() -> revoice::Result<()> {
//! let config = RevoiceConfig::from_env()?;
//! let revoice = Revoice::new(config)?;
//!
//! let input = tokio::fs::read("recording.mp3").await?;
//! let output = revoice.process(&input).await?;
//! tokio::fs::write("rus_recording.mp3", output).await?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod services;

use tokio::sync::mpsc::Sender;

pub use audio::{AudioClip, Segment};
pub use config::{OutputFormat, RevoiceConfig};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use progress::ProgressUpdate;
pub use services::{
    SpeechSynthesizer, Transcriber, TranscriptionResult, TranslationDecision, Translator,
};

/// Основная структура для работы с библиотекой
pub struct Revoice {
    pipeline: Pipeline,
}

impl Revoice {
    /// Создать экземпляр с указанной конфигурацией.
    ///
    /// Клиенты внешних сервисов создаются здесь один раз и переиспользуются
    /// всеми последующими вызовами `process`.
    pub fn new(config: RevoiceConfig) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(config)?,
        })
    }

    /// Создать экземпляр с отправителем обновлений прогресса
    pub fn with_progress_sender(
        config: RevoiceConfig,
        sender: Sender<ProgressUpdate>,
    ) -> Result<Self> {
        let mut pipeline = Pipeline::new(config)?;
        pipeline.set_progress_sender(sender);
        Ok(Self { pipeline })
    }

    /// Обработать один аудиофайл: байты входа — байты выхода
    pub async fn process(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.pipeline.process(input).await
    }
}

/// Публичный API для удобного использования: обработка с конфигурацией по
/// умолчанию и указанным API-ключом
pub async fn translate_audio(input: &[u8], api_key: &str) -> Result<Vec<u8>> {
    let config = RevoiceConfig::with_api_key(api_key);
    let revoice = Revoice::new(config)?;
    revoice.process(input).await
}

/// Публичный API с поддержкой отслеживания прогресса
pub async fn translate_audio_with_progress(
    input: &[u8],
    api_key: &str,
    sender: Sender<ProgressUpdate>,
) -> Result<Vec<u8>> {
    let config = RevoiceConfig::with_api_key(api_key);
    let revoice = Revoice::with_progress_sender(config, sender)?;
    revoice.process(input).await
}
