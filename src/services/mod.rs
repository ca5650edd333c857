//! # Внешние речевые сервисы
//!
//! Транскрибация, перевод и синтез речи — внешние возможности, вызываемые
//! через узкие контракты. Контракты описаны трейтами, чтобы конвейер можно
//! было тестировать с фиктивными реализациями; HTTP-реализации строятся один
//! раз при старте и безопасно разделяются между сегментами.

pub mod transcribe;
pub mod translate;
pub mod tts;

use async_trait::async_trait;

use crate::audio::AudioClip;
use crate::error::Result;

pub use transcribe::HttpTranscriber;
pub use translate::{ConditionalTranslator, HttpTranslator};
pub use tts::{with_trailing_pad, HttpSynthesizer};

/// Результат транскрибации одного сегмента.
///
/// Создаётся ровно один раз на сегмент и дальше не изменяется.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionResult {
    /// Распознанный текст
    pub text: String,
    /// Код определённого языка (например, "en")
    pub language_code: String,
    /// Уверенность определения языка, если сервис её сообщил
    pub language_confidence: Option<f32>,
}

/// Решение условного переводчика по одному сегменту
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationDecision {
    /// Сегмент остаётся с оригинальным аудио
    PassThrough,
    /// Сегмент озвучивается заново переведённым текстом
    Translated(String),
}

/// Сервис транскрибации: один сегмент на вход, один результат на выход
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Распознать речь в сегменте и определить её язык
    async fn transcribe(&self, segment: &AudioClip) -> Result<TranscriptionResult>;
}

/// Сервис перевода текста
#[async_trait]
pub trait Translator: Send + Sync {
    /// Перевести текст; возвращает перевод дословно, без постобработки
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Сервис синтеза речи
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Озвучить текст фиксированным голосом
    async fn synthesize(&self, text: &str) -> Result<AudioClip>;
}
