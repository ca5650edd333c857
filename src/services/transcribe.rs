//! HTTP-клиент сервиса транскрибации.
//!
//! Сегмент кодируется в одноканальный WAV и отправляется multipart-формой
//! вместе с параметрами распознавания. Сервис возвращает JSON с текстом,
//! кодом языка и уверенностью его определения.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::audio::{format, AudioClip};
use crate::config::{ServiceConfig, TranscriptionConfig};
use crate::error::{Error, Result};
use crate::services::{Transcriber, TranscriptionResult};

/// Ответ сервиса транскрибации
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    language_code: String,
    language_confidence: Option<f32>,
}

/// Клиент сервиса транскрибации.
///
/// Создаётся один раз и переиспользуется для всех сегментов: HTTP-клиент с
/// пулом соединений разделяется между запросами.
pub struct HttpTranscriber {
    client: Client,
    url: String,
    api_key: String,
    config: TranscriptionConfig,
}

impl HttpTranscriber {
    pub fn new(services: &ServiceConfig, config: TranscriptionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(services.request_timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            url: services.transcription_url.clone(),
            api_key: services.api_key.clone(),
            config,
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, segment: &AudioClip) -> Result<TranscriptionResult> {
        let wav_bytes = format::encode_wav_bytes(segment)
            .map_err(|e| Error::Transcription(format!("не удалось закодировать сегмент: {}", e)))?;

        debug!(
            "Отправка сегмента на транскрибацию: {} байт WAV, {:.2} с",
            wav_bytes.len(),
            segment.duration_seconds()
        );

        let file_part = Part::bytes(wav_bytes)
            .file_name("segment.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Transcription(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part)
            .text("punctuate", self.config.punctuate.to_string())
            .text("format_text", self.config.format_text.to_string())
            .text("language_detection", self.config.language_detection.to_string())
            .text(
                "language_confidence_threshold",
                self.config.language_confidence_floor.to_string(),
            )
            .text("speech_model", self.config.speech_model.clone());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("сервис недоступен: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "сервис вернул статус {}: {}",
                status, body
            )));
        }

        let payload: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("неразборчивый ответ сервиса: {}", e)))?;

        if payload.text.trim().is_empty() {
            return Err(Error::Transcription(
                "сервис не вернул пригодный текст".to_string(),
            ));
        }

        info!(
            "Сегмент транскрибирован: язык '{}', уверенность {:?}",
            payload.language_code, payload.language_confidence
        );

        Ok(TranscriptionResult {
            text: payload.text,
            language_code: payload.language_code,
            language_confidence: payload.language_confidence,
        })
    }
}
