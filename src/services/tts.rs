//! HTTP-клиент сервиса синтеза речи.
//!
//! Текст озвучивается фиксированной голосовой моделью и фиксированным
//! диктором с замедленной скоростью речи: машинный перевод разборчивее на
//! 0.9 от номинального темпа. Сервис возвращает WAV; клиент приводит его к
//! частоте конвейера и дописывает паузу после речи.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::audio::{format, processing, AudioClip};
use crate::config::{ServiceConfig, VoiceConfig};
use crate::error::{Error, Result};
use crate::services::SpeechSynthesizer;

/// Запрос к сервису синтеза
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model: &'a str,
    speaker_id: u32,
    speech_rate: f32,
}

/// Дописывает к клипу хвостовую паузу фиксированной длительности.
///
/// Пауза создаёт между синтезированным сегментом и следующим аудио
/// промежуток, сопоставимый с естественной паузой речи.
pub fn with_trailing_pad(mut clip: AudioClip, pad_ms: u32) -> AudioClip {
    let pad = AudioClip::silence(pad_ms, clip.sample_rate);
    clip.append(&pad);
    clip
}

/// Клиент сервиса синтеза речи.
///
/// Как и остальные клиенты, создаётся один раз и разделяется между всеми
/// сегментами запуска.
pub struct HttpSynthesizer {
    client: Client,
    url: String,
    api_key: String,
    voice: VoiceConfig,
    output_sample_rate: u32,
    pad_ms: u32,
}

impl HttpSynthesizer {
    pub fn new(
        services: &ServiceConfig,
        voice: VoiceConfig,
        output_sample_rate: u32,
        pad_ms: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(services.request_timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            url: services.synthesis_url.clone(),
            api_key: services.api_key.clone(),
            voice,
            output_sample_rate,
            pad_ms,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("пустой текст для озвучивания".to_string()));
        }

        let request = SynthesisRequest {
            text,
            model: &self.voice.model,
            speaker_id: self.voice.speaker_id,
            speech_rate: self.voice.speech_rate,
        };

        debug!(
            "Запрос синтеза: модель '{}', диктор {}, темп {}",
            self.voice.model, self.voice.speaker_id, self.voice.speech_rate
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("сервис недоступен: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "сервис вернул статус {}: {}",
                status, body
            )));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(format!("обрыв ответа сервиса: {}", e)))?;

        let clip = format::decode_wav_bytes(&audio_bytes)
            .map_err(|e| Error::Synthesis(format!("ответ сервиса не является WAV: {}", e)))?;

        let clip = processing::resample(clip, self.output_sample_rate)
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        info!(
            "Синтезировано {:.2} с речи для текста из {} символов",
            clip.duration_seconds(),
            text.chars().count()
        );

        Ok(with_trailing_pad(clip, self.pad_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_pad_length() {
        let clip = AudioClip::new(vec![0.5; 1600], 16_000);
        let padded = with_trailing_pad(clip, 650);

        // 1600 семплов речи + 650 мс тишины при 16 кГц
        assert_eq!(padded.samples.len(), 1600 + 10_400);
        assert!(padded.samples[1600..].iter().all(|&s| s == 0.0));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_network_call() {
        let synthesizer = HttpSynthesizer::new(
            &ServiceConfig::default(),
            VoiceConfig::default(),
            16_000,
            650,
        )
        .unwrap();

        let result = synthesizer.synthesize("   ").await;
        assert!(matches!(result, Err(Error::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_synthesis_error() {
        let services = ServiceConfig {
            synthesis_url: "http://127.0.0.1:1/v1/synthesize".to_string(),
            request_timeout_secs: 1,
            ..ServiceConfig::default()
        };
        let synthesizer =
            HttpSynthesizer::new(&services, VoiceConfig::default(), 16_000, 650).unwrap();

        let result = synthesizer.synthesize("привет").await;
        assert!(matches!(result, Err(Error::Synthesis(_))));
    }
}
