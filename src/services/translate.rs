//! Условный переводчик.
//!
//! Решает, нужен ли сегменту перевод, и при необходимости вызывает внешний
//! сервис перевода. Сегменты не на исходном языке проходят без изменений,
//! как и сегменты с низкой уверенностью определения языка и сегменты,
//! попавшие под текстовый фильтр ложных срабатываний распознавателя.

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::services::{TranscriptionResult, TranslationDecision, Translator};

lazy_static! {
    // Известный артефакт распознавателя: текст с этой подстрокой помечается
    // английским ошибочно. Фильтр текстовый и применяется дословно.
    static ref FALSE_POSITIVE_RE: Regex = Regex::new(r"(?i)senh").unwrap();
}

/// Запрос к сервису перевода
#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    source_language: &'a str,
    target_language: &'a str,
    text: &'a str,
}

/// Ответ сервиса перевода
#[derive(Debug, Deserialize)]
struct TranslationResponse {
    translated_text: String,
}

/// HTTP-клиент сервиса перевода
pub struct HttpTranslator {
    client: Client,
    url: String,
    api_key: String,
    source_language: String,
    target_language: String,
}

impl HttpTranslator {
    pub fn new(
        services: &ServiceConfig,
        source_language: &str,
        target_language: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(services.request_timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            url: services.translation_url.clone(),
            api_key: services.api_key.clone(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let request = TranslationRequest {
            source_language: &self.source_language,
            target_language: &self.target_language,
            text,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Translation(format!("сервис недоступен: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!(
                "сервис вернул статус {}: {}",
                status, body
            )));
        }

        let payload: TranslationResponse = response
            .json()
            .await
            .map_err(|e| Error::Translation(format!("неразборчивый ответ сервиса: {}", e)))?;

        if payload.translated_text.trim().is_empty() {
            return Err(Error::Translation("сервис вернул пустой перевод".to_string()));
        }

        Ok(payload.translated_text)
    }
}

/// Условный переводчик: решение о переводе сегмента.
///
/// Решение детерминировано по результату транскрибации; сам перевод
/// выполняется разделяемым клиентом сервиса.
pub struct ConditionalTranslator {
    translator: Arc<dyn Translator>,
    source_language: String,
    confidence_floor: f32,
}

impl ConditionalTranslator {
    pub fn new(
        translator: Arc<dyn Translator>,
        source_language: String,
        confidence_floor: f32,
    ) -> Self {
        Self {
            translator,
            source_language,
            confidence_floor,
        }
    }

    /// Нужен ли сегменту перевод. Чистая функция от результата
    /// транскрибации, сервис перевода не вызывается.
    pub fn requires_translation(&self, result: &TranscriptionResult) -> bool {
        if result.language_code != self.source_language {
            return false;
        }

        if FALSE_POSITIVE_RE.is_match(&result.text) {
            info!(
                "Текст попал под фильтр ложных срабатываний, сегмент без перевода: '{}'",
                result.text
            );
            return false;
        }

        if let Some(confidence) = result.language_confidence {
            if confidence < self.confidence_floor {
                warn!(
                    "Низкая уверенность определения языка ({:.2} < {:.2}), сегмент без перевода",
                    confidence, self.confidence_floor
                );
                return false;
            }
        }

        true
    }

    /// Принять решение по сегменту, при необходимости выполнив перевод
    pub async fn decide(&self, result: &TranscriptionResult) -> Result<TranslationDecision> {
        if !self.requires_translation(result) {
            return Ok(TranslationDecision::PassThrough);
        }

        let translated = self.translator.translate(&result.text).await?;
        Ok(TranslationDecision::Translated(translated))
    }
}
