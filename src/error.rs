//! Модуль обработки ошибок библиотеки revoice
//!
//! Таксономия повторяет этапы конвейера: декодирование входа, транскрибация,
//! перевод, синтез речи и кодирование результата. Ошибка декодирования или
//! кодирования фатальна для всего запуска; посегментные ошибки обрабатываются
//! оркестратором (см. `pipeline`).

use thiserror::Error;

/// Ошибки библиотеки revoice
#[derive(Debug, Error)]
pub enum Error {
    /// Входной поток не удалось декодировать
    #[error("Decode error: {0}")]
    Decode(String),

    /// Сервис транскрибации недоступен или не вернул пригодный текст
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Сервис перевода недоступен или вернул пустой результат
    #[error("Translation error: {0}")]
    Translation(String),

    /// Сервис синтеза речи недоступен или входной текст пуст
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Не удалось закодировать итоговый трек
    #[error("Encode error: {0}")]
    Encode(String),

    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ошибка WAV-кодека
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Ошибка обработки PCM (ресемплинг, нормализация)
    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Другая ошибка
    #[error("Other error: {0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

/// Тип Result для библиотеки revoice
pub type Result<T> = std::result::Result<T, Error>;
