//! # Конвейер обработки
//!
//! Центральный модуль, координирующий полный цикл: декодирование входных
//! байтов, разбиение по тишине, посегментную транскрибацию, условный перевод
//! и синтез, склейку в исходном порядке, нормализацию громкости и
//! кодирование итогового трека.
//!
//! Один вызов `process` — один файл, обрабатываемый синхронно до конца.
//! Посегментные сбои внешних сервисов не прерывают запуск: такой сегмент
//! попадает в выход с оригинальным аудио, поэтому каждый сегмент входа даёт
//! ровно один вклад в выходной трек. Фатальны только ошибка декодирования
//! входа и ошибка кодирования результата.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::Sender;

use crate::audio::{format, processing, segmenter, AudioClip, Segment};
use crate::config::{OutputFormat, RevoiceConfig};
use crate::error::Result;
use crate::progress::{send_progress, ProgressUpdate};
use crate::services::{
    ConditionalTranslator, HttpSynthesizer, HttpTranscriber, HttpTranslator, SpeechSynthesizer,
    Transcriber, TranslationDecision, Translator,
};

/// Оркестратор конвейера.
///
/// Клиенты внешних сервисов создаются один раз при конструировании и
/// разделяются между всеми сегментами; сам оркестратор не хранит состояния
/// между вызовами `process`.
pub struct Pipeline {
    config: RevoiceConfig,
    transcriber: Arc<dyn Transcriber>,
    translator: ConditionalTranslator,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    progress_sender: Option<Sender<ProgressUpdate>>,
}

impl Pipeline {
    /// Создать конвейер с HTTP-клиентами внешних сервисов
    pub fn new(config: RevoiceConfig) -> Result<Self> {
        let transcriber = Arc::new(HttpTranscriber::new(
            &config.services,
            config.transcription.clone(),
        )?);
        let translator_client = Arc::new(HttpTranslator::new(
            &config.services,
            &config.source_language,
            &config.target_language,
        )?);
        let synthesizer = Arc::new(HttpSynthesizer::new(
            &config.services,
            config.voice.clone(),
            config.analysis_sample_rate,
            config.synthesis_pad_ms,
        )?);

        Ok(Self::with_services(
            config,
            transcriber,
            translator_client,
            synthesizer,
        ))
    }

    /// Создать конвейер с готовыми реализациями сервисов.
    ///
    /// Используется тестами с фиктивными сервисами и встраивающими
    /// приложениями с собственными клиентами.
    pub fn with_services(
        config: RevoiceConfig,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let translator = ConditionalTranslator::new(
            translator,
            config.source_language.clone(),
            config.transcription.language_confidence_floor,
        );

        Self {
            config,
            transcriber,
            translator,
            synthesizer,
            progress_sender: None,
        }
    }

    /// Установить отправителя обновлений прогресса
    pub fn set_progress_sender(&mut self, sender: Sender<ProgressUpdate>) {
        self.progress_sender = Some(sender);
    }

    /// Обработать один аудиофайл: байты входа — байты выхода.
    ///
    /// Английские сегменты переводятся на русский и озвучиваются заново,
    /// остальные проходят без изменений; итоговый трек нормализуется и
    /// кодируется в сконфигурированный формат.
    pub async fn process(&self, input: &[u8]) -> Result<Vec<u8>> {
        send_progress(&self.progress_sender, ProgressUpdate::Started).await;
        info!("Начало обработки: {} байт на входе", input.len());

        // Шаг 1: декодирование и приведение к частоте анализа
        let decoded = format::decode_bytes(input)?;
        let source = processing::resample(decoded, self.config.analysis_sample_rate)?;

        // Шаг 2: разбиение по тишине
        send_progress(&self.progress_sender, ProgressUpdate::Segmenting).await;
        let segments = segmenter::split_on_silence(&source, &self.config.segmentation);

        let track = if segments.is_empty() {
            // Нечего обрабатывать: сервисы не вызываются, выход минимален
            info!("Сегменты отсутствуют, возвращается тихий трек");
            AudioClip::silence(self.config.synthesis_pad_ms, self.config.analysis_sample_rate)
        } else {
            // Шаг 3: посегментная обработка в исходном порядке
            let total = segments.len();
            let mut track =
                AudioClip::new(Vec::new(), self.config.analysis_sample_rate);
            for segment in segments {
                let contribution = self.process_segment(segment, total).await;
                track.append(&contribution);
            }
            track
        };

        send_progress(&self.progress_sender, ProgressUpdate::Merging).await;
        info!("Итоговый трек: {:.2} с", track.duration_seconds());

        // Шаг 4: нормализация громкости всего трека
        send_progress(&self.progress_sender, ProgressUpdate::Normalizing).await;
        let normalized = AudioClip::new(
            processing::normalize_peak(&track.samples, self.config.target_peak_level),
            track.sample_rate,
        );

        // Шаг 5: кодирование результата
        send_progress(&self.progress_sender, ProgressUpdate::Encoding).await;
        let output = match self.config.output_format {
            OutputFormat::Mp3 => format::encode_mp3(&normalized).await?,
            OutputFormat::Wav => format::encode_wav_bytes(&normalized)?,
        };

        send_progress(&self.progress_sender, ProgressUpdate::Finished).await;
        info!("Обработка завершена: {} байт на выходе", output.len());
        Ok(output)
    }

    /// Обработать один сегмент: транскрибация, решение о переводе, синтез.
    ///
    /// Любой посегментный сбой внешнего сервиса деградирует к оригинальному
    /// аудио сегмента, чтобы один плохой сегмент не портил весь трек.
    async fn process_segment(&self, segment: Segment, total: usize) -> AudioClip {
        let ordinal = segment.index + 1;
        send_progress(
            &self.progress_sender,
            ProgressUpdate::Transcribing {
                current: ordinal,
                total,
            },
        )
        .await;

        let transcription = match self.transcriber.transcribe(&segment.clip).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "Транскрибация сегмента {}/{} не удалась, сегмент без изменений: {}",
                    ordinal, total, e
                );
                return segment.clip;
            }
        };

        debug!(
            "Сегмент {}/{}: язык '{}', текст '{}'",
            ordinal, total, transcription.language_code, transcription.text
        );

        let decision = match self.translator.decide(&transcription).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(
                    "Перевод сегмента {}/{} не удался, сегмент без изменений: {}",
                    ordinal, total, e
                );
                return segment.clip;
            }
        };

        match decision {
            TranslationDecision::PassThrough => segment.clip,
            TranslationDecision::Translated(text) => {
                send_progress(
                    &self.progress_sender,
                    ProgressUpdate::Synthesizing {
                        current: ordinal,
                        total,
                    },
                )
                .await;

                match self.synthesizer.synthesize(&text).await {
                    Ok(synthesized) => synthesized,
                    Err(e) => {
                        warn!(
                            "Синтез сегмента {}/{} не удался, сегмент без изменений: {}",
                            ordinal, total, e
                        );
                        segment.clip
                    }
                }
            }
        }
    }
}
