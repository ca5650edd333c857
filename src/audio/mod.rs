//! # Аудио
//!
//! Модули для работы с аудиоданными: декодирование и кодирование форматов,
//! обработка PCM (нормализация, ресемплинг) и разбиение по тишине.

pub mod format;
pub mod processing;
pub mod segmenter;

/// Декодированный моно PCM-поток.
///
/// Семплы f32 в диапазоне [-1.0, 1.0]. Владение клипом передаётся между
/// этапами конвейера; клип никогда не разделяется между этапами изменяемо.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Семплы PCM (f32)
    pub samples: Vec<f32>,
    /// Частота дискретизации, Гц
    pub sample_rate: u32,
}

impl AudioClip {
    /// Создать клип из готовых семплов
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Создать клип тишины указанной длительности
    pub fn silence(duration_ms: u32, sample_rate: u32) -> Self {
        let sample_count = (duration_ms as u64 * sample_rate as u64 / 1000) as usize;
        Self {
            samples: vec![0.0; sample_count],
            sample_rate,
        }
    }

    /// Длительность клипа в секундах
    pub fn duration_seconds(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Пиковая амплитуда клипа
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |a, &b| a.max(b.abs()))
    }

    /// Клип без семплов
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Дописать другой клип в конец этого.
    ///
    /// Частоты дискретизации должны совпадать; за этим следит вызывающий
    /// (конвейер приводит все клипы к единой частоте анализа).
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.sample_rate, other.sample_rate);
        self.samples.extend_from_slice(&other.samples);
    }
}

/// Один ограниченный тишиной фрагмент исходного трека.
///
/// `index` — позиция фрагмента во временном порядке источника; порядок
/// сохраняется до самого выходного трека.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Позиция сегмента в исходном порядке
    pub index: usize,
    /// Аудио сегмента
    pub clip: AudioClip,
}
