//! # Разбиение по тишине
//!
//! Делит моно PCM-поток на упорядоченные сегменты речи по паузам. Анализ
//! покадровый: кадр длиной 10 мс считается тихим, если его пиковая амплитуда
//! ниже порога. Достаточно длинные тихие участки становятся точками разреза,
//! при этом часть граничной тишины сохраняется, чтобы не обрезать начала и
//! концы слов.

use log::{debug, info};

use crate::audio::processing::amplitude_from_dbfs;
use crate::audio::{AudioClip, Segment};
use crate::config::SegmentationConfig;

/// Длительность кадра анализа, мс
const FRAME_MS: u32 = 10;

/// Разбивает клип на сегменты речи по паузам.
///
/// Возвращает сегменты в исходном временном порядке. Полностью тихий вход
/// даёт пустой список; вход без подходящих пауз — один сегмент на весь
/// речевой диапазон. Сегменты не пересекаются: при расширении в общий тихий
/// промежуток каждая сторона получает не больше его половины.
pub fn split_on_silence(clip: &AudioClip, config: &SegmentationConfig) -> Vec<Segment> {
    if clip.is_empty() {
        return Vec::new();
    }

    let threshold = amplitude_from_dbfs(config.silence_threshold_db);
    let min_silence_samples = ms_to_samples(config.min_silence_ms, clip.sample_rate);
    let keep_samples = ms_to_samples(config.keep_silence_ms, clip.sample_rate);
    let frame_len = ms_to_samples(FRAME_MS, clip.sample_rate).max(1);

    // Шаг 1: собираем непрерывные диапазоны речи по кадрам
    let mut speech_ranges: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<(usize, usize)> = None;

    for (i, frame) in clip.samples.chunks(frame_len).enumerate() {
        let start = i * frame_len;
        let end = start + frame.len();
        let peak = frame.iter().fold(0.0f32, |a, &b| a.max(b.abs()));

        if peak >= threshold {
            current = match current {
                Some((s, _)) => Some((s, end)),
                None => Some((start, end)),
            };
        } else if let Some(range) = current.take() {
            speech_ranges.push(range);
        }
    }
    if let Some(range) = current {
        speech_ranges.push(range);
    }

    if speech_ranges.is_empty() {
        info!("Вход полностью тихий, сегменты отсутствуют");
        return Vec::new();
    }

    // Шаг 2: паузы короче минимальной не являются точками разреза,
    // соседние диапазоны через такие паузы объединяются
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for range in speech_ranges {
        if let Some(last) = merged.last_mut() {
            if range.0 - last.1 < min_silence_samples {
                last.1 = range.1;
                continue;
            }
        }
        merged.push(range);
    }

    // Шаг 3: расширяем диапазоны сохраняемой граничной тишиной
    let total = clip.samples.len();
    let mut segments = Vec::with_capacity(merged.len());

    for (index, &(start, end)) in merged.iter().enumerate() {
        let available_before = if index == 0 {
            start
        } else {
            (start - merged[index - 1].1) / 2
        };
        let available_after = if index + 1 < merged.len() {
            (merged[index + 1].0 - end) / 2
        } else {
            total - end
        };

        let padded_start = start - keep_samples.min(available_before);
        let padded_end = end + keep_samples.min(available_after);

        debug!(
            "Сегмент {}: речь [{}, {}), с паузами [{}, {})",
            index, start, end, padded_start, padded_end
        );

        segments.push(Segment {
            index,
            clip: AudioClip::new(
                clip.samples[padded_start..padded_end].to_vec(),
                clip.sample_rate,
            ),
        });
    }

    info!(
        "Разбиение по тишине: {} сегмент(ов), порог {:.4}, мин. пауза {} мс",
        segments.len(),
        threshold,
        config.min_silence_ms
    );

    segments
}

fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    (ms as u64 * sample_rate as u64 / 1000) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16_000;

    fn tone(amplitude: f32, duration_ms: u32) -> Vec<f32> {
        let len = ms_to_samples(duration_ms, RATE);
        (0..len)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * amplitude
            })
            .collect()
    }

    fn silence(duration_ms: u32) -> Vec<f32> {
        vec![0.0; ms_to_samples(duration_ms, RATE)]
    }

    #[test]
    fn test_fully_silent_input_yields_no_segments() {
        let clip = AudioClip::new(silence(3000), RATE);
        let segments = split_on_silence(&clip, &SegmentationConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn test_two_bursts_split_in_order() {
        let mut samples = tone(0.5, 800);
        samples.extend(silence(1000));
        samples.extend(tone(0.25, 800));
        let clip = AudioClip::new(samples, RATE);

        let segments = split_on_silence(&clip, &SegmentationConfig::default());
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[1].index, 1);

        // Порядок сегментов различаем по амплитуде всплесков
        assert!((segments[0].clip.peak() - 0.5).abs() < 0.05);
        assert!((segments[1].clip.peak() - 0.25).abs() < 0.05);
    }

    #[test]
    fn test_short_gap_is_not_a_split_point() {
        let mut samples = tone(0.5, 800);
        samples.extend(silence(300));
        samples.extend(tone(0.5, 800));
        let clip = AudioClip::new(samples, RATE);

        let segments = split_on_silence(&clip, &SegmentationConfig::default());
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_boundary_silence_is_retained() {
        let mut samples = silence(2000);
        samples.extend(tone(0.5, 800));
        samples.extend(silence(2000));
        let clip = AudioClip::new(samples, RATE);

        let config = SegmentationConfig::default();
        let segments = split_on_silence(&clip, &config);
        assert_eq!(segments.len(), 1);

        // Всплеск 800 мс плюс до 1200 мс тишины с каждой стороны
        let duration_ms = segments[0].clip.duration_seconds() * 1000.0;
        assert!(
            (duration_ms - 3200.0).abs() < 50.0,
            "длительность сегмента: {} мс",
            duration_ms
        );
    }

    #[test]
    fn test_segments_do_not_overlap() {
        // Пауза 1000 мс меньше удвоенного keep_silence (1200 мс), поэтому
        // каждая сторона получает ровно половину паузы и семплы не дублируются
        let mut samples = tone(0.5, 800);
        samples.extend(silence(1000));
        samples.extend(tone(0.5, 800));
        let clip = AudioClip::new(samples, RATE);

        let segments = split_on_silence(&clip, &SegmentationConfig::default());
        assert_eq!(segments.len(), 2);

        let combined: usize = segments.iter().map(|s| s.clip.samples.len()).sum();
        assert_eq!(combined, clip.samples.len());
    }
}
