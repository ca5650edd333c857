//! # Обработка PCM
//!
//! Нормализация громкости и приведение частоты дискретизации. Ресемплинг
//! выполняется высококачественным Sinc-ресемплером Rubato, блоками, чтобы не
//! держать в памяти промежуточные буферы на весь трек.

use log::{debug, info, warn};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::audio::AudioClip;
use crate::error::{Error, Result};

/// Переводит уровень в дБ относительно полной шкалы в линейную амплитуду.
///
/// `-40 дБFS` соответствует амплитуде `0.01`.
pub fn amplitude_from_dbfs(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Нормализует пиковую амплитуду к целевому уровню.
///
/// Все семплы масштабируются так, чтобы максимум по модулю равнялся
/// `target_peak`. Операция идемпотентна: повторная нормализация уже
/// нормализованного трека не меняет амплитуду. Трек из одних нулей (тишина)
/// возвращается без изменений — масштабировать в нём нечего.
pub fn normalize_peak(samples: &[f32], target_peak: f32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let max_amplitude = samples.iter().fold(0.0f32, |a, &b| a.max(b.abs()));

    if max_amplitude <= 0.00001 {
        warn!(
            "Трек содержит только тишину (пик {:.6}), нормализация пропущена",
            max_amplitude
        );
        return samples.to_vec();
    }

    let norm_factor = target_peak / max_amplitude;
    debug!(
        "Нормализация пика: max_amplitude={:.6}, целевой уровень={:.6}, коэффициент={:.6}",
        max_amplitude, target_peak, norm_factor
    );

    samples.iter().map(|s| s * norm_factor).collect()
}

/// Приводит клип к целевой частоте дискретизации.
///
/// Обработка идёт блоками фиксированного размера; последний неполный блок
/// дополняется нулями, а выход обрезается до ожидаемой длины. При совпадении
/// частот клип возвращается как есть.
///
/// # Ошибки
///
/// `Error::AudioProcessing` при проблемах инициализации или работы
/// ресемплера.
pub fn resample(clip: AudioClip, target_rate: u32) -> Result<AudioClip> {
    if clip.sample_rate == target_rate || clip.is_empty() {
        let mut clip = clip;
        clip.sample_rate = target_rate;
        return Ok(clip);
    }

    let ratio = target_rate as f64 / clip.sample_rate as f64;
    let expected_len = (clip.samples.len() as f64 * ratio).round() as usize;
    let block_size = 1024;

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, block_size, 1)
        .map_err(|e| Error::AudioProcessing(format!("ошибка инициализации Rubato: {}", e)))?;

    let mut output = Vec::with_capacity(expected_len + block_size);

    for chunk in clip.samples.chunks(block_size) {
        // Последний неполный блок дополняем нулями до размера блока
        let frames = if chunk.len() < block_size {
            let mut padded = vec![0.0; block_size];
            padded[..chunk.len()].copy_from_slice(chunk);
            vec![padded]
        } else {
            vec![chunk.to_vec()]
        };

        let processed = resampler
            .process(&frames, None)
            .map_err(|e| Error::AudioProcessing(format!("ошибка ресемплинга: {}", e)))?;
        output.extend_from_slice(&processed[0]);
    }

    output.truncate(expected_len);

    info!(
        "Ресемплинг {} Гц -> {} Гц: {} -> {} семплов",
        clip.sample_rate,
        target_rate,
        clip.samples.len(),
        output.len()
    );

    Ok(AudioClip::new(output, target_rate))
}
