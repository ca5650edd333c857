//! # Форматы аудио
//!
//! Декодирование входных байтов в PCM и кодирование итогового трека.
//! Вход декодируется универсальным декодером Symphonia (формат контейнера
//! определяется автоматически), промежуточный формат — несжатый
//! одноканальный WAV через hound, итоговый MP3 кодируется внешним ffmpeg.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{info, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::Hint;

use crate::audio::AudioClip;
use crate::error::{Error, Result};

/// Декодирует закодированный аудиофайл в моно PCM.
///
/// Формат контейнера определяется автоматически (WAV, MP3, AAC, FLAC, OGG и
/// другие форматы, известные Symphonia). Многоканальное аудио сводится в
/// моно усреднением каналов.
///
/// # Аргументы
///
/// * `data` - Байты закодированного аудиофайла
///
/// # Ошибки
///
/// `Error::Decode`, если формат не распознан, в контейнере нет аудио-трека
/// или не декодировался ни один семпл. Ошибка фатальна для всего запуска.
pub fn decode_bytes(data: &[u8]) -> Result<AudioClip> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let format_opts = FormatOptions {
        enable_gapless: false,
        ..Default::default()
    };

    let probed = symphonia::default::get_probe()
        .format(&Hint::new(), mss, &format_opts, &Default::default())
        .map_err(|e| Error::Decode(format!("не удалось определить формат аудио: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("во входном файле не найден аудио-трек".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("не удалось создать декодер: {}", e)))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let channels = track.codec_params.channels.unwrap_or_default().count();

    let mut pcm_data = Vec::new();

    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut sample_buf =
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                sample_buf.copy_planar_ref(decoded);
                let samples = sample_buf.samples();

                // Сводим каналы в моно
                if channels > 1 {
                    let frames_per_channel = samples.len() / channels;
                    for frame in 0..frames_per_channel {
                        let mut sum = 0.0;
                        for ch in 0..channels {
                            sum += samples[ch * frames_per_channel + frame];
                        }
                        pcm_data.push(sum / channels as f32);
                    }
                } else {
                    pcm_data.extend_from_slice(samples);
                }
            }
            Err(e) => {
                // Битый пакет пропускаем и продолжаем
                warn!("Ошибка декодирования пакета: {}", e);
                continue;
            }
        }
    }

    if pcm_data.is_empty() {
        return Err(Error::Decode(
            "из входного файла не декодировано ни одного семпла".to_string(),
        ));
    }

    info!(
        "Декодировано {} семплов с частотой {} Гц ({} канал(ов) сведено в моно)",
        pcm_data.len(),
        sample_rate,
        channels
    );
    Ok(AudioClip::new(pcm_data, sample_rate))
}

/// Кодирует клип в одноканальный WAV (32 бит, с плавающей точкой) в памяти.
///
/// Это канонический промежуточный формат конвейера: в нём сегменты
/// отправляются сервису транскрибации и в нём же возвращается итоговый трек
/// при `OutputFormat::Wav`.
pub fn encode_wav_bytes(clip: &AudioClip) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &clip.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Декодирует WAV-байты в моно PCM.
///
/// Поддерживает целочисленные форматы 16/24/32 бит и 32-битный формат с
/// плавающей точкой; многоканальное аудио сводится в моно. Используется для
/// ответов сервиса синтеза речи.
pub fn decode_wav_bytes(data: &[u8]) -> Result<AudioClip> {
    let mut reader = WavReader::new(Cursor::new(data))?;
    let spec = reader.spec();
    let sample_rate = spec.sample_rate;

    let pcm_data: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0).map_err(Error::Wav))
            .collect::<Result<Vec<f32>>>()?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0).map_err(Error::Wav))
            .collect::<Result<Vec<f32>>>()?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0).map_err(Error::Wav))
            .collect::<Result<Vec<f32>>>()?,
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map_err(Error::Wav))
            .collect::<Result<Vec<f32>>>()?,
        _ => {
            return Err(Error::Decode(format!(
                "неподдерживаемый формат WAV: {:?}, {} бит",
                spec.sample_format, spec.bits_per_sample
            )));
        }
    };

    let channels = spec.channels as usize;
    if channels > 1 {
        let mut mono = Vec::with_capacity(pcm_data.len() / channels);
        for chunk in pcm_data.chunks(channels) {
            mono.push(chunk.iter().sum::<f32>() / channels as f32);
        }
        Ok(AudioClip::new(mono, sample_rate))
    } else {
        Ok(AudioClip::new(pcm_data, sample_rate))
    }
}

/// Кодирует клип в MP3 внешним ffmpeg.
///
/// PCM записывается во временный WAV, ffmpeg (ищется в PATH) кодирует его в
/// MP3, результат читается обратно в память. Временные файлы удаляются
/// вместе с временной директорией.
///
/// # Ошибки
///
/// `Error::Encode`, если ffmpeg отсутствует в PATH или завершился с ошибкой.
/// Ошибка фатальна для всего запуска.
pub async fn encode_mp3(clip: &AudioClip) -> Result<Vec<u8>> {
    let ffmpeg = which::which("ffmpeg")
        .map_err(|_| Error::Encode("ffmpeg не найден в PATH".to_string()))?;

    let temp_dir = tempfile::tempdir()?;
    let wav_path = temp_dir.path().join("track.wav");
    let mp3_path = temp_dir.path().join("track.mp3");

    let wav_bytes = encode_wav_bytes(clip)?;
    tokio::fs::write(&wav_path, &wav_bytes).await?;

    let output = tokio::process::Command::new(&ffmpeg)
        .args([
            "-y",
            "-i",
            wav_path.to_str().unwrap_or_default(),
            "-codec:a",
            "libmp3lame",
            "-qscale:a",
            "2",
            mp3_path.to_str().unwrap_or_default(),
        ])
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Encode(format!("ffmpeg завершился с ошибкой: {}", stderr)));
    }

    let mp3_bytes = tokio::fs::read(&mp3_path).await?;
    info!(
        "Закодирован MP3: {} байт из {} семплов ({} Гц)",
        mp3_bytes.len(),
        clip.samples.len(),
        clip.sample_rate
    );
    Ok(mp3_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_clip(freq: f32, duration: f32, sample_rate: u32) -> AudioClip {
        let num_samples = (sample_rate as f32 * duration) as usize;
        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.5
            })
            .collect();
        AudioClip::new(samples, sample_rate)
    }

    #[test]
    fn test_wav_roundtrip() {
        let clip = sine_clip(440.0, 0.1, 16_000);
        let bytes = encode_wav_bytes(&clip).unwrap();
        let decoded = decode_wav_bytes(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, clip.sample_rate);
        assert_eq!(decoded.samples.len(), clip.samples.len());
        for (a, b) in clip.samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 0.0001);
        }
    }

    #[test]
    fn test_decode_bytes_autodetects_wav() {
        let clip = sine_clip(440.0, 0.1, 16_000);
        let bytes = encode_wav_bytes(&clip).unwrap();
        let decoded = decode_bytes(&bytes).unwrap();

        assert_eq!(decoded.sample_rate, 16_000);
        // Symphonia может не отдать хвостовой пакет целиком, поэтому
        // сравниваем длительности с допуском
        assert!((decoded.duration_seconds() - clip.duration_seconds()).abs() < 0.01);
    }

    #[test]
    fn test_decode_bytes_rejects_garbage() {
        let garbage = vec![0u8; 64];
        assert!(matches!(decode_bytes(&garbage), Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_encode_mp3_when_ffmpeg_available() {
        if which::which("ffmpeg").is_err() {
            // Без ffmpeg в PATH проверить кодирование нечем
            return;
        }

        let clip = sine_clip(440.0, 0.2, 16_000);
        let mp3 = encode_mp3(&clip).await.unwrap();
        assert!(!mp3.is_empty());
    }

    #[tokio::test]
    async fn test_encode_mp3_without_ffmpeg_is_encode_error() {
        if which::which("ffmpeg").is_ok() {
            return;
        }

        let clip = sine_clip(440.0, 0.1, 16_000);
        assert!(matches!(encode_mp3(&clip).await, Err(Error::Encode(_))));
    }
}
