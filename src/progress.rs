//! Отслеживание прогресса обработки
//!
//! Конвейер проходит фиксированную последовательность состояний; каждое
//! переходное состояние публикуется через опциональный mpsc-канал, чтобы
//! встраивающее приложение могло показывать прогресс. Отправка best-effort:
//! закрытый канал не прерывает обработку.

use tokio::sync::mpsc::Sender;

/// Обновление прогресса для отправки клиенту
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// Началась обработка
    Started,
    /// Разбиение входного трека по тишине
    Segmenting,
    /// Транскрибация сегмента
    Transcribing {
        /// Текущий сегмент (с единицы)
        current: usize,
        /// Общее количество сегментов
        total: usize,
    },
    /// Синтез речи для переведённого сегмента
    Synthesizing {
        /// Текущий сегмент (с единицы)
        current: usize,
        /// Общее количество сегментов
        total: usize,
    },
    /// Склейка сегментов в итоговый трек
    Merging,
    /// Нормализация громкости
    Normalizing,
    /// Кодирование итогового трека
    Encoding,
    /// Обработка завершена
    Finished,
}

/// Асинхронно отправляет обновление прогресса
pub async fn send_progress(sender: &Option<Sender<ProgressUpdate>>, update: ProgressUpdate) {
    if let Some(sender) = sender {
        let _ = sender.send(update).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_send_progress_is_best_effort() {
        // Без получателя отправка не должна паниковать
        send_progress(&None, ProgressUpdate::Started).await;

        // Закрытый канал тоже не считается ошибкой
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        send_progress(&Some(tx), ProgressUpdate::Finished).await;
    }

    #[tokio::test]
    async fn test_updates_are_delivered_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = Some(tx);

        send_progress(&sender, ProgressUpdate::Started).await;
        send_progress(&sender, ProgressUpdate::Transcribing { current: 1, total: 2 }).await;
        send_progress(&sender, ProgressUpdate::Finished).await;

        assert_eq!(rx.recv().await, Some(ProgressUpdate::Started));
        assert_eq!(
            rx.recv().await,
            Some(ProgressUpdate::Transcribing { current: 1, total: 2 })
        );
        assert_eq!(rx.recv().await, Some(ProgressUpdate::Finished));
    }
}
