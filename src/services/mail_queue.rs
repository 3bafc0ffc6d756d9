use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::services::email::Notifier;

/// リセットメール送信ジョブ
#[derive(Debug)]
pub struct ResetMail {
    pub to: String,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailQueueError {
    #[error("メールキューが満杯です")]
    Full,
    #[error("メールキューが停止しています")]
    Closed,
}

/// 有界メール送信キュー
///
/// 固定数のワーカーが共有キューからジョブを取り出して送信する。
/// キュー満杯時は待たずに `MailQueueError::Full` で拒否する（破棄はしない）。
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::Sender<ResetMail>,
}

impl MailQueue {
    /// ワーカーを起動してキューを作成
    ///
    /// tokio ランタイム内で呼び出すこと。送信側が全て drop されるとワーカーは終了する。
    pub fn start<N: Notifier>(notifier: N, workers: usize, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<ResetMail>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let notifier = Arc::new(notifier);

        for worker in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move {
                loop {
                    let job = rx.lock().await.recv().await;
                    let Some(job) = job else {
                        break;
                    };

                    match notifier.send_password_reset(&job.to, &job.token).await {
                        Ok(()) => {
                            tracing::info!(worker, to = %job.to, "パスワードリセットメール送信完了");
                        }
                        Err(e) => {
                            tracing::warn!(
                                worker,
                                to = %job.to,
                                error = ?e,
                                "パスワードリセットメール送信失敗（トークンは作成済み）"
                            );
                        }
                    }
                }
                tracing::debug!(worker, "メールワーカー終了");
            });
        }

        tracing::info!(workers = workers.max(1), capacity = capacity.max(1), "メールキュー起動");

        Self { tx }
    }

    /// ジョブを投入（送信完了は待たない）
    pub fn enqueue(&self, job: ResetMail) -> Result<(), MailQueueError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailQueueError::Full,
            mpsc::error::TrySendError::Closed(_) => MailQueueError::Closed,
        })
    }
}
