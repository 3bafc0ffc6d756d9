use std::future::Future;

use crate::config::Config;
use crate::error::AppError;

/// リセットメールの有効期限表記（トークン有効期限と一致させること）
const RESET_LINK_VALID_MINUTES: i64 = 30;

/// リセットリンクの通知先
///
/// 送信結果はメールキューのワーカーがログに出すだけで、呼び出し元には返らない
pub trait Notifier: Send + Sync + 'static {
    fn send_password_reset(
        &self,
        to: &str,
        token: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// メール送信サービス
///
/// `email` フィーチャー有効かつSMTP設定済みの場合は lettre で送信し、
/// それ以外はログ出力のみ（開発モード）
#[derive(Clone)]
pub struct EmailService {
    frontend_url: String,
    #[cfg(feature = "email")]
    mailer: Option<smtp::SmtpMailer>,
}

impl EmailService {
    /// 新しい EmailService を作成
    pub fn new(config: &Config) -> Result<Self, AppError> {
        #[cfg(feature = "email")]
        let mailer = smtp::SmtpMailer::from_config(config)?;

        #[cfg(not(feature = "email"))]
        {
            if config.smtp_configured() {
                tracing::warn!("SMTP設定がありますが email フィーチャーが無効です（ログ出力のみ）");
            }
        }

        Ok(Self {
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            #[cfg(feature = "email")]
            mailer,
        })
    }

    /// リセットURLを構築
    pub fn build_reset_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.frontend_url, token)
    }
}

impl Notifier for EmailService {
    async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), AppError> {
        let reset_url = self.build_reset_url(token);

        #[cfg(feature = "email")]
        {
            if let Some(mailer) = &self.mailer {
                return mailer.send(to, &render_reset_email(&reset_url)).await;
            }
        }

        // 開発モード: メール送信せずログ出力のみ
        tracing::info!(to = %to, "パスワードリセットメール送信（開発モード）");
        tracing::debug!("リセットURL: {}", reset_url);
        Ok(())
    }
}

/// リセットメール本文（HTML）
pub fn render_reset_email(reset_url: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif;">
    <h2 style="color: #2C3E50;">パスワード再設定</h2>
    <p style="color: #34495E;">パスワード再設定リンクが発行されました。</p>
    <div style="margin: 30px 0;">
        <a href="{reset_url}"
           style="background-color: #3498DB; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; display: inline-block;">
            パスワードを再設定する
        </a>
    </div>
    <p style="color: #7F8C8D; font-size: 0.9em;">このリンクは{RESET_LINK_VALID_MINUTES}分間有効です。</p>
    <p style="color: #7F8C8D; font-size: 0.9em;">心当たりがない場合はこのメールを無視してください。</p>
</div>"#
    )
}

#[cfg(feature = "email")]
mod smtp {
    use lettre::message::{Mailbox, header::ContentType};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
    use secrecy::ExposeSecret;

    use crate::config::Config;
    use crate::error::AppError;

    const SUBJECT: &str = "パスワード再設定リンク";

    #[derive(Clone)]
    pub(super) struct SmtpMailer {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    }

    impl SmtpMailer {
        pub(super) fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
            let (Some(host), Some(username), Some(password), Some(from)) = (
                &config.smtp_host,
                &config.smtp_username,
                &config.smtp_password,
                &config.smtp_from_address,
            ) else {
                tracing::info!("SMTP 未設定（ログ出力のみ）");
                return Ok(None);
            };

            let from = from.parse::<Mailbox>().map_err(|e| {
                tracing::error!(error = ?e, "送信元アドレスが不正");
                AppError::Internal(anyhow::anyhow!("invalid smtp_from_address"))
            })?;

            let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| {
                    tracing::error!(error = ?e, host = %host, "SMTPリレーの初期化に失敗");
                    AppError::Internal(anyhow::anyhow!("smtp relay error"))
                })?
                .port(config.smtp_port)
                .credentials(Credentials::new(
                    username.expose_secret().clone(),
                    password.expose_secret().clone(),
                ))
                .build();

            tracing::info!(host = %host, port = config.smtp_port, "SMTP送信を有効化");
            Ok(Some(Self { transport, from }))
        }

        pub(super) async fn send(&self, to: &str, html: &str) -> Result<(), AppError> {
            let to = to.parse::<Mailbox>().map_err(|e| {
                tracing::warn!(error = ?e, "宛先アドレスが不正");
                AppError::Internal(anyhow::anyhow!("invalid recipient"))
            })?;

            let message = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(SUBJECT)
                .header(ContentType::TEXT_HTML)
                .body(html.to_string())
                .map_err(|e| AppError::Internal(anyhow::anyhow!("build email: {e}")))?;

            self.transport
                .send(message)
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("smtp send: {e}")))?;

            Ok(())
        }
    }
}
