//! Smoke test against the real WeCom API.
//!
//! Ignored by default. Provide `WECOM_CORP_ID`, `WECOM_CORP_SECRET` and
//! `WECOM_AGENT_ID` (a `.env` file works), optionally `WECOM_TEST_CODE`
//! and `WECOM_TEST_TOUSER`, then run with `--ignored`.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use wecom::{Config, WecomClient};

#[tokio::test]
#[ignore = "requires WeCom credentials"]
async fn test_live_directory_and_message() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wecom=debug")),
        )
        .with_test_writer()
        .try_init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let client = WecomClient::new(config).context("Failed to create WeCom client")?;

    client.access_token().await.context("access token")?;

    if let Ok(code) = std::env::var("WECOM_TEST_CODE") {
        let user_id = client.get_user_id(&code).await.context("user id by code")?;
        tracing::info!(user_id = %user_id, "Resolved OAuth code");
    }

    for department in client.list_departments().await.context("departments")? {
        tracing::info!("{}", department);
        for user in client.list_users(department.id, true).await.context("users")? {
            tracing::info!("{}", user);
        }
    }

    let agent = client.get_agent().await.context("agent")?;
    for user_id in agent.user_ids() {
        let user = client.get_user(user_id).await.context("user")?;
        tracing::info!("{}", user);
    }

    if let Ok(to_user) = std::env::var("WECOM_TEST_TOUSER") {
        let receipt = client
            .send_text_message(&to_user, "wecom live test")
            .await
            .context("message")?;
        tracing::info!(?receipt, "Message sent");
    }

    Ok(())
}
