use std::sync::Arc;

use futures::StreamExt;

use anketa_bot::channels::TelegramChannel;
use anketa_bot::config::BotConfig;
use anketa_bot::dispatch::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Required configuration; refuse to start without it.
    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export BOT_TOKEN=123456:ABC-...");
        eprintln!("  export ADMIN_CHAT_ID=123456789");
        std::process::exit(1);
    });

    eprintln!("🤖 Anketa bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Admin chat: {}", config.admin_chat_id);

    let channel = Arc::new(TelegramChannel::new(config.bot_token.clone()));
    channel.health_check().await?;
    eprintln!("   Telegram: connected\n");

    let mut updates = channel.start();
    let mut dispatcher = Dispatcher::new(Arc::clone(&channel), config.admin_chat_id);

    while let Some(incoming) = updates.next().await {
        dispatcher.dispatch(incoming);
    }

    dispatcher.shutdown().await;
    Ok(())
}
