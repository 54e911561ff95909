mod config;
mod relay;

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

use config::Config;
use relay::{
    GenerationInvoker, GoogleTranslateClient, HuggingFaceClient, Language, Outcome, Pipeline, Request, SessionStore,
    TelegramClient, TranslationGateway,
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    Help,
    Language,
    Stats,
}

struct BotState {
    pipeline: Pipeline,
    telegram: TelegramClient,
}

impl BotState {
    fn new(config: &Config, bot: &Bot) -> Result<Self, String> {
        let translator = GoogleTranslateClient::new(config.translator_endpoint.clone(), config.request_timeout)
            .map_err(|e| format!("failed to build translator client: {e}"))?;
        let generator = HuggingFaceClient::new(
            config.generator_endpoint.clone(),
            config.generator_api_key.clone(),
            config.request_timeout,
        )
        .map_err(|e| format!("failed to build generator client: {e}"))?;

        let pipeline = Pipeline::new(
            Arc::new(SessionStore::new(config.default_language)),
            TranslationGateway::new(Arc::new(translator)),
            GenerationInvoker::new(Arc::new(generator)),
        );

        Ok(Self {
            pipeline,
            telegram: TelegramClient::new(bot.clone()),
        })
    }

    fn language_of(&self, caller_id: i64) -> Language {
        self.pipeline.session().get_language(caller_id)
    }
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lingvobot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("lingvobot.log"))
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file in {}: {e}", log_dir.display());
            std::process::exit(1);
        }
    };
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting lingvobot...");
    info!("Loaded config from {config_path}");
    info!("Generator: {}", config.generator_endpoint);
    info!("Default language: {}", config.default_language);

    let bot = Bot::new(&config.telegram_bot_token);

    let state = match BotState::new(&config, &bot) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
                .branch(dptree::endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };
    let caller_id = user.id.0 as i64;
    let chat_id = msg.chat.id.0;
    let language = state.language_of(caller_id);

    match cmd {
        Command::Start => {
            state.telegram.send_message(chat_id, language.greeting(), None).await.ok();
        }
        Command::Help => {
            state.telegram.send_message(chat_id, language.help(), None).await.ok();
        }
        Command::Language => {
            state.telegram.send_language_picker(chat_id, language).await.ok();
        }
        Command::Stats => {
            let session = state.pipeline.session();
            let text = language.stats_text(session.query_count(), session.started_at());
            state.telegram.send_message(chat_id, &text, None).await.ok();
        }
    }

    Ok(())
}

async fn handle_text(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(ref user) = msg.from else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Unknown commands are not questions
    if text.starts_with('/') {
        return Ok(());
    }

    let caller_id = user.id.0 as i64;
    let chat_id = msg.chat.id.0;
    let username = user.username.as_deref().unwrap_or(&user.first_name);
    let text_preview: String = text.chars().take(100).collect();
    info!("📨 Message from {username} ({caller_id}): \"{text_preview}\"");

    state.telegram.send_typing(chat_id).await;

    let reply = state.pipeline.handle(&Request::new(text, caller_id)).await;

    if let Outcome::Delivered { forward_fallback, backward_fallback, .. } = reply.outcome
        && (forward_fallback || backward_fallback)
    {
        warn!("Translation fallback used for {caller_id}: {:?}", reply.outcome);
    }

    state
        .telegram
        .send_message(chat_id, &reply.text, Some(msg.id.0 as i64))
        .await
        .ok();

    Ok(())
}

async fn handle_callback(query: CallbackQuery, state: Arc<BotState>) -> ResponseResult<()> {
    let caller_id = query.from.id.0 as i64;

    let Some(language) = query.data.as_deref().and_then(Language::from_callback_data) else {
        warn!("Unknown callback data from {caller_id}: {:?}", query.data);
        state.telegram.answer_callback(&query, "?").await;
        return Ok(());
    };

    state.pipeline.session().set_language(caller_id, language);
    info!("🌐 {caller_id} selected language {language}");

    state.telegram.answer_callback(&query, language.selected()).await;
    if let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id) {
        state.telegram.send_message(chat_id.0, language.selected(), None).await.ok();
    }

    Ok(())
}
