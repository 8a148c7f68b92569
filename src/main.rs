use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::signal::unix::{SignalKind, signal};

use folio::{
    cli::cli_args_from_env,
    components::{Component, ProfileCard, RenderContext},
    config::Config,
    logging::init_tracing,
    motion::{AnimationProvider, MediaQuery, ReducedMotionSource, StaticReducedMotion},
    profile::{
        GithubHttpSource, JsonFileStore, ProfileCache, ProfileController, ProfileLoader,
        SystemClock,
        credentials::{CredentialProvider, EnvCredentialProvider},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli_args_from_env()?;
    let mut config = Config::load(&args.config_path)
        .with_context(|| format!("failed to load config from {}", args.config_path.display()))?;
    if let Some(username) = args.username {
        config.profile.username = username;
    }
    let logging = init_tracing(&config.logging).context("failed to initialize logging")?;

    let reduced_motion: Box<dyn ReducedMotionSource> = match config.animation.prefers_reduced_motion
    {
        Some(prefers_reduced_motion) => Box::new(StaticReducedMotion(prefers_reduced_motion)),
        None => Box::new(MediaQuery::from_env()),
    };
    let provider = AnimationProvider::mount(config.animation.settings(), reduced_motion.as_ref());
    let render_ctx = RenderContext::with_animation(provider.scope());

    let credential = EnvCredentialProvider
        .resolve(&config.profile.credential)
        .await
        .context("failed to resolve github credential")?;
    let source = GithubHttpSource::new(
        config.profile.api_base_url.clone(),
        config.profile.request_timeout(),
        credential,
    )
    .context("failed to construct github profile source")?
    .with_user_agent(config.profile.user_agent.clone());
    let cache = ProfileCache::new(
        Arc::new(JsonFileStore::new(config.profile.cache_path.clone())),
        Arc::new(SystemClock),
        config.profile.cache_ttl(),
    );
    let controller = ProfileController::new(
        config.profile.username.clone(),
        ProfileLoader::new(Arc::new(source), cache),
    );

    tracing::info!(
        target: "folio",
        run_id = logging.run_id(),
        username = %config.profile.username,
        "profile_load_started"
    );
    controller.mount().await;

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;

    let view = tokio::select! {
        view = controller.settled() => view,
        _ = sigint.recv() => {
            controller.unmount().await;
            eprintln!("folio stopped: received SIGINT");
            return Ok(());
        }
        _ = sigterm.recv() => {
            controller.unmount().await;
            eprintln!("folio stopped: received SIGTERM");
            return Ok(());
        }
    };

    let rendered = ProfileCard::new(view.clone())
        .render(&render_ctx)
        .context("failed to render profile card")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "view": view, "render": rendered }))
            .context("failed to serialize profile output")?
    );

    controller.unmount().await;
    provider.unmount();
    Ok(())
}
