//! Ask every configured provider the same question.
//!
//! Streams the realtime run to stdout as `text/event-stream` frames, or prints the
//! batch result as JSON with `--batch`. Credentials are read from the environment
//! (a `.env` file is loaded if present):
//!
//! ```bash
//! export OPENAI_API_KEY=your_api_key_here
//! export GEMINI_API_KEY=your_api_key_here
//! cargo run --example ask -- "What is the capital of France?"
//! cargo run --example ask -- --batch --providers '["gemini"]' "Bonjour !"
//! ```

use futures_util::StreamExt;
use multiai_orchestrator::relay::sse_frames;
use multiai_orchestrator::{Error, ProviderFactory, ProviderSelection, RunRequest};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut batch = false;
    let mut providers = ProviderSelection::all();
    let mut words = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--batch" => batch = true,
            "--providers" => {
                let raw = args.next().unwrap_or_default();
                providers = ProviderSelection::from_json(&raw);
            }
            _ => words.push(arg),
        }
    }

    let question = if words.is_empty() {
        "Say hello in one short sentence.".to_string()
    } else {
        words.join(" ")
    };

    let orchestrator = ProviderFactory::from_env().await?;
    let request = RunRequest::new(question).providers(providers);

    if batch {
        let result = orchestrator.run_batch(request).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let events = orchestrator.run_realtime(request)?;
    let mut frames = Box::pin(sse_frames(events));
    while let Some(frame) = frames.next().await {
        print!("{}", frame?);
    }

    Ok(())
}
