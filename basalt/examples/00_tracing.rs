mod common;

use common::{ALICE, CARER, demo_service};
use futures::StreamExt;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=debug cargo run --example 00_tracing --features tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let basalt = demo_service()?;
    basalt.status()?;

    let events: Vec<_> = basalt.view(CARER, ALICE).await?.collect().await;
    println!("normalized {} events", events.len());

    // A denied view shows up as an instrumented error.
    if let Err(e) = basalt.view("mallory", ALICE).await {
        println!("denied: {e} (status {})", e.status_code());
    }

    Ok(())
}
