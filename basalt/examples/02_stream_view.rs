mod common;

use std::time::Duration;

use common::{ALICE, CARER, demo_service};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let basalt = demo_service()?;

    let (handle, mut rx) = basalt.stream_view(CARER, ALICE).await?;
    let printer = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(item) = rx.recv().await {
            match item {
                Ok(event) => {
                    let kind = event.kind().unwrap_or("<untyped>").to_string();
                    let interval = event
                        .get("interval")
                        .and_then(|v| v.as_str())
                        .unwrap_or("-")
                        .to_string();
                    println!("{:<12} {:<20} {interval}", event.id_label(), kind);
                    count += 1;
                }
                Err(e) => {
                    eprintln!("view failed: {e}");
                    break;
                }
            }
        }
        count
    });

    let count = tokio::time::timeout(Duration::from_secs(5), printer).await??;
    handle.stop().await;
    println!("received {count} events");

    Ok(())
}
