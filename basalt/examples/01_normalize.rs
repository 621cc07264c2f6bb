mod common;

use common::{ALICE, demo_service};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let basalt = demo_service()?;
    if let Some(desc) = basalt.service_descriptor() {
        println!("serving {} on {:?}://{}", desc.service, desc.protocol, desc.host);
    }

    let mut out = Vec::new();
    let n = basalt.write_view(ALICE, ALICE, &mut out).await?;
    println!("{}", String::from_utf8_lossy(&out));
    println!("{n} elements");

    Ok(())
}
