//! # pix-pay
//!
//! Terminal checkout: runs one payment session against a pix-checkout server
//! and prints the PIX code until the payment is confirmed.
//!
//! ```bash
//! pix-pay --plan plano2 --api-url http://127.0.0.1:8080
//! ```

use clap::Parser;
use pix_core::PlanCatalog;
use pix_session::{HttpCheckoutApi, SessionConfig, SessionController, SessionState, SessionView};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "pix-pay", version, about = "Pay a checkout plan with PIX")]
struct Cli {
    /// Base URL of the pix-checkout server
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Plan to check out
    #[arg(long, default_value = "plano2")]
    plan: String,

    /// Plan catalog (built-in plans are used when the file is absent)
    #[arg(long, default_value = "config/plans.toml")]
    plans: String,

    /// Seconds between payment checks
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let catalog = PlanCatalog::load_or_builtin(&cli.plans)?;
    let plan = catalog
        .get(&cli.plan)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Unknown plan: {}", cli.plan))?;

    let api = Arc::new(HttpCheckoutApi::new(&cli.api_url)?);
    let config = SessionConfig::new(plan).with_poll_interval(Duration::from_secs(cli.poll_secs.max(1)));
    let mut session = SessionController::new(api, config);
    let mut updates = session.subscribe();

    info!("Starting session for plan {}", cli.plan);
    println!("{}", session.plan().label);
    session.start().await;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();
                render(&view);

                match view.state {
                    SessionState::Paid { .. } => break,
                    SessionState::Error { message } => {
                        session.stop();
                        anyhow::bail!("{}", message);
                    }
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Cancelled.");
                break;
            }
        }
    }

    session.stop();
    Ok(())
}

fn render(view: &SessionView) {
    match &view.state {
        SessionState::Idle => {}
        SessionState::Creating { .. } => println!("Generating PIX payment..."),
        SessionState::Error { message } => println!("Error: {}", message),
        SessionState::AwaitingPayment { pix, .. } => {
            println!("Scan the QR code or copy the PIX code below.");
            if let Some(image) = &pix.qrcode_image {
                let src = image.as_src();
                // base64 images are long; show only the prefix
                let shown: String = src.chars().take(80).collect();
                println!("QR code: {}", shown);
            }
            println!("PIX code (copy and paste):\n{}", pix.code);
            println!("Waiting for payment confirmation...");
        }
        SessionState::Paid { .. } => println!("Payment confirmed! Thank you for your purchase."),
    }
}
