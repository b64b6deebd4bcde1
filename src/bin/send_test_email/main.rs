#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends the Sparkpost connectivity test email

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use sparkpost_transport::{
    domain::communication::{
        email_addresses::Address,
        mailer::{check_transport, TracingObserver},
    },
    infrastructure::{
        email::sparkpost::{SparkpostConfig, SparkpostMailer, SparkpostSettings},
        http::ReqwestHttpClient,
    },
};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The Sparkpost configuration
    #[clap(flatten)]
    pub sparkpost: SparkpostSettings,

    /// Recipient of the test email, defaults to the sender
    #[clap(long)]
    pub to: Option<Address>,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = SparkpostConfig::try_from(&args.sparkpost)?;

    let to = match args.to.or_else(|| config.from().cloned()) {
        Some(to) => to,
        None => bail!("no recipient: pass --to or set MAILER_FROM_EMAIL"),
    };

    let http = Arc::new(ReqwestHttpClient::new(Some(args.sparkpost.timeout()))?);
    let mailer = SparkpostMailer::new(config, http).with_observer(Arc::new(TracingObserver));

    let check = check_transport(&mailer, &to).await;

    println!("{}", serde_json::to_string(&check)?);

    if !check.success {
        bail!(check.message);
    }

    Ok(())
}
