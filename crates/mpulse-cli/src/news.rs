//! Commands that talk to providers without touching the database.

use mpulse_core::{AppConfig, NewsSource};
use mpulse_scraper::NewsClient;

pub(crate) async fn run_stocks(config: &AppConfig) -> anyhow::Result<()> {
    let client = NewsClient::from_app_config(config)?;
    let listings = client.indian_stocks().await?;
    if listings.is_empty() {
        println!("screener returned no listings");
        return Ok(());
    }

    println!("{:<16}NAME", "SYMBOL");
    for listing in &listings {
        println!("{:<16}{}", listing.symbol, listing.name);
    }
    Ok(())
}

pub(crate) fn run_sources(config: &AppConfig) -> anyhow::Result<()> {
    let client = NewsClient::from_app_config(config)?;

    println!("{:<12}{:<10}DATE RANGE", "SOURCE", "READY");
    for source in NewsSource::ALL {
        println!(
            "{:<12}{:<10}{}",
            source.as_str(),
            yes_no(client.has_credentials(source)),
            yes_no(source.supports_date_range())
        );
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
