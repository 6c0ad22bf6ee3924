//! Newest/oldest article report.

use console::style;

use crate::config::Settings;
use crate::server::connect_news_service;

/// Print the newest and oldest article timestamps for a source.
pub async fn cmd_span(
    settings: &Settings,
    source: &str,
    company: Option<&str>,
) -> anyhow::Result<()> {
    let news = connect_news_service(settings).await?;
    let profile = news.sources().resolve(source);

    let scope = match company {
        Some(company) => format!("'{}' in {}", company, profile.collection),
        None => profile.collection.clone(),
    };

    match news.newest_oldest(source, company).await? {
        Some(span) => {
            println!("{} Articles for {}", style("→").cyan(), scope);
            println!("  Newest: {}", span.newest.to_rfc3339());
            println!("  Oldest: {}", span.oldest.to_rfc3339());
        }
        None => {
            println!("{} No articles found for {}", style("!").yellow(), scope);
        }
    }
    Ok(())
}
