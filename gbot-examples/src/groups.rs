//! Prints the groups visible to ACCESS_TOKEN (BOT_ID may be empty for this command).

use anyhow::Context;
use groupme_client::GroupMeClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let access_token = std::env::var("ACCESS_TOKEN").context("ACCESS_TOKEN not set")?;
    let bot_id = std::env::var("BOT_ID").unwrap_or_default();

    let client = GroupMeClient::new(access_token, bot_id);
    let groups = client.find_groups().await?;

    if groups.is_empty() {
        println!("No groups.");
        return Ok(());
    }

    println!("{:<12} {:<32} {:<8} {:>8} {:>10}", "id", "name", "type", "members", "messages");
    println!("{}", "-".repeat(74));
    for g in &groups {
        let count = |n: Option<i64>| n.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<32} {:<8} {:>8} {:>10}",
            g.identifier().unwrap_or("-"),
            g.name.as_deref().unwrap_or("-"),
            g.group_type.as_deref().unwrap_or("-"),
            count(g.member_count),
            count(g.message_count),
        );
    }

    Ok(())
}
