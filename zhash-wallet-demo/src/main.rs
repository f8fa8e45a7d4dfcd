//! Scripted walkthrough of the wallet dashboard state
//!
//! Drives one session end to end: load balances, connect a wallet, send a
//! private transfer and ask the assistant a question.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zhash_wallet::{
    balance::{total_value, BalanceSelector},
    catalog::TokenSymbol,
    transfer::SubmitOutcome,
    Action, App, AppConfig, Tab, View,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Zhash wallet demo v{}", zhash_wallet::VERSION);

    let app = App::new(AppConfig::from_env()?)?;
    tracing::info!(
        refresh_interval = ?app.config().timings.refresh_interval,
        model = %app.config().advisor.model,
        "Configuration loaded"
    );
    app.start().await;

    // Let the initial balance load land
    while app.dashboard().is_loading() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    render(&app).await;

    app.dispatch(Action::OpenWalletModal).await?;
    app.dispatch(Action::ConnectWallet("MetaMask".to_string())).await?;
    let wallet = app.wallet().await;
    tracing::info!(
        address = %wallet.short_address().unwrap_or_default(),
        network = wallet.network_name().unwrap_or("unknown"),
        "Connected"
    );

    app.dispatch(Action::SelectTab(Tab::Transfer)).await?;
    app.transfer()
        .update(|session| {
            session.select_token(TokenSymbol::Usdc);
            session.set_amount("1200");
            session.set_recipient("0x8ba1f109551bD432803012645Ac136ddd64DBA72");
        })
        .await;
    render(&app).await;

    match app.submit_transfer().await {
        SubmitOutcome::Started => {
            if let Some(receipt) = app.transfer().snapshot().await.receipt() {
                tracing::info!(
                    amount = %receipt.amount,
                    token = %receipt.token,
                    fee = %receipt.fee,
                    "Private transfer sent"
                );
            }
            app.transfer().reset().await;
        }
        SubmitOutcome::Rejected(reason) => tracing::warn!(?reason, "Transfer not started"),
    }

    app.dispatch(Action::SelectTab(Tab::History)).await?;
    render(&app).await;

    let assistant = app.assistant();
    assistant.use_suggestion(0).await;
    assistant.submit().await;
    if let Some(reply) = assistant.response().await {
        tracing::info!(query = %assistant.query().await, "Assistant: {}", reply);
    }

    app.dispatch(Action::DisconnectWallet).await?;
    Ok(())
}

async fn render(app: &App) {
    let view = app.view().await;
    let nav: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == view.tab() {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    tracing::info!("{}", nav.join(" | "));
    tracing::info!("== {} ==", view.tab().title());
    match view {
        View::Dashboard(dashboard) => {
            let summary = dashboard.summary().await;
            tracing::info!(
                shielded = %summary.total_shielded,
                public = %summary.total_public,
                "Portfolio"
            );
            for row in dashboard.rows().await {
                tracing::info!(
                    "{:<5} public {:>10} shielded {:>10} @ ${}",
                    row.symbol,
                    row.public_balance,
                    row.shielded_balance,
                    row.price
                );
            }
            let tokens = dashboard.tokens().await;
            tracing::debug!(
                shielded = %total_value(&tokens, BalanceSelector::Shielded),
                public = %total_value(&tokens, BalanceSelector::Public),
                "Raw totals"
            );
        }
        View::Transfer(flow) => {
            let session = flow.snapshot().await;
            tracing::info!(
                token = %session.selected_token(),
                amount = session.amount(),
                fee = %session.fee_display(),
                phase = ?session.phase(),
                in_flight = session.phase().is_in_flight(),
                "Transfer form"
            );
        }
        View::History(history) => {
            for tx in history.transactions() {
                tracing::info!(
                    "{:<16} {:>9} {:<4} {:?} {}",
                    tx.kind.label(),
                    tx.amount,
                    tx.token,
                    tx.status,
                    tx.hash
                );
            }
        }
    }
}
