//! Tests for the private transfer flow driven through the application

use std::sync::Arc;
use std::time::Duration;

use zhash_wallet::advisory::{AdvisoryProvider, OfflineGenerator};
use zhash_wallet::catalog::TokenSymbol;
use zhash_wallet::scheduler::{InstantScheduler, TokioScheduler};
use zhash_wallet::transfer::{Rejection, SubmitOutcome, TransferPhase};
use zhash_wallet::{Action, App, AppConfig, Tab};

fn app_with_real_timers() -> Arc<App> {
    Arc::new(App::with_parts(
        AppConfig::default(),
        Arc::new(TokioScheduler),
        AdvisoryProvider::new(Arc::new(OfflineGenerator)),
    ))
}

async fn fill_form(app: &App, token: TokenSymbol, amount: &str) {
    app.transfer()
        .update(|session| {
            session.select_token(token);
            session.set_amount(amount);
            session.set_recipient("0x8ba1f109551bD432803012645Ac136ddd64DBA72");
        })
        .await;
}

async fn phase(app: &App) -> TransferPhase {
    app.transfer().snapshot().await.phase()
}

#[tokio::test(start_paused = true)]
async fn test_usdc_transfer_end_to_end() {
    let app = app_with_real_timers();
    app.dispatch(Action::ConnectWallet("MetaMask".to_string())).await.unwrap();
    app.dispatch(Action::SelectTab(Tab::Transfer)).await.unwrap();
    fill_form(&app, TokenSymbol::Usdc, "1200").await;

    // Fee is shown before submitting
    assert_eq!(app.transfer().snapshot().await.fee_display(), "0.120000");

    let submit = tokio::spawn({
        let app = app.clone();
        async move { app.submit_transfer().await }
    });
    while phase(&app).await == TransferPhase::Idle {
        tokio::task::yield_now().await;
    }
    assert_eq!(phase(&app).await, TransferPhase::Encrypting);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(phase(&app).await, TransferPhase::Sending);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(phase(&app).await, TransferPhase::Success);
    assert_eq!(submit.await.unwrap(), SubmitOutcome::Started);

    // The receipt matches what was entered
    let session = app.transfer().snapshot().await;
    let receipt = session.receipt().unwrap();
    assert_eq!(receipt.token, TokenSymbol::Usdc);
    assert_eq!(receipt.amount, "1200");
    assert_eq!(receipt.fee, "0.120000");
}

#[tokio::test(start_paused = true)]
async fn test_resubmit_while_in_flight_has_no_effect() {
    let app = app_with_real_timers();
    app.dispatch(Action::ConnectWallet("Rabby".to_string())).await.unwrap();
    fill_form(&app, TokenSymbol::Eth, "0.25").await;

    let submit = tokio::spawn({
        let app = app.clone();
        async move { app.submit_transfer().await }
    });
    while phase(&app).await == TransferPhase::Idle {
        tokio::task::yield_now().await;
    }

    // During encryption
    let before = app.transfer().snapshot().await;
    assert_eq!(
        app.submit_transfer().await,
        SubmitOutcome::Rejected(Rejection::NotIdle)
    );
    assert_eq!(app.transfer().snapshot().await, before);

    // During sending
    tokio::time::sleep(Duration::from_millis(2100)).await;
    let before = app.transfer().snapshot().await;
    assert_eq!(before.phase(), TransferPhase::Sending);
    assert_eq!(
        app.submit_transfer().await,
        SubmitOutcome::Rejected(Rejection::NotIdle)
    );
    assert_eq!(app.transfer().snapshot().await, before);

    assert_eq!(submit.await.unwrap(), SubmitOutcome::Started);
}

#[tokio::test]
async fn test_disconnected_submit_never_encrypts() {
    let scheduler = Arc::new(InstantScheduler::new());
    let app = App::with_parts(
        AppConfig::default(),
        scheduler.clone(),
        AdvisoryProvider::new(Arc::new(OfflineGenerator)),
    );
    fill_form(&app, TokenSymbol::Usdt, "250.00").await;

    let outcome = app.submit_transfer().await;

    assert_eq!(outcome, SubmitOutcome::Rejected(Rejection::WalletDisconnected));
    assert_eq!(phase(&app).await, TransferPhase::Idle);
    assert!(scheduler.requested().is_empty());
}

#[tokio::test]
async fn test_new_transfer_after_success() {
    let app = App::with_parts(
        AppConfig::default(),
        Arc::new(InstantScheduler::new()),
        AdvisoryProvider::new(Arc::new(OfflineGenerator)),
    );
    app.dispatch(Action::ConnectWallet("MetaMask".to_string())).await.unwrap();
    fill_form(&app, TokenSymbol::Usdt, "250.00").await;

    assert_eq!(app.submit_transfer().await, SubmitOutcome::Started);
    assert_eq!(
        app.transfer().snapshot().await.receipt().map(|r| r.fee.clone()),
        Some("0.025000".to_string())
    );

    assert!(app.transfer().reset().await);
    let session = app.transfer().snapshot().await;
    assert_eq!(session.phase(), TransferPhase::Idle);
    assert_eq!(session.amount(), "");
    assert_eq!(session.recipient(), "");
    assert_eq!(session.selected_token(), TokenSymbol::Usdt);

    // Disconnecting blocks the next transfer
    app.dispatch(Action::DisconnectWallet).await.unwrap();
    fill_form(&app, TokenSymbol::Usdt, "10").await;
    assert_eq!(
        app.submit_transfer().await,
        SubmitOutcome::Rejected(Rejection::WalletDisconnected)
    );
}

#[tokio::test(start_paused = true)]
async fn test_aborted_submit_still_reaches_success() {
    let app = app_with_real_timers();
    app.dispatch(Action::ConnectWallet("MetaMask".to_string())).await.unwrap();
    fill_form(&app, TokenSymbol::Usdc, "1200").await;

    let submit = tokio::spawn({
        let app = app.clone();
        async move { app.submit_transfer().await }
    });
    while phase(&app).await == TransferPhase::Idle {
        tokio::task::yield_now().await;
    }
    submit.abort();
    assert!(submit.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(phase(&app).await, TransferPhase::Success);
    assert_eq!(
        app.transfer().snapshot().await.receipt().map(|r| r.fee.clone()),
        Some("0.120000".to_string())
    );

    // The form is usable again
    assert!(app.transfer().reset().await);
    fill_form(&app, TokenSymbol::Usdc, "5").await;
    assert_eq!(app.submit_transfer().await, SubmitOutcome::Started);
    assert_eq!(phase(&app).await, TransferPhase::Success);
}
