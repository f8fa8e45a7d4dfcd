//! Application state container
//!
//! [`App`] owns the wallet connection, theme, active tab and wallet-modal flag
//! alongside the per-view state. Views read snapshots of [`AppState`]; every
//! change goes through [`App::dispatch`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use crate::advisory::AdvisoryProvider;
use crate::assistant::Assistant;
use crate::balance::BalanceProvider;
use crate::config::AppConfig;
use crate::dashboard::{AutoRefresh, Dashboard};
use crate::error::Result;
use crate::history::History;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::transfer::{SubmitOutcome, TransferFlow};
use crate::wallet::{WalletConnector, WalletState};

/// Primary views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tab {
    Dashboard,
    Transfer,
    History,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Transfer, Tab::History];

    /// Heading shown above the view
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Portfolio Overview",
            Tab::Transfer => "Private FHE Transfer",
            Tab::History => "Transaction Logs",
        }
    }

    /// Short navigation label
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Portfolio",
            Tab::Transfer => "Transfer",
            Tab::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Commands accepted by [`App::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectTab(Tab),
    ToggleTheme,
    OpenWalletModal,
    CloseWalletModal,
    /// Connect through the named provider, then close the modal
    ConnectWallet(String),
    DisconnectWallet,
}

/// Shared top-level state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub active_tab: Tab,
    pub theme: Theme,
    pub wallet: WalletState,
    pub wallet_modal_open: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Dashboard,
            theme: Theme::default(),
            wallet: WalletState::disconnected(),
            wallet_modal_open: false,
        }
    }
}

/// The single primary view selected by the active tab
pub enum View<'a> {
    Dashboard(&'a Dashboard),
    Transfer(&'a TransferFlow),
    History(&'a History),
}

impl View<'_> {
    pub fn tab(&self) -> Tab {
        match self {
            View::Dashboard(_) => Tab::Dashboard,
            View::Transfer(_) => Tab::Transfer,
            View::History(_) => Tab::History,
        }
    }
}

/// Wallet modal as rendered: always present, content gated on `open`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletModal {
    pub open: bool,
    /// Provider whose connection is pending; all triggers are disabled meanwhile
    pub connecting: Option<String>,
}

/// Application
pub struct App {
    config: AppConfig,
    state: RwLock<AppState>,
    connector: WalletConnector,
    dashboard: Arc<Dashboard>,
    transfer: TransferFlow,
    history: History,
    assistant: Assistant,
    auto_refresh: Mutex<Option<AutoRefresh>>,
}

impl App {
    /// Create the application with real timers and the configured advisory backend
    pub fn new(config: AppConfig) -> Result<Self> {
        let advisory = AdvisoryProvider::from_config(&config.advisor)?;
        Ok(Self::with_parts(config, Arc::new(TokioScheduler), advisory))
    }

    /// Create the application from explicit collaborators
    pub fn with_parts(config: AppConfig, scheduler: Arc<dyn Scheduler>, advisory: AdvisoryProvider) -> Self {
        let timings = config.timings;
        Self {
            connector: WalletConnector::new(scheduler.clone(), timings.connect_delay),
            dashboard: Arc::new(Dashboard::new(BalanceProvider::new(
                scheduler.clone(),
                timings.balance_latency,
            ))),
            transfer: TransferFlow::new(scheduler, timings.encrypt_delay, timings.send_delay),
            history: History::sample(),
            assistant: Assistant::new(Arc::new(advisory)),
            state: RwLock::new(AppState::default()),
            auto_refresh: Mutex::new(None),
            config,
        }
    }

    /// Mount the initial view
    pub async fn start(&self) {
        let tab = self.mount().await;
        tracing::info!(tab = ?tab, "Application started");
    }

    /// Snapshot of the top-level state
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn wallet(&self) -> WalletState {
        self.state.read().await.wallet.clone()
    }

    /// Apply a command
    pub async fn dispatch(&self, action: Action) -> Result<()> {
        tracing::debug!(?action, "Dispatching action");
        match action {
            Action::SelectTab(tab) => {
                let previous = {
                    let mut state = self.state.write().await;
                    std::mem::replace(&mut state.active_tab, tab)
                };
                if previous != tab {
                    self.mount().await;
                }
            }
            Action::ToggleTheme => {
                let mut state = self.state.write().await;
                state.theme = state.theme.toggled();
            }
            Action::OpenWalletModal => {
                self.state.write().await.wallet_modal_open = true;
            }
            Action::CloseWalletModal => {
                self.state.write().await.wallet_modal_open = false;
            }
            Action::ConnectWallet(provider) => {
                let wallet = self.connector.connect(&provider).await?;
                let mut state = self.state.write().await;
                state.wallet = wallet;
                state.wallet_modal_open = false;
            }
            Action::DisconnectWallet => {
                let wallet = self.connector.disconnect();
                self.state.write().await.wallet = wallet;
            }
        }
        Ok(())
    }

    /// Start or stop the dashboard's periodic refresh to match the shown view
    ///
    /// The tab is read while holding the task slot, so the last mount always
    /// sees the last tab selected.
    async fn mount(&self) -> Tab {
        let mut auto_refresh = self.auto_refresh.lock().await;
        let tab = self.state.read().await.active_tab;
        match tab {
            Tab::Dashboard => {
                if auto_refresh.is_none() {
                    *auto_refresh = Some(
                        self.dashboard
                            .spawn_auto_refresh(self.config.timings.refresh_interval),
                    );
                }
            }
            Tab::Transfer | Tab::History => {
                auto_refresh.take();
            }
        }
        tab
    }

    /// Whether the dashboard refresh task is active
    pub async fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh
            .lock()
            .await
            .as_ref()
            .map_or(false, AutoRefresh::is_running)
    }

    /// The primary view for the active tab
    pub async fn view(&self) -> View<'_> {
        match self.state.read().await.active_tab {
            Tab::Dashboard => View::Dashboard(self.dashboard.as_ref()),
            Tab::Transfer => View::Transfer(&self.transfer),
            Tab::History => View::History(&self.history),
        }
    }

    pub async fn wallet_modal(&self) -> WalletModal {
        WalletModal {
            open: self.state.read().await.wallet_modal_open,
            connecting: self.connector.connecting(),
        }
    }

    /// Submit the transfer form against the current wallet
    pub async fn submit_transfer(&self) -> SubmitOutcome {
        let wallet = self.wallet().await;
        self.transfer.submit(&wallet).await
    }

    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    pub fn transfer(&self) -> &TransferFlow {
        &self.transfer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::OfflineGenerator;
    use crate::scheduler::InstantScheduler;

    fn app() -> App {
        App::with_parts(
            AppConfig::default(),
            Arc::new(InstantScheduler::new()),
            AdvisoryProvider::new(Arc::new(OfflineGenerator)),
        )
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().toggled(), Theme::Light);
    }

    #[test]
    fn test_tab_titles() {
        let titles: Vec<_> = Tab::ALL.iter().map(Tab::title).collect();
        assert_eq!(titles, vec!["Portfolio Overview", "Private FHE Transfer", "Transaction Logs"]);

        let labels: Vec<_> = Tab::ALL.iter().map(Tab::label).collect();
        assert_eq!(labels, vec!["Portfolio", "Transfer", "History"]);
    }

    #[tokio::test]
    async fn test_initial_state() {
        let app = app();
        let state = app.state().await;

        assert_eq!(state.active_tab, Tab::Dashboard);
        assert_eq!(state.theme, Theme::Dark);
        assert!(!state.wallet.is_connected());
        assert!(!state.wallet_modal_open);
        assert_eq!(app.config().timings.refresh_interval, std::time::Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_view_follows_tab() {
        let app = app();
        for tab in Tab::ALL {
            app.dispatch(Action::SelectTab(tab)).await.unwrap();
            assert_eq!(app.view().await.tab(), tab);
        }
    }

    #[tokio::test]
    async fn test_modal_connect_closes_modal() {
        let app = app();
        app.dispatch(Action::OpenWalletModal).await.unwrap();
        assert!(app.wallet_modal().await.open);

        app.dispatch(Action::ConnectWallet("MetaMask".to_string())).await.unwrap();

        let state = app.state().await;
        assert!(state.wallet.is_connected());
        assert!(!state.wallet_modal_open);
        assert_eq!(app.wallet_modal().await.connecting, None);

        app.dispatch(Action::DisconnectWallet).await.unwrap();
        assert_eq!(app.wallet().await, WalletState::disconnected());
    }

    #[tokio::test]
    async fn test_close_modal_without_connecting() {
        let app = app();
        app.dispatch(Action::OpenWalletModal).await.unwrap();
        app.dispatch(Action::CloseWalletModal).await.unwrap();

        let state = app.state().await;
        assert!(!state.wallet_modal_open);
        assert!(!state.wallet.is_connected());
    }

    #[tokio::test]
    async fn test_refresh_runs_only_on_dashboard() {
        let app = app();
        assert!(!app.is_auto_refreshing().await);

        app.start().await;
        assert!(app.is_auto_refreshing().await);

        app.dispatch(Action::SelectTab(Tab::History)).await.unwrap();
        assert!(!app.is_auto_refreshing().await);

        app.dispatch(Action::SelectTab(Tab::Dashboard)).await.unwrap();
        assert!(app.is_auto_refreshing().await);
    }
}
