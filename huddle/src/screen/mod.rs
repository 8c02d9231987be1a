//! The call screen.
//!
//! [`Screen`] is a cheap handle to an event loop that owns the collaborator
//! session and all screen state. User actions, collaborator events and
//! animation timers are all applied from that loop, one at a time. Listeners
//! handed to the collaborator only forward events into the loop, so a handler
//! always acts on the current roster rather than a copy taken at registration.
mod boundary;
mod state;
mod view;

pub use boundary::FaultBoundary;
pub use state::ScreenState;
pub use view::{Control, RemoteStrip, ScreenBody, ScreenView, VideoArea};

use futures::channel::oneshot;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    Notify,
};
use tokio::time::Instant;

use crate::config::Config;
use crate::error::Error;
use crate::notification::{BannerView, Completion, Notification, Severity, Timer};
use crate::platform::{self, MediaPermissions, Platform};
use crate::roster::PeerRoster;
use crate::session::{CallSession, SessionEvent, SessionEventKind, SessionFactory};
use crate::sync::Arc;

enum ScreenCmd {
    StartCall {
        rsp: oneshot::Sender<Result<(), Error>>,
    },
    EndCall {
        rsp: oneshot::Sender<Result<(), Error>>,
    },
    Notify {
        notification: Notification,
    },
    Dismiss,
    TryAgain,
    Render {
        rsp: oneshot::Sender<ScreenView>,
    },
    GetRoster {
        rsp: oneshot::Sender<PeerRoster>,
    },
    GetBanner {
        rsp: oneshot::Sender<BannerView>,
    },
}

struct NotifyWrapper {
    notify: Arc<Notify>,
}

impl Drop for NotifyWrapper {
    fn drop(&mut self) {
        self.notify.notify_waiters();
    }
}

#[derive(Default)]
pub struct ScreenBuilder {
    config: Option<Config>,
    factory: Option<Arc<dyn SessionFactory>>,
    permissions: Option<(Platform, Arc<dyn MediaPermissions>)>,
}

impl ScreenBuilder {
    pub fn set_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn set_session_factory<F: SessionFactory + 'static>(mut self, factory: F) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Requests camera and microphone access at startup when `platform` needs it
    pub fn set_permissions<P: MediaPermissions + 'static>(
        mut self,
        platform: Platform,
        permissions: P,
    ) -> Self {
        self.permissions = Some((platform, Arc::new(permissions)));
        self
    }

    /// Spawns the screen's event loop. Must be called from within a tokio runtime.
    pub fn finalize(self) -> Result<Screen, Error> {
        let config = self
            .config
            .ok_or_else(|| Error::MissingConfig("screen config".into()))?;
        let factory = self.factory.ok_or(Error::SessionNotInitialized)?;

        if let Some((platform, permissions)) = self.permissions {
            // not awaited; calls may start before it resolves
            let _ = platform::request_in_background(platform, permissions);
        }

        let (tx, cmd_rx) = mpsc::unbounded_channel();
        let notify = Arc::new(Notify::new());
        let notify2 = notify.clone();
        tokio::spawn(async move {
            run(config, factory, cmd_rx, notify2).await;
        });

        Ok(Screen {
            ch: tx,
            notify: Arc::new(NotifyWrapper { notify }),
        })
    }
}

#[derive(Clone)]
pub struct Screen {
    ch: UnboundedSender<ScreenCmd>,
    notify: Arc<NotifyWrapper>,
}

impl Screen {
    pub fn builder() -> ScreenBuilder {
        ScreenBuilder::default()
    }

    /// Asks the collaborator to join the configured channel. Membership is
    /// observed later through `JoinChannelSuccess`.
    pub async fn start_call(&self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCmd::StartCall { rsp: tx })?;
        rx.await.map_err(|_| Error::ReceiverChannelUnavailable)?
    }

    /// Asks the collaborator to leave and clears the roster whatever the outcome
    pub async fn end_call(&self) -> Result<(), Error> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCmd::EndCall { rsp: tx })?;
        rx.await.map_err(|_| Error::ReceiverChannelUnavailable)?
    }

    pub fn notify(&self, notification: Notification) -> Result<(), Error> {
        self.send(ScreenCmd::Notify { notification })
    }

    /// Hides the banner, persistent or not
    pub fn dismiss(&self) -> Result<(), Error> {
        self.send(ScreenCmd::Dismiss)
    }

    /// Clears a caught rendering fault so the next render rebuilds the content
    pub fn try_again(&self) -> Result<(), Error> {
        self.send(ScreenCmd::TryAgain)
    }

    pub async fn render(&self) -> Result<ScreenView, Error> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCmd::Render { rsp: tx })?;
        rx.await.map_err(|_| Error::ReceiverChannelUnavailable)
    }

    pub async fn roster(&self) -> Result<PeerRoster, Error> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCmd::GetRoster { rsp: tx })?;
        rx.await.map_err(|_| Error::ReceiverChannelUnavailable)
    }

    pub async fn joined(&self) -> Result<bool, Error> {
        self.roster().await.map(|roster| roster.joined())
    }

    pub async fn banner(&self) -> Result<BannerView, Error> {
        let (tx, rx) = oneshot::channel();
        self.send(ScreenCmd::GetBanner { rsp: tx })?;
        rx.await.map_err(|_| Error::ReceiverChannelUnavailable)
    }

    fn send(&self, cmd: ScreenCmd) -> Result<(), Error> {
        self.ch
            .send(cmd)
            .map_err(|_| Error::SenderChannelUnavailable)
    }
}

type PendingTimers = FuturesUnordered<BoxFuture<'static, Timer>>;

fn schedule(pending: &mut PendingTimers, timer: Timer) {
    let deadline = Instant::now() + timer.after;
    pending.push(
        async move {
            tokio::time::sleep_until(deadline).await;
            timer
        }
        .boxed(),
    );
}

/// Creates the collaborator, enables video and registers one forwarding listener per event kind
async fn init_session(
    factory: &dyn SessionFactory,
    app_id: &str,
    event_tx: &UnboundedSender<SessionEvent>,
) -> Result<Box<dyn CallSession>, Error> {
    let mut session = factory.create(app_id).await?;
    session.enable_video().await?;

    for kind in SessionEventKind::ALL {
        let tx = event_tx.clone();
        session.add_listener(
            kind,
            Box::new(move |event: &SessionEvent| {
                if event.kind() != kind {
                    tracing::debug!(expected = %kind, received = %event.kind(), "dropping malformed event");
                    return;
                }
                if tx.send(event.clone()).is_err() {
                    tracing::trace!("screen loop closed. dropping {kind} event");
                }
            }),
        )?;
    }
    Ok(session)
}

async fn run(
    config: Config,
    factory: Arc<dyn SessionFactory>,
    mut cmd_rx: UnboundedReceiver<ScreenCmd>,
    notify: Arc<Notify>,
) {
    let mut state = ScreenState::new(config.channel_name());
    let mut pending = PendingTimers::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut session = match init_session(factory.as_ref(), config.app_id(), &event_tx).await {
        Ok(session) => {
            tracing::debug!("call session initialized");
            Some(session)
        }
        Err(e) => {
            let timer = state.report(Severity::Error, &e.to_string(), Instant::now());
            schedule(&mut pending, timer);
            None
        }
    };
    // listeners hold their own senders
    drop(event_tx);

    loop {
        tokio::select! {
            biased;
            _ = notify.notified() => {
                tracing::debug!("quitting screen event loop");
                break;
            }
            Some(event) = event_rx.recv() => {
                if let Some(timer) = state.handle_event(&event, Instant::now()) {
                    schedule(&mut pending, timer);
                }
            }
            Some(timer) = pending.next(), if !pending.is_empty() => {
                if let Completion::Next(next) = state.complete(timer, Instant::now()) {
                    schedule(&mut pending, next);
                }
            }
            opt = cmd_rx.recv() => {
                let cmd = match opt {
                    Some(cmd) => cmd,
                    None => {
                        tracing::debug!("screen cmd_rx channel is closed. quitting");
                        break;
                    }
                };
                match cmd {
                    ScreenCmd::StartCall { rsp } => {
                        let result = match session.as_mut() {
                            Some(session) => {
                                session
                                    .join_channel(config.app_token(), config.channel_name(), None, 0)
                                    .await
                            }
                            None => Err(Error::SessionNotInitialized),
                        };
                        if let Err(e) = &result {
                            let timer = state.report(Severity::Error, &e.to_string(), Instant::now());
                            schedule(&mut pending, timer);
                        }
                        let _ = rsp.send(result);
                    }
                    ScreenCmd::EndCall { rsp } => {
                        match session.as_mut() {
                            Some(session) => {
                                if let Err(e) = session.leave_channel().await {
                                    tracing::warn!("leave channel failed: {e}");
                                }
                            }
                            None => tracing::warn!("ending call without a session"),
                        }
                        state.end_call();
                        let _ = rsp.send(Ok(()));
                    }
                    ScreenCmd::Notify { notification } => {
                        let timer = state.notify(notification, Instant::now());
                        schedule(&mut pending, timer);
                    }
                    ScreenCmd::Dismiss => {
                        let timer = state.dismiss(Instant::now());
                        schedule(&mut pending, timer);
                    }
                    ScreenCmd::TryAgain => {
                        if !state.reset_boundary() {
                            tracing::trace!("try again without a caught fault");
                        }
                    }
                    ScreenCmd::Render { rsp } => {
                        let (view, timer) = state.render(session.as_deref(), Instant::now());
                        if let Some(timer) = timer {
                            schedule(&mut pending, timer);
                        }
                        let _ = rsp.send(view);
                    }
                    ScreenCmd::GetRoster { rsp } => {
                        let _ = rsp.send(state.roster().clone());
                    }
                    ScreenCmd::GetBanner { rsp } => {
                        let _ = rsp.send(state.notifications().view(Instant::now()));
                    }
                }
            }
        }
    }
}
