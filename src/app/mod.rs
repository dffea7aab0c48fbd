//! Host loop
//!
//! Drives a [`SessionEngine`] against a line-oriented input stream and a
//! text output stream. The loop owns every timer the engine asks for:
//!
//! - **Feed ticks:** one engine tick per `feed.line_delay_ms` while typing
//! - **Status fetches:** spawned through [`async_ops`], results arrive on a channel
//! - **Reload:** after an eject/reboot, the engine is replaced with a fresh one
//!
//! Input is only read while the engine accepts it, so lines typed during the
//! boot banner wait in the stream until the prompt appears. Input bytes that
//! are not valid UTF-8 are replaced rather than ending the session.

pub mod async_ops;
pub mod render;

use std::borrow::Cow;
use std::io::Write;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{Effect, SessionEngine};
use crate::error::{Error, Result};
use crate::persistence::{FileSessionStore, SessionStore};
use crate::status::{HttpStatusProvider, StatusProvider};

use async_ops::{Poller, StatusUpdate};
use render::TerminalRenderer;

/// Shortest feed tick the host will schedule
const MIN_LINE_DELAY: Duration = Duration::from_millis(1);

/// The interactive application
pub struct App {
    config: Config,
    store: Arc<dyn SessionStore>,
    provider: Arc<dyn StatusProvider>,
}

impl App {
    pub fn new(
        config: Config,
        store: Arc<dyn SessionStore>,
        provider: Arc<dyn StatusProvider>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
        }
    }

    /// App with the marker-file store and HTTP status provider
    pub fn from_config(config: Config) -> Result<Self> {
        let store = match &config.session.state_file {
            Some(path) => FileSessionStore::new(path.clone()),
            None => FileSessionStore::at_default_location(),
        };
        debug!("Session marker at {}", store.path().display());

        let store = Arc::new(store);
        let provider = Arc::new(HttpStatusProvider::from_config(&config.status)?);
        Ok(Self::new(config, store, provider))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run against the process's stdin and stdout
    pub async fn run_stdio(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = std::io::stdout();
        self.run(stdin, stdout.lock()).await
    }

    /// Run until `input` reaches end-of-file
    pub async fn run<R, W>(&self, input: R, output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.split(b'\n');
        let mut renderer = TerminalRenderer::new(output);

        let mut engine = self.boot_engine()?;
        let (mut status_tx, mut status_rx) = mpsc::unbounded_channel::<StatusUpdate>();
        let mut poller = Poller::new();
        let mut reload: Option<Pin<Box<Sleep>>> = None;

        let mut feed_ticks = time::interval(self.config.feed.line_delay().max(MIN_LINE_DELAY));
        feed_ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        renderer.render(engine.transcript())?;

        loop {
            tokio::select! {
                segment = lines.next_segment(), if !engine.is_input_suspended() => {
                    let Some(bytes) = segment? else {
                        info!("Input closed, exiting");
                        break;
                    };
                    let line = decode_line(&bytes);
                    match engine.submit(&line) {
                        Ok(effects) => {
                            self.apply_effects(effects, &mut poller, &mut reload, &status_tx);
                        }
                        Err(Error::InputSuspended) => debug!("Input dropped while suspended"),
                        Err(e) => return Err(e),
                    }
                }
                _ = feed_ticks.tick(), if engine.is_typing() => {
                    let effects = engine.tick();
                    self.apply_effects(effects, &mut poller, &mut reload, &status_tx);
                }
                Some(update) = status_rx.recv() => {
                    engine.apply_status(update.epoch, update.kind, update.result);
                }
                _ = wait_for(&mut reload), if reload.is_some() => {
                    info!("Reloading session");
                    reload = None;
                    poller.stop();

                    // Results still in flight belong to the discarded engine
                    let (tx, rx) = mpsc::unbounded_channel();
                    status_tx = tx;
                    status_rx = rx;

                    engine = self.boot_engine()?;
                    feed_ticks.reset();
                    renderer.reset()?;
                }
            }

            renderer.render(engine.transcript())?;
        }

        poller.stop();
        Ok(())
    }

    fn boot_engine(&self) -> Result<SessionEngine> {
        let engine = SessionEngine::new(self.config.clone(), Arc::clone(&self.store))?;
        debug!("Booted {:?}", engine);
        Ok(engine)
    }

    fn apply_effects(
        &self,
        effects: Vec<Effect>,
        poller: &mut Poller,
        reload: &mut Option<Pin<Box<Sleep>>>,
        status_tx: &mpsc::UnboundedSender<StatusUpdate>,
    ) {
        for effect in effects {
            debug!("Applying {:?}", effect);
            match effect {
                Effect::RefreshStatus { epoch } => {
                    async_ops::spawn_fetch(Arc::clone(&self.provider), status_tx.clone(), epoch);
                }
                Effect::StartPolling { epoch, every } => {
                    poller.start(Arc::clone(&self.provider), status_tx.clone(), epoch, every);
                }
                Effect::StopPolling => poller.stop(),
                Effect::Reload { after } => {
                    if reload.is_some() {
                        warn!("Reload already scheduled");
                        continue;
                    }
                    *reload = Some(Box::pin(time::sleep(after)));
                }
            }
        }
    }
}

/// Decode one input line, dropping a trailing `\r`
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            warn!("Replaced invalid UTF-8 in input line");
            line
        }
    }
}

async fn wait_for(sleep: &mut Option<Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
