//! Browser Services
//!
//! Wires the stores to the browser: timer-backed clock, localStorage for
//! preferences and the session, build-time backend configuration and the
//! realtime task feed.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gloo_timers::callback::Interval;
use workdesk_store::{
    AuthProvider, Clock, ConfigError, LayoutPreferences, NoteStore, PreferenceError, PreferenceStorage, ProcessStore,
    RestGateway, Session, StaticAuth, StoreConfig, StoreDeps, TableGateway, TaskStore, TtlCache,
};

use crate::realtime;

/// localStorage key holding the signed-in session
const SESSION_KEY: &str = "workdesk-session";

/// Wall clock with real (timer-backed) sleeps
pub struct BrowserClock;

#[async_trait(?Send)]
impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

/// Today's date in the user's timezone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `window.localStorage`
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage, PreferenceError> {
        web_sys::window()
            .ok_or_else(|| PreferenceError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| PreferenceError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| PreferenceError::Unavailable("localStorage disabled".into()))
    }
}

impl PreferenceStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Self::storage()?.get_item(key).map_err(|e| PreferenceError::Read {
            key: key.to_string(),
            message: format!("{:?}", e),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        Self::storage()?.set_item(key, value).map_err(|e| PreferenceError::Write {
            key: key.to_string(),
            message: format!("{:?}", e),
        })
    }
}

/// Session left in storage by the sign-in flow, if any
pub fn load_session() -> Option<Session> {
    let raw = match BrowserStorage.get_item(SESSION_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            log::warn!("Error reading session: {}", e);
            return None;
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| log::warn!("Ignoring malformed session: {}", e))
        .ok()
}

/// Backend settings baked in at build time
pub fn load_config() -> Result<StoreConfig, ConfigError> {
    let config = StoreConfig::new(
        option_env!("WORKDESK_API_URL").unwrap_or_default(),
        option_env!("WORKDESK_ANON_KEY").unwrap_or_default(),
    );
    config.validate()?;
    Ok(config)
}

/// Everything the pages talk to, built once per app
pub struct Services {
    pub tasks: Rc<TaskStore>,
    pub notes: Rc<NoteStore>,
    pub processes: Rc<ProcessStore>,
    pub prefs: LayoutPreferences,
    pub signed_in: bool,
}

pub fn connect() -> Result<Services, ConfigError> {
    let config = load_config()?;
    let session = load_session();
    let signed_in = session.is_some();
    let auth: Rc<dyn AuthProvider> = match session {
        Some(session) => Rc::new(session),
        None => Rc::new(StaticAuth::signed_out()),
    };
    let clock: Rc<dyn Clock> = Rc::new(BrowserClock);
    let gateway: Rc<dyn TableGateway> = Rc::new(RestGateway::new(&config, auth.clone()));
    let cache = Rc::new(TtlCache::with_default_ttl(clock.clone(), config.cache_ttl()));

    // periodic purge of expired entries
    let sweep = cache.clone();
    let interval_ms = config.cleanup_interval().as_millis().min(u32::MAX as u128) as u32;
    Interval::new(interval_ms, move || sweep.cleanup()).forget();

    let owner = auth.current_user();
    let access_token = auth.access_token();
    let feed_config = config.clone();
    let deps = StoreDeps {
        gateway,
        auth,
        cache,
        clock,
        config,
    };
    let tasks = Rc::new(TaskStore::new(deps.clone()));
    if let Some(owner) = owner {
        if let Err(e) = realtime::subscribe_tasks(&feed_config, &owner, access_token, tasks.clone()) {
            log::warn!("realtime updates unavailable: {:?}", e);
        }
    }
    log::info!("services ready (signed in: {})", signed_in);
    Ok(Services {
        tasks,
        notes: Rc::new(NoteStore::new(deps.clone())),
        processes: Rc::new(ProcessStore::new(deps)),
        prefs: LayoutPreferences::new(Rc::new(BrowserStorage)),
        signed_in,
    })
}
