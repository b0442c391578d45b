//! Navigation controller.
//!
//! One context object per session. It owns the content cache and the
//! displayed path, and drives the transition sequence for every soft
//! navigation:
//!
//! ```text
//! normalize -> guard -> fade out -> cache | fetch -> delay -> swap
//!   -> push record -> title -> fade in, scroll, highlight
//! ```
//!
//! The title comes from the same primary-target document as the fragment
//! and is cached with it, so a cache hit costs no request at all.
//!
//! Any failure to obtain content hands off to a full page load. All state
//! sits in `Cell`/`RefCell` so the methods take `&self` and several
//! navigations can be in flight on one thread. Each navigation that gets
//! past the guard takes a new generation number, and after every await it
//! checks that it is still the newest; a stale navigation drops its result.

use std::cell::{Cell, Ref, RefCell};
use std::time::Duration;

use softnav_net::url::Url;
use softnav_types::backend::{Effects, Network, Platform};
use softnav_types::config::SoftnavConfig;
use softnav_types::error::{Result, SoftnavError};
use softnav_types::path::{ContentFragment, HistoryRecord, NormalizedPath, PathRules};

use crate::cache::ContentCache;
use crate::html::ContentSelector;
use crate::link::{self, LinkActivation};
use crate::pipeline::FetchPipeline;

/// How a call to [`NavigationController::navigate`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// Target already displayed (or already being navigated to).
    Unchanged,
    /// Content swapped in.
    Swapped { from_cache: bool },
    /// A newer navigation took over before this one could swap.
    Superseded,
    /// Content could not be obtained; a full page load was requested.
    Reloaded,
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Transitioning {
        target: NormalizedPath,
        generation: u64,
    },
}

/// Session-wide settings that are not part of the pipeline.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Site origin; links outside it are never intercepted.
    pub origin: Url,
    /// Fixed delay between fade-out and swap.
    pub swap_delay: Duration,
    /// Apply the target document's title on each swap.
    pub sync_title: bool,
}

impl ControllerOptions {
    pub fn from_config(config: &SoftnavConfig) -> Result<Self> {
        let origin = Url::parse(&config.site.origin)
            .ok_or_else(|| SoftnavError::Config(format!("invalid origin: {}", config.site.origin)))?;
        Ok(Self {
            origin,
            swap_delay: config.transition.swap_delay(),
            sync_title: config.transition.sync_title,
        })
    }
}

pub struct NavigationController<N, P, E> {
    pipeline: FetchPipeline<N>,
    options: ControllerOptions,
    cache: RefCell<ContentCache>,
    displayed: RefCell<NormalizedPath>,
    state: RefCell<NavState>,
    generation: Cell<u64>,
    platform: RefCell<P>,
    effects: RefCell<E>,
}

impl<N: Network, P: Platform, E: Effects> NavigationController<N, P, E> {
    /// Take over a natively loaded page.
    ///
    /// `initial` is the content region the page was rendered with. It is
    /// cached under the normalized current address together with the title
    /// the page is showing, and the current
    /// traversal entry is stamped with its record so that returning to it
    /// later is a soft navigation too.
    pub fn new(
        pipeline: FetchPipeline<N>,
        options: ControllerOptions,
        mut platform: P,
        mut effects: E,
        initial: ContentFragment,
    ) -> Self {
        let displayed = pipeline.rules().normalize(&platform.current_address());
        let title = platform.title();
        let mut cache = ContentCache::new();
        cache.put(displayed.clone(), initial, (!title.is_empty()).then_some(title));
        platform.replace_record(&HistoryRecord::new(displayed.clone()));
        effects.highlight_active(&displayed);
        log::info!("soft navigation active at {displayed}");

        Self {
            pipeline,
            options,
            cache: RefCell::new(cache),
            displayed: RefCell::new(displayed),
            state: RefCell::new(NavState::Idle),
            generation: Cell::new(0),
            platform: RefCell::new(platform),
            effects: RefCell::new(effects),
        }
    }

    /// Build the pipeline and options from `config`.
    pub fn from_config(
        network: N,
        config: &SoftnavConfig,
        platform: P,
        effects: E,
        initial: ContentFragment,
    ) -> Result<Self> {
        let selector = ContentSelector::parse(&config.content.selector)?;
        let pipeline = FetchPipeline::new(network, config.paths.clone(), selector);
        let options = ControllerOptions::from_config(config)?;
        Ok(Self::new(pipeline, options, platform, effects, initial))
    }

    // -- Inbound events ----------------------------------------------------

    /// A link was activated. `None` means it is not a soft navigation and
    /// the host keeps its default behaviour.
    pub async fn on_link_activate(&self, link: &LinkActivation) -> Option<NavOutcome> {
        let target = {
            let displayed = self.displayed.borrow();
            link::classify_link(&self.options.origin, &displayed, self.rules(), link)
        };
        match target {
            Some(path) => Some(self.navigate(path.as_str(), true).await),
            None => {
                log::debug!("not intercepted: {}", link.href);
                None
            },
        }
    }

    /// Back/forward traversal landed on an entry carrying `record`.
    pub async fn on_traversal(&self, record: Option<HistoryRecord>) -> NavOutcome {
        match record {
            Some(record) => self.navigate(record.path.as_str(), false).await,
            None => {
                let address = self.platform.borrow().current_address();
                log::warn!("untracked history entry at {address}, reloading");
                self.supersede_in_flight();
                self.platform.borrow_mut().reload(None);
                NavOutcome::Reloaded
            },
        }
    }

    /// Like [`on_traversal`](Self::on_traversal), from the raw state
    /// payload stored with the entry.
    pub async fn on_traversal_state(&self, state: Option<&str>) -> NavOutcome {
        self.on_traversal(state.and_then(HistoryRecord::from_state)).await
    }

    // -- Navigation --------------------------------------------------------

    /// Show the page at `raw`, softly if at all possible.
    pub async fn navigate(&self, raw: &str, record_history: bool) -> NavOutcome {
        let path = self.rules().normalize(raw);

        let in_flight = self.in_flight_target();
        if in_flight.as_ref() == Some(&path) {
            log::debug!("already navigating to {path}");
            return NavOutcome::Unchanged;
        }
        if *self.displayed.borrow() == path {
            if in_flight.is_some() {
                // Back to where we are: drop the pending transition.
                log::debug!("navigation back to displayed {path} cancels pending one");
                self.supersede_in_flight();
                self.effects.borrow_mut().fade_in();
            }
            return NavOutcome::Unchanged;
        }

        let generation = self.begin(&path);
        self.effects.borrow_mut().fade_out();

        let cached = {
            let cache = self.cache.borrow();
            cache
                .get(&path)
                .map(|fragment| (fragment.clone(), cache.title(&path).map(str::to_string)))
        };
        let (fragment, title, from_cache) = match cached {
            Some((fragment, title)) => {
                log::debug!("cache hit {path}");
                (fragment, title, true)
            },
            None => {
                log::debug!("cache miss {path}");
                match self.pipeline.fetch_page(&path).await {
                    Ok(page) => {
                        let title = page.primary_title().map(str::to_string);
                        if title.is_none() {
                            log::debug!("no primary-target title for {path}");
                        }
                        self.cache
                            .borrow_mut()
                            .put(path.clone(), page.fragment.clone(), title.clone());
                        (page.fragment, title, false)
                    },
                    Err(e) => {
                        if !self.is_current(generation) {
                            log::debug!("superseded navigation to {path} failed: {e}");
                            return NavOutcome::Superseded;
                        }
                        log::warn!("cannot load {path} softly ({e}), reloading");
                        self.finish();
                        self.platform.borrow_mut().reload(Some(&path));
                        return NavOutcome::Reloaded;
                    },
                }
            },
        };

        if !self.is_current(generation) {
            log::debug!("navigation to {path} superseded");
            return NavOutcome::Superseded;
        }
        tokio::time::sleep(self.options.swap_delay).await;
        if !self.is_current(generation) {
            log::debug!("navigation to {path} superseded");
            return NavOutcome::Superseded;
        }

        {
            let mut platform = self.platform.borrow_mut();
            platform.swap_content(&fragment);
            if record_history {
                platform.push_record(&HistoryRecord::new(path.clone()));
            }
            // Best effort: without a title the current one stays.
            if self.options.sync_title
                && let Some(title) = &title
            {
                platform.set_title(title);
            }
        }
        *self.displayed.borrow_mut() = path.clone();
        self.finish();

        {
            let mut effects = self.effects.borrow_mut();
            effects.fade_in();
            effects.scroll_to_top();
            effects.highlight_active(&path);
        }
        log::info!("navigated to {path}");
        NavOutcome::Swapped { from_cache }
    }

    // -- Generation bookkeeping --------------------------------------------

    fn begin(&self, target: &NormalizedPath) -> u64 {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        *self.state.borrow_mut() = NavState::Transitioning {
            target: target.clone(),
            generation,
        };
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    fn finish(&self) {
        *self.state.borrow_mut() = NavState::Idle;
    }

    fn supersede_in_flight(&self) {
        self.generation.set(self.generation.get() + 1);
        self.finish();
    }

    fn in_flight_target(&self) -> Option<NormalizedPath> {
        match &*self.state.borrow() {
            NavState::Transitioning { target, .. } => Some(target.clone()),
            NavState::Idle => None,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn rules(&self) -> &PathRules {
        self.pipeline.rules()
    }

    pub fn state(&self) -> NavState {
        self.state.borrow().clone()
    }

    pub fn displayed(&self) -> NormalizedPath {
        self.displayed.borrow().clone()
    }

    pub fn origin(&self) -> &Url {
        &self.options.origin
    }

    pub fn cache(&self) -> Ref<'_, ContentCache> {
        self.cache.borrow()
    }

    pub fn pipeline(&self) -> &FetchPipeline<N> {
        &self.pipeline
    }

    pub fn platform(&self) -> Ref<'_, P> {
        self.platform.borrow()
    }

    /// Run `f` with the platform. Not for use while a navigation is
    /// applying changes (the controller never holds it across an await).
    pub fn with_platform<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut self.platform.borrow_mut())
    }

    /// Whether a navigation link to `href` should be styled active.
    pub fn is_active_link(&self, href: &str) -> bool {
        link::is_active_link(&self.options.origin, &self.displayed.borrow(), self.rules(), href)
    }
}
