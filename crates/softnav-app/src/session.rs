//! A browsing session: native loads plus the soft navigation layered on top.

use softnav_core::{
    ContentSelector, ControllerOptions, FetchPipeline, LinkActivation, NavOutcome,
    NavigationController, SessionHistory,
};
use softnav_types::backend::{Network, Platform};
use softnav_types::config::SoftnavConfig;
use softnav_types::error::Result;
use softnav_types::path::NormalizedPath;

use crate::commands::{Command, HELP};
use crate::headless::{HeadlessPlatform, LoggingEffects, ReloadRequest};

pub type Controller<N> = NavigationController<N, HeadlessPlatform, LoggingEffects>;

/// Whether the driver loop should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<N> {
    network: N,
    config: SoftnavConfig,
    controller: Controller<N>,
}

impl<N: Network + Clone> Session<N> {
    /// Natively load the configured start path.
    pub async fn boot(network: N, config: SoftnavConfig) -> Result<Self> {
        let history = SessionHistory::with_initial(&config.site.start_path);
        let controller = Self::load(network.clone(), &config, history).await?;
        Ok(Self {
            network,
            config,
            controller,
        })
    }

    /// Full page load of the current entry in `history`, the way a browser
    /// does it: fetch the whole document, render it, then hand it to a new
    /// controller.
    async fn load(
        network: N,
        config: &SoftnavConfig,
        history: SessionHistory,
    ) -> Result<Controller<N>> {
        let selector = ContentSelector::parse(&config.content.selector)?;
        let pipeline = FetchPipeline::new(network, config.paths.clone(), selector);
        let address = history.current_address().unwrap_or("/").to_string();
        let page = pipeline.fetch_page(&config.paths.normalize(&address)).await?;
        log::info!("loaded {address}");

        let mut platform = HeadlessPlatform::new(history, page.title.as_deref().unwrap_or(""));
        platform.swap_content(&page.fragment);
        let options = ControllerOptions::from_config(config)?;
        Ok(NavigationController::new(
            pipeline,
            options,
            platform,
            LoggingEffects,
            page.fragment,
        ))
    }

    pub fn controller(&self) -> &Controller<N> {
        &self.controller
    }

    /// Carry out a full page load the controller asked for. On failure the
    /// current session is left as it was.
    pub async fn apply_reload(&mut self, request: ReloadRequest) -> Result<()> {
        let mut history = self.controller.platform().history().clone();
        if let ReloadRequest::Navigate(path) = &request {
            history.push(path.as_str(), None);
        }
        log::info!("full page load: {request:?}");
        self.controller = Self::load(self.network.clone(), &self.config, history).await?;
        Ok(())
    }

    /// Run one command and any full load it triggers.
    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Open(href) => {
                match self.controller.on_link_activate(&LinkActivation::new(&href)).await {
                    Some(outcome) => report(outcome),
                    None => println!("not a soft navigation: {href}"),
                }
            },
            Command::Back => match self.controller.with_platform(HeadlessPlatform::back) {
                Some(state) => {
                    report(self.controller.on_traversal_state(state.as_deref()).await);
                },
                None => println!("no previous page"),
            },
            Command::Forward => match self.controller.with_platform(HeadlessPlatform::forward) {
                Some(state) => {
                    report(self.controller.on_traversal_state(state.as_deref()).await);
                },
                None => println!("no next page"),
            },
            Command::Show => self.show(),
            Command::History => self.print_history(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown(line) => println!("unknown command: {line} (try `help`)"),
        }

        if let Some(request) = self.controller.with_platform(HeadlessPlatform::take_reload) {
            self.apply_reload(request).await?;
            self.show();
        }
        Ok(Flow::Continue)
    }

    fn show(&self) {
        let platform = self.controller.platform();
        println!("displayed: {}", self.controller.displayed());
        println!("address:   {}", platform.current_address());
        println!("title:     {}", platform.title());
        let cache = self.controller.cache();
        let paths: Vec<&str> = cache.paths().into_iter().map(NormalizedPath::as_str).collect();
        println!("cached:    {} page(s) {}", cache.len(), paths.join(" "));
        println!("content:   {} bytes", platform.content().len());
    }

    fn print_history(&self) {
        let platform = self.controller.platform();
        for (i, entry) in platform.history().entries().iter().enumerate() {
            let marker = if i == 0 { '*' } else { ' ' };
            println!("{marker} {:<24} {}", entry.address, entry.title);
        }
    }
}

fn report(outcome: NavOutcome) {
    match outcome {
        NavOutcome::Unchanged => println!("already there"),
        NavOutcome::Swapped { from_cache: true } => println!("swapped (cached)"),
        NavOutcome::Swapped { from_cache: false } => println!("swapped"),
        NavOutcome::Superseded => println!("superseded"),
        NavOutcome::Reloaded => println!("full page load"),
    }
}
