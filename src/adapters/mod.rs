//! External signal sources consumed by the engines.
//!
//! Every source sits behind an async trait so the engines can be wired to
//! the HTTP signals service, to `NullSignals`, or to fakes in tests.

pub mod guard;
mod http;
mod models;
mod null;
mod provider;

pub use http::HttpSignalsClient;
pub use models::*;
pub use null::NullSignals;
pub use provider::{
    AdapterError, AdapterResult, CampaignAdapter, CreativeProfileAdapter, GraphAdapter,
    ProfileService, PulseService,
};

use std::sync::Arc;

/// The full set of signal sources handed to the engines.
#[derive(Clone)]
pub struct SignalAdapters {
    pub graph: Arc<dyn GraphAdapter>,
    pub campaigns: Arc<dyn CampaignAdapter>,
    pub creative: Arc<dyn CreativeProfileAdapter>,
    pub profiles: Arc<dyn ProfileService>,
    pub pulse: Arc<dyn PulseService>,
}

impl SignalAdapters {
    /// Use one source for every signal.
    pub fn from_single<S>(source: Arc<S>) -> Self
    where
        S: GraphAdapter
            + CampaignAdapter
            + CreativeProfileAdapter
            + ProfileService
            + PulseService
            + 'static,
    {
        Self {
            graph: source.clone(),
            campaigns: source.clone(),
            creative: source.clone(),
            profiles: source.clone(),
            pulse: source,
        }
    }

    pub fn unavailable() -> Self {
        Self::from_single(Arc::new(NullSignals))
    }
}
