use crate::chart_cache::ChartCache;
use crate::renderer::ChartRenderer;
use crate::store::StationStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StationStore>,
    pub chart_cache: Arc<ChartCache>,
    pub renderer: Arc<dyn ChartRenderer>,
}

impl AppState {
    pub fn new(
        store: StationStore,
        chart_cache: Arc<ChartCache>,
        renderer: Arc<dyn ChartRenderer>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            chart_cache,
            renderer,
        }
    }
}
