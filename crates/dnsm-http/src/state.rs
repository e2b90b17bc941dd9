use dnsm_core::Reconciler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
}

impl AppState {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
        }
    }
}
