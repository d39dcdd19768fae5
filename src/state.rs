use crate::services::coach::CoachService;
use crate::store::PlanStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub coach: Arc<CoachService>,
    pub plans: PlanStore,
    pub session_key: Vec<u8>,
}

pub type SharedState = Arc<AppState>;
