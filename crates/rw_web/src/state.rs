use std::sync::Arc;

use rw_inference::GenerationModel;

use crate::form::FormController;

pub struct AppState {
    pub controller: Arc<FormController>,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self {
            controller: Arc::new(FormController::new(model)),
        }
    }
}
