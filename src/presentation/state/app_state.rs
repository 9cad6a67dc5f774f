use std::sync::Arc;

use crate::application::ports::InferenceClient;
use crate::application::services::ChatService;
use crate::presentation::config::Settings;

pub struct AppState<I>
where
    I: InferenceClient,
{
    pub chat_service: Arc<ChatService<I>>,
    pub settings: Arc<Settings>,
}

impl<I> AppState<I>
where
    I: InferenceClient,
{
    pub fn new(chat_service: Arc<ChatService<I>>, settings: Settings) -> Self {
        Self {
            chat_service,
            settings: Arc::new(settings),
        }
    }
}

impl<I> Clone for AppState<I>
where
    I: InferenceClient,
{
    fn clone(&self) -> Self {
        Self {
            chat_service: Arc::clone(&self.chat_service),
            settings: Arc::clone(&self.settings),
        }
    }
}
