use repochat::{ChatStore, Rag};
use std::sync::Arc;

#[derive(Clone)]
pub struct State {
    pub rag: Arc<Rag>,
    pub store: Arc<ChatStore>,
}

#[allow(clippy::module_name_repetitions)]
pub type AppState = Arc<State>;

pub fn create(rag: Rag, store: ChatStore) -> AppState {
    Arc::new(State {
        rag: Arc::new(rag),
        store: Arc::new(store),
    })
}
