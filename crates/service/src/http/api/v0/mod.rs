use axum::Router;

pub mod pipelines;

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .nest("/pipelines", pipelines::router(state.clone()))
        .with_state(state)
}
