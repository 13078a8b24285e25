use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/plugins", plugin_routes())
        .nest("/pushers", pusher_routes())
}

fn plugin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::plugin::list_plugins))
        .routes(routes!(handlers::plugin::get_plugin))
}

fn pusher_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::pusher::list_pushers))
        .routes(routes!(handlers::pusher::get_pusher))
}
