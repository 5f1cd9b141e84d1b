use axum::Router;

use slate_config::ApiConfig;

use crate::api::ResourceRouter;
use crate::modules::students::service::StudentService;
use crate::state::AppState;

pub fn init_students_router(config: ApiConfig) -> Router<AppState> {
    ResourceRouter::new(StudentService::new(config)).into_router()
}
