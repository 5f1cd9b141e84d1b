use axum::Router;

use slate_config::ApiConfig;

use crate::api::ResourceRouter;
use crate::modules::courses::service::CourseService;
use crate::state::AppState;

pub fn init_courses_router(config: ApiConfig) -> Router<AppState> {
    ResourceRouter::new(CourseService::new(config)).into_router()
}
