pub mod flat;
pub mod route;
pub mod types;

pub use flat::{run_categorize, run_sanitize};
pub use route::run_route;
pub use types::{
    CategorizePipelineConfig, PipelinesConfig, RoutePipelineConfig, RunReport,
    SanitizePipelineConfig,
};
