use actix_web::web;

use irshad::offered::{JsonFileSource, OfferingCache};
use irshad::{AppState, excel, run_server};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let bind = std::env::var("IRSHAD_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
    let plan_path =
        std::env::var("IRSHAD_PLAN_PATH").unwrap_or_else(|_| "subjects+Notes.xlsx".to_string());
    let offering_path =
        std::env::var("IRSHAD_OFFERING_PATH").unwrap_or_else(|_| "offered.json".to_string());

    let plan = excel::load_plan_or_fallback(&plan_path);
    tracing::info!(courses = plan.len(), path = %plan_path, "study plan loaded");

    let offerings = OfferingCache::new(Box::new(JsonFileSource::new(&offering_path)));
    let state = web::Data::new(AppState::new(plan, plan_path, offerings));

    tracing::info!(%bind, "starting recommendation server");
    run_server(&bind, state).await
}
