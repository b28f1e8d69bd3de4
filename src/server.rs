use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use serde_json::json;

use crate::api_json::{CourseRow, RecommendRequest, RecommendResponse, RejectedCourse};
use crate::engine::{self, RequestContext, constraints};
use crate::excel;
use crate::matching::map_offered_to_plan;
use crate::models::{OfferedCourse, Offering, Plan, Section};
use crate::offered::{COURSE_BULLETIN_URL, OfferingCache};

pub struct AppState {
    plan: RwLock<Arc<Plan>>,
    plan_path: String,
    offerings: OfferingCache,
}

impl AppState {
    pub fn new(plan: Plan, plan_path: String, offerings: OfferingCache) -> Self {
        AppState {
            plan: RwLock::new(Arc::new(plan)),
            plan_path,
            offerings,
        }
    }

    fn plan_snapshot(&self) -> Arc<Plan> {
        self.plan
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Offering synthesized from the plan alone: every plan course is assumed
/// offered through a single untimed section, so the planners still enforce
/// prerequisites, floors and ceilings without any meeting-time data.
fn plan_only_offering(plan: &Plan) -> Offering {
    plan.iter()
        .map(|(name, course)| {
            (
                name.clone(),
                OfferedCourse {
                    code: None,
                    hours: course.hours,
                    sections: vec![Section {
                        instructor: String::new(),
                        status: String::new(),
                        times: vec![],
                    }],
                },
            )
        })
        .collect()
}

fn course_rows(rec: &engine::Recommendation, ctx: &RequestContext) -> Vec<CourseRow> {
    rec.courses
        .iter()
        .map(|name| {
            let offered = ctx.offered.get(name);
            let assigned = rec.assignment.as_ref().and_then(|a| a.get(name));
            CourseRow {
                code: offered.and_then(|c| c.code.clone()),
                name: name.clone(),
                hours: ctx.effective_hours(name),
                time: assigned
                    .map(|s| s.times.join(" | "))
                    .unwrap_or_default(),
                instructor: assigned.map(|s| s.instructor.clone()).unwrap_or_default(),
                category: ctx
                    .plan
                    .get(name)
                    .and_then(|c| c.category)
                    .map(|c| c.as_str().to_string()),
            }
        })
        .collect()
}

/// POST /api/recommend
async fn recommend_handler(
    state: web::Data<AppState>,
    body: web::Json<RecommendRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let max_hours = req.clamped_max_hours();
    let plan = state.plan_snapshot();

    let mut live_snapshot_empty = false;
    let offered: Offering = if req.use_offered {
        let scraped = state.offerings.snapshot(req.refresh_offered);
        live_snapshot_empty = scraped.is_empty();
        map_offered_to_plan(&scraped, &plan)
    } else {
        plan_only_offering(&plan)
    };

    let ctx = RequestContext::new(plan, offered, &req.taken_codes, max_hours);
    let mut rng = rand::rng();
    let rec = engine::recommend(&ctx, &mut rng);

    if rec.is_empty() {
        let rejected: Vec<RejectedCourse> = constraints::rejection_report(&ctx)
            .into_iter()
            .map(|(code, reason)| RejectedCourse { code, reason })
            .collect();
        return HttpResponse::Ok().json(RecommendResponse {
            ok: false,
            total_hours: 0,
            courses: vec![],
            conflicts: vec![],
            message: Some("لا توجد مواد يمكن التوصية بها ضمن القيود الحالية".to_string()),
            rejected,
            redirect_url: Some(COURSE_BULLETIN_URL.to_string()),
            can_refresh: if req.use_offered && live_snapshot_empty {
                Some(true)
            } else {
                None
            },
        });
    }

    tracing::info!(
        planner = ?rec.planner,
        courses = rec.courses.len(),
        total_hours = rec.total_hours,
        "recommendation produced"
    );

    let courses = course_rows(&rec, &ctx);
    HttpResponse::Ok().json(RecommendResponse {
        ok: true,
        total_hours: rec.total_hours,
        courses,
        conflicts: vec![],
        message: None,
        rejected: vec![],
        redirect_url: None,
        can_refresh: None,
    })
}

/// GET /api/plan — the loaded study plan. `?reload=1` re-reads the workbook
/// first and swaps the shared plan on success.
async fn plan_handler(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let reload = query.get("reload").map(|v| v == "1").unwrap_or(false);
    if reload {
        match excel::load_plan(&state.plan_path) {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                *state.plan.write().unwrap_or_else(PoisonError::into_inner) = fresh;
                tracing::info!(path = %state.plan_path, "plan workbook reloaded");
            }
            Err(e) => {
                return HttpResponse::InternalServerError()
                    .json(json!({"error": format!("failed to reload plan: {}", e)}));
            }
        }
    }
    let plan = state.plan_snapshot();
    HttpResponse::Ok().json(&*plan)
}

/// GET /help
async fn help_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "description": "واجهة التوصية بمواد الفصل القادم. POST /api/recommend يستقبل المواد المنجزة وسقف الساعات ويعيد جدولاً مقترحاً.",
        "post_example": {
            "taken_codes": ["برمجة 1", "التربية الوطنية"],
            "max_hours": 15,
            "use_offered": true,
            "refresh_offered": false
        },
        "endpoints": {
            "POST /api/recommend": "توصية بمواد الفصل القادم",
            "GET /api/plan": "الخطة الدراسية المحملة (أضف ?reload=1 لإعادة قراءة الملف)",
            "GET /help": "هذه الصفحة"
        },
        "bulletin": COURSE_BULLETIN_URL
    }))
}

pub async fn run_server(bind_addr: &str, state: web::Data<AppState>) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .route("/api/recommend", web::post().to(recommend_handler))
            .route("/api/plan", web::get().to(plan_handler))
            .route("/help", web::get().to(help_handler))
    })
    .bind(bind_addr)?
    .run()
    .await
}
