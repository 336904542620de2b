use crate::error::AppError;
use crate::middleware::guards::User;
use crate::models::{MatchFilter, ProfileData, ProfilePatch};
use crate::services::{InterestService, ProfileService};
use crate::state::AppState;
use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

/// GET /api/profiles
#[get("/profiles")]
pub async fn list_profiles(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let profiles = ProfileService::list_own(state.repo(), user.id).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

/// POST /api/profiles
#[post("/profiles")]
pub async fn create_profile(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<ProfileData>,
) -> Result<HttpResponse, AppError> {
    let profile = ProfileService::create(state.repo(), user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/profiles/my_profile
#[get("/profiles/my_profile")]
pub async fn my_profile(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let profile = ProfileService::my_profile(state.repo(), user.id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Partial update
/// POST /api/profiles/update_profile
#[post("/profiles/update_profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<ProfilePatch>,
) -> Result<HttpResponse, AppError> {
    let profile = ProfileService::update(state.repo(), user.id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// DELETE /api/profiles/delete_profile
#[delete("/profiles/delete_profile")]
pub async fn delete_profile(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    ProfileService::delete(state.repo(), user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "detail": "Profile deleted successfully" })))
}

/// GET /api/profiles/potential_matches?age_min=&age_max=&religion=&marital_status=&education=&location=
#[get("/profiles/potential_matches")]
pub async fn potential_matches(
    state: web::Data<AppState>,
    user: User,
    query: web::Query<MatchFilter>,
) -> Result<HttpResponse, AppError> {
    let matches = ProfileService::potential_matches(state.repo(), user.id, &query).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// `id` is the target identity id, not a profile id
/// POST /api/profiles/{id}/express_interest
#[post("/profiles/{id}/express_interest")]
pub async fn express_interest(
    state: web::Data<AppState>,
    user: User,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let outcome = InterestService::express(state.repo(), user.id, path.into_inner()).await?;

    if outcome.already_expressed {
        Ok(HttpResponse::Ok().json(outcome))
    } else {
        Ok(HttpResponse::Created().json(outcome))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_profiles)
        .service(create_profile)
        .service(my_profile)
        .service(update_profile)
        .service(delete_profile)
        .service(potential_matches)
        .service(express_interest);
}
