//! # Listing Routes
//!
//! Public catalog reads and seller-gated listing writes.
//!
//! ## Filter Degradation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   GET /listings?category=land&min_price=banana                          │
//! │                                                                         │
//! │   category=land     ──► parsed    ──► applied                           │
//! │   min_price=banana  ──► malformed ──► DROPPED + flash "filter ignored"  │
//! │                                                                         │
//! │   The page always renders with whatever filters survived. A broken     │
//! │   filter is never a 400.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use souk_core::money::Money;
use souk_core::{validation, Listing, ListingCategory, ListingType, Role, MAX_IMAGE_BYTES};
use souk_db::ListingFilter;

use crate::error::{WebError, WebResult};
use crate::routes::{flash_redirect, profile_or_gap, require_login};
use crate::session::{Flash, SessionId};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/listings", get(catalog).post(create_listing))
        .route("/listings/:id", get(listing_detail))
        .route("/listings/:id/edit", post(edit_listing))
        .route("/listings/:id/delete", post(delete_listing))
}

// =============================================================================
// Enum Parsing
// =============================================================================

fn parse_category(s: &str) -> Option<ListingCategory> {
    match s {
        "land" => Some(ListingCategory::Land),
        "house_sale" => Some(ListingCategory::HouseSale),
        "house_rent" => Some(ListingCategory::HouseRent),
        _ => None,
    }
}

fn parse_listing_type(s: &str) -> Option<ListingType> {
    match s {
        "sale" => Some(ListingType::Sale),
        "rent" => Some(ListingType::Rent),
        _ => None,
    }
}

// =============================================================================
// Catalog Reads
// =============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub listing_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Builds the typed filter, dropping malformed dimensions.
///
/// Returns the filter plus one flash per ignored dimension.
fn degrade_filter(query: &CatalogQuery) -> (ListingFilter, Vec<Flash>) {
    let mut filter = ListingFilter::default();
    let mut flashes = Vec::new();

    if let Some(raw) = query.category.as_deref().filter(|s| !s.is_empty()) {
        match parse_category(raw) {
            Some(c) => filter.category = Some(c),
            None => flashes.push(Flash::info("Ignored an invalid category filter")),
        }
    }
    if let Some(raw) = query.listing_type.as_deref().filter(|s| !s.is_empty()) {
        match parse_listing_type(raw) {
            Some(t) => filter.listing_type = Some(t),
            None => flashes.push(Flash::info("Ignored an invalid type filter")),
        }
    }
    if let Some(raw) = query.min_price.as_deref().filter(|s| !s.is_empty()) {
        match Money::parse_decimal(raw) {
            Ok(m) => filter.min_price_cents = Some(m.cents()),
            Err(_) => flashes.push(Flash::info("Ignored an invalid minimum price filter")),
        }
    }
    if let Some(raw) = query.max_price.as_deref().filter(|s| !s.is_empty()) {
        match Money::parse_decimal(raw) {
            Ok(m) => filter.max_price_cents = Some(m.cents()),
            Err(_) => flashes.push(Flash::info("Ignored an invalid maximum price filter")),
        }
    }

    (filter, flashes)
}

/// GET /listings
async fn catalog(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Query(query): Query<CatalogQuery>,
) -> WebResult<Json<serde_json::Value>> {
    let (filter, degradations) = degrade_filter(&query);
    for flash in degradations {
        state.sessions.push_flash(&sid.0, flash);
    }

    let listings = state.db.listings().list_active(&filter).await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(Json(json!({
        "listings": listings,
        "flashes": flashes,
    })))
}

/// GET /listings/:id
///
/// Inactive listings 404 here: soft-deleted is indistinguishable from
/// never-existed to the catalog.
async fn listing_detail(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
) -> WebResult<Json<serde_json::Value>> {
    let listing = state
        .db
        .listings()
        .get_active(&id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("listing {id}")))?;

    let images = state.db.listings().images_for(&id).await?;
    let comments = state.db.comments().list_for_listing(&id).await?;
    let average_rating = state.db.comments().average_rating(&id).await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(Json(json!({
        "listing": listing,
        "images": images,
        "comments": comments,
        "average_rating": average_rating,
        "flashes": flashes,
    })))
}

// =============================================================================
// Seller Writes
// =============================================================================

/// The text fields of the listing form, collected from multipart parts.
#[derive(Debug, Default)]
struct ListingFormFields {
    title: String,
    description: String,
    price: String,
    category: String,
    listing_type: String,
}

impl ListingFormFields {
    /// Validates and converts into the typed pieces of a listing.
    fn validated(
        &self,
    ) -> Result<(String, String, i64, ListingCategory, ListingType), String> {
        let title = validation::validate_title(&self.title).map_err(|e| e.to_string())?;
        let description =
            validation::validate_description(&self.description).map_err(|e| e.to_string())?;
        let price = validation::parse_price_input("price", &self.price)
            .map_err(|e| e.to_string())?
            .cents();
        let category =
            parse_category(&self.category).ok_or_else(|| "category is invalid".to_string())?;
        let listing_type = parse_listing_type(&self.listing_type)
            .ok_or_else(|| "listing type is invalid".to_string())?;
        Ok((title, description, price, category, listing_type))
    }
}

/// POST /listings (multipart: text fields + zero or more `images` files)
async fn create_listing(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    mut multipart: Multipart,
) -> Response {
    let (user, profile) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };
    let profile = match profile_or_gap(&user, profile) {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = souk_core::access::require_role(&user.id, Some(&profile), Role::Seller) {
        return flash_redirect(&state, &sid, Flash::error(e.to_string()), "/listings");
    }

    // Drain the multipart body into fields + image payloads
    let mut fields = ListingFormFields::default();
    let mut images: Vec<(String, Bytes)> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return WebError::BadRequest(format!("malformed upload: {e}")).into_response(),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" | "description" | "price" | "category" | "listing_type" => {
                let value = match field.text().await {
                    Ok(v) => v,
                    Err(e) => {
                        return WebError::BadRequest(format!("malformed field {name}: {e}"))
                            .into_response()
                    }
                };
                match name.as_str() {
                    "title" => fields.title = value,
                    "description" => fields.description = value,
                    "price" => fields.price = value,
                    "category" => fields.category = value,
                    _ => fields.listing_type = value,
                }
            }
            "images" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let data = match field.bytes().await {
                    Ok(d) => d,
                    Err(e) => {
                        return WebError::BadRequest(format!("malformed image upload: {e}"))
                            .into_response()
                    }
                };
                if data.len() > MAX_IMAGE_BYTES {
                    return flash_redirect(
                        &state,
                        &sid,
                        Flash::error("An image exceeds the 5 MB upload limit"),
                        "/dashboard/seller",
                    );
                }
                images.push((filename, data));
            }
            _ => {} // unknown parts are ignored
        }
    }

    let (title, description, price_cents, category, listing_type) = match fields.validated() {
        Ok(parts) => parts,
        Err(message) => {
            return flash_redirect(&state, &sid, Flash::error(message), "/dashboard/seller")
        }
    };

    let now = Utc::now();
    let listing = Listing {
        id: Uuid::new_v4().to_string(),
        seller_id: user.id.clone(),
        title,
        description,
        price_cents,
        category,
        listing_type,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = state.db.listings().insert(&listing).await {
        return WebError::from(e).into_response();
    }

    if let Err(e) = store_images(&state, &listing.id, &images).await {
        // The listing exists; image persistence problems are reported, not
        // rolled back
        warn!(listing_id = %listing.id, error = %e, "Failed to store listing images");
        return flash_redirect(
            &state,
            &sid,
            Flash::error("Listing created, but some images could not be saved"),
            "/dashboard/seller",
        );
    }

    info!(listing_id = %listing.id, seller = %user.id, "Listing created");
    flash_redirect(
        &state,
        &sid,
        Flash::success("Listing created"),
        "/dashboard/seller",
    )
}

/// Writes uploaded images to the media directory and records them.
async fn store_images(
    state: &AppState,
    listing_id: &str,
    images: &[(String, Bytes)],
) -> WebResult<()> {
    if images.is_empty() {
        return Ok(());
    }

    let dir = std::path::Path::new(&state.config.media_dir).join(listing_id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| WebError::Internal(format!("create media dir: {e}")))?;

    for (position, (filename, data)) in images.iter().enumerate() {
        // Uploaded names are untrusted; keep only the final component
        let safe_name = std::path::Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin");
        let stored_name = format!("{}_{safe_name}", Uuid::new_v4());
        let path = dir.join(&stored_name);

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| WebError::Internal(format!("write image: {e}")))?;

        let relative = format!("{listing_id}/{stored_name}");
        state
            .db
            .listings()
            .add_image(listing_id, &relative, position as i64)
            .await?;
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct EditListingForm {
    pub title: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub listing_type: String,
}

/// POST /listings/:id/edit
async fn edit_listing(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<EditListingForm>,
) -> Response {
    let (user, listing) = match seller_owned_listing(&state, &sid, &id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let fields = ListingFormFields {
        title: form.title,
        description: form.description,
        price: form.price,
        category: form.category,
        listing_type: form.listing_type,
    };
    let (title, description, price_cents, category, listing_type) = match fields.validated() {
        Ok(parts) => parts,
        Err(message) => {
            return flash_redirect(&state, &sid, Flash::error(message), "/dashboard/seller")
        }
    };

    if let Err(e) = state
        .db
        .listings()
        .update(&listing.id, &title, &description, price_cents, category, listing_type)
        .await
    {
        return WebError::from(e).into_response();
    }

    info!(listing_id = %listing.id, seller = %user.id, "Listing updated");
    flash_redirect(
        &state,
        &sid,
        Flash::success("Listing updated"),
        "/dashboard/seller",
    )
}

/// POST /listings/:id/delete
async fn delete_listing(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
) -> Response {
    let (user, listing) = match seller_owned_listing(&state, &sid, &id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    if let Err(e) = state.db.listings().deactivate(&listing.id).await {
        return WebError::from(e).into_response();
    }

    info!(listing_id = %listing.id, seller = %user.id, "Listing deactivated");
    flash_redirect(
        &state,
        &sid,
        Flash::success("Listing removed"),
        "/dashboard/seller",
    )
}

/// Shared gate for edit/delete: logged in, seller role, owns the listing.
async fn seller_owned_listing(
    state: &AppState,
    sid: &SessionId,
    listing_id: &str,
) -> Result<(souk_core::User, Listing), Response> {
    let (user, profile) = require_login(state, sid).await?;
    let profile = profile_or_gap(&user, profile).map_err(IntoResponse::into_response)?;

    if let Err(e) = souk_core::access::require_role(&user.id, Some(&profile), Role::Seller) {
        return Err(flash_redirect(
            state,
            sid,
            Flash::error(e.to_string()),
            "/listings",
        ));
    }

    let listing = match state.db.listings().get_by_id(listing_id).await {
        Ok(Some(listing)) => listing,
        Ok(None) => {
            return Err(
                WebError::NotFound(format!("listing {listing_id}")).into_response()
            )
        }
        Err(e) => return Err(WebError::from(e).into_response()),
    };

    if souk_core::access::require_owner(&user.id, &listing.seller_id, &listing.id).is_err() {
        return Err(flash_redirect(
            state,
            sid,
            Flash::error("You can only manage your own listings"),
            "/dashboard/seller",
        ));
    }

    Ok((user, listing))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_filter_keeps_valid_dimensions() {
        let query = CatalogQuery {
            category: Some("land".to_string()),
            listing_type: Some("sale".to_string()),
            min_price: Some("100".to_string()),
            max_price: Some("500.50".to_string()),
        };
        let (filter, flashes) = degrade_filter(&query);
        assert_eq!(filter.category, Some(ListingCategory::Land));
        assert_eq!(filter.listing_type, Some(ListingType::Sale));
        assert_eq!(filter.min_price_cents, Some(10_000));
        assert_eq!(filter.max_price_cents, Some(50_050));
        assert!(flashes.is_empty());
    }

    #[test]
    fn test_degrade_filter_drops_malformed_dimensions() {
        let query = CatalogQuery {
            category: Some("spaceship".to_string()),
            listing_type: Some("sale".to_string()),
            min_price: Some("banana".to_string()),
            max_price: None,
        };
        let (filter, flashes) = degrade_filter(&query);
        // malformed dimensions dropped, valid one survives
        assert_eq!(filter.category, None);
        assert_eq!(filter.listing_type, Some(ListingType::Sale));
        assert_eq!(filter.min_price_cents, None);
        assert_eq!(flashes.len(), 2);
    }

    #[test]
    fn test_degrade_filter_ignores_empty_strings() {
        let query = CatalogQuery {
            category: Some(String::new()),
            ..Default::default()
        };
        let (filter, flashes) = degrade_filter(&query);
        assert_eq!(filter, ListingFilter::default());
        assert!(flashes.is_empty());
    }

    #[test]
    fn test_listing_form_validation() {
        let fields = ListingFormFields {
            title: " Plot in Cocody ".to_string(),
            description: "Serviced plot".to_string(),
            price: "1500".to_string(),
            category: "land".to_string(),
            listing_type: "sale".to_string(),
        };
        let (title, _, price_cents, category, listing_type) = fields.validated().unwrap();
        assert_eq!(title, "Plot in Cocody");
        assert_eq!(price_cents, 150_000);
        assert_eq!(category, ListingCategory::Land);
        assert_eq!(listing_type, ListingType::Sale);

        let bad = ListingFormFields {
            title: "t".to_string(),
            description: "d".to_string(),
            price: "-5".to_string(),
            category: "land".to_string(),
            listing_type: "sale".to_string(),
        };
        assert!(bad.validated().is_err());
    }
}
