//! REST API endpoints for the vendor directory

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::repository::{ProposalRepository, RfpRepository, VendorRepository};
use crate::db::DbError;
use crate::model::vendor::VendorPatch;
use crate::model::{Proposal, RfpVendor, Vendor};

/// Request body for creating a vendor
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Relation counts included in listings
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationCountsDto {
    pub proposals: i64,
    pub rfp_vendors: i64,
}

/// A vendor with its relation counts
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorWithCounts {
    #[serde(flatten)]
    pub vendor: Vendor,
    #[serde(rename = "_count")]
    pub count: RelationCountsDto,
}

/// A vendor with its proposals and dispatch history
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorDetail {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub proposals: Vec<Proposal>,
    pub rfp_vendors: Vec<RfpVendor>,
}

/// Minimal shape check for a directory email address
fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

/// List vendors, newest first
#[utoipa::path(
    get,
    path = "/api/vendors",
    responses(
        (status = 200, description = "Vendors retrieved successfully", body = [VendorWithCounts])
    ),
    tag = "vendors"
)]
#[get("/api/vendors")]
pub async fn list_vendors(
    vendors: web::Data<VendorRepository>,
) -> Result<HttpResponse, ApiError> {
    let listed = vendors.list().await?;

    let response: Vec<VendorWithCounts> = listed
        .into_iter()
        .map(|(vendor, count)| VendorWithCounts {
            vendor,
            count: RelationCountsDto {
                proposals: count.proposals,
                rfp_vendors: count.rfp_vendors,
            },
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Get a vendor with its proposals and dispatch history
#[utoipa::path(
    get,
    path = "/api/vendors/{id}",
    params(("id" = String, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor retrieved successfully", body = VendorDetail),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
#[get("/api/vendors/{id}")]
pub async fn get_vendor(
    vendors: web::Data<VendorRepository>,
    rfps: web::Data<RfpRepository>,
    proposals: web::Data<ProposalRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let vendor = vendors
        .get(&id)
        .await
        .map_err(|e| not_found_as_vendor(e, &id))?;
    let vendor_proposals = proposals.list_for_vendor(&id).await?;
    let dispatches = rfps.dispatches_for_vendor(&id).await?;

    Ok(HttpResponse::Ok().json(VendorDetail {
        vendor,
        proposals: vendor_proposals,
        rfp_vendors: dispatches,
    }))
}

/// Create a vendor
#[utoipa::path(
    post,
    path = "/api/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 400, description = "Validation error or duplicate email")
    ),
    tag = "vendors"
)]
#[post("/api/vendors")]
pub async fn create_vendor(
    vendors: web::Data<VendorRepository>,
    body: web::Json<CreateVendorRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if !is_valid_email(&body.email) {
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }

    if vendors.find_by_email(&body.email).await?.is_some() {
        return Err(ApiError::BadRequest(
            "Vendor with this email already exists".to_string(),
        ));
    }

    let now = Utc::now();
    let vendor = Vendor {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email: body.email.trim().to_string(),
        contact_person: body.contact_person,
        phone: body.phone,
        address: body.address,
        created_at: now,
        updated_at: now,
    };

    vendors.insert(&vendor).await?;

    Ok(HttpResponse::Created().json(vendor))
}

/// Partially update a vendor
#[utoipa::path(
    put,
    path = "/api/vendors/{id}",
    params(("id" = String, Path, description = "Vendor ID")),
    request_body = VendorPatch,
    responses(
        (status = 200, description = "Vendor updated", body = Vendor),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
#[put("/api/vendors/{id}")]
pub async fn update_vendor(
    vendors: web::Data<VendorRepository>,
    path: web::Path<String>,
    body: web::Json<VendorPatch>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let patch = body.into_inner();

    if let Some(email) = patch.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("Invalid email".to_string()));
        }
    }
    if let Some(name) = patch.name.as_deref() {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
    }

    let vendor = vendors
        .update(&id, &patch)
        .await
        .map_err(|e| not_found_as_vendor(e, &id))?;

    Ok(HttpResponse::Ok().json(vendor))
}

/// Delete a vendor
#[utoipa::path(
    delete,
    path = "/api/vendors/{id}",
    params(("id" = String, Path, description = "Vendor ID")),
    responses(
        (status = 204, description = "Vendor deleted"),
        (status = 400, description = "Vendor is still referenced"),
        (status = 404, description = "Vendor not found")
    ),
    tag = "vendors"
)]
#[delete("/api/vendors/{id}")]
pub async fn delete_vendor(
    vendors: web::Data<VendorRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let deleted = vendors.delete(&id).await?;
    if !deleted {
        return Err(ApiError::VendorNotFound(id));
    }

    Ok(HttpResponse::NoContent().finish())
}

fn not_found_as_vendor(err: DbError, id: &str) -> ApiError {
    match err {
        DbError::NotFound(_) => ApiError::VendorNotFound(id.to_string()),
        other => other.into(),
    }
}

/// Configure vendor routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_vendors)
        .service(get_vendor)
        .service(create_vendor)
        .service(update_vendor)
        .service(delete_vendor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("sales@techsupply.com"));
        assert!(is_valid_email("  quotes@officeworld.com "));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@techsupply.com"));
        assert!(!is_valid_email("sales@"));
        assert!(!is_valid_email("sales@nodot"));
        assert!(!is_valid_email(""));
    }
}
