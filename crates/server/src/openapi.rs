//! OpenAPI document. The `*Doc` types mirror the request bodies accepted by
//! the service layer; they exist only for the schema.
#![allow(dead_code)]

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ServiceInputDoc {
    pub name: String,
    pub description: Option<String>,
    /// 5..=480
    pub duration_minutes: i32,
    /// `"25.00"` or `25`
    #[schema(example = "25.00")]
    pub price: String,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct ServicePatchDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    #[schema(example = "25.00")]
    pub price: Option<String>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct StaffInputDoc {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub active: Option<bool>,
    /// Empty means the staff member offers every service.
    pub service_ids: Option<Vec<i32>>,
}

#[derive(ToSchema)]
pub struct StaffPatchDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub active: Option<bool>,
    /// Replaces the whole set.
    pub service_ids: Option<Vec<i32>>,
}

#[derive(ToSchema)]
pub struct ClientInputDoc {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub marketing_consent: Option<bool>,
}

#[derive(ToSchema)]
pub struct ClientPatchDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub marketing_consent: Option<bool>,
}

#[derive(ToSchema)]
pub struct BookingInputDoc {
    pub service: i32,
    pub staff: i32,
    #[schema(example = "2030-01-07")]
    pub date: String,
    #[schema(example = "10:00")]
    pub time: String,
    /// Existing client; otherwise `client_name` and `client_email` are required.
    pub client: Option<i32>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "confirmed")]
    pub status: Option<String>,
}

#[derive(ToSchema)]
pub struct BookingPatchDoc {
    #[schema(example = "completed")]
    pub status: Option<String>,
    pub notes: Option<String>,
    pub staff: Option<i32>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(ToSchema)]
pub struct BulkStatusDoc {
    pub ids: Vec<i32>,
    /// `completed`, `cancelled` or `no_show`
    #[schema(example = "completed")]
    pub status: String,
}

#[derive(ToSchema)]
pub struct BusinessHoursInputDoc {
    /// 0 = Monday
    pub day_of_week: i16,
    pub is_open: Option<bool>,
    #[schema(example = "09:00")]
    pub open_time: String,
    #[schema(example = "17:00")]
    pub close_time: String,
}

#[derive(ToSchema)]
pub struct BusinessHoursPatchDoc {
    pub day_of_week: Option<i16>,
    pub is_open: Option<bool>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

#[derive(ToSchema)]
pub struct StaffScheduleInputDoc {
    pub staff: i32,
    pub day_of_week: i16,
    pub is_working: Option<bool>,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "17:00")]
    pub end_time: String,
}

#[derive(ToSchema)]
pub struct StaffSchedulePatchDoc {
    pub day_of_week: Option<i16>,
    pub is_working: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(ToSchema)]
pub struct ClosureInputDoc {
    #[schema(example = "2030-12-25")]
    pub date: String,
    pub reason: Option<String>,
    /// Defaults to true; partial closures need both times.
    pub all_day: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(ToSchema)]
pub struct ClosurePatchDoc {
    pub date: Option<String>,
    pub reason: Option<String>,
    pub all_day: Option<bool>,
    /// `null` clears the time.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(ToSchema)]
pub struct StaffLeaveInputDoc {
    pub staff: i32,
    pub start_date: String,
    /// Inclusive.
    pub end_date: String,
    pub reason: Option<String>,
}

#[derive(ToSchema)]
pub struct StaffLeavePatchDoc {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

#[derive(ToSchema)]
pub struct SessionInputDoc {
    pub title: String,
    pub description: Option<String>,
    pub staff: Option<i32>,
    #[schema(example = "2030-01-07T18:00:00+00:00")]
    pub start_time: String,
    pub duration_minutes: i32,
    pub capacity: i32,
    #[schema(example = "12.50")]
    pub price: String,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct SessionPatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `null` unassigns.
    pub staff: Option<i32>,
    pub start_time: Option<String>,
    pub duration_minutes: Option<i32>,
    /// Cannot drop below the current enrollment.
    pub capacity: Option<i32>,
    pub price: Option<String>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct EnrollDoc { pub client: i32 }

#[derive(ToSchema)]
pub struct PackageInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub class_count: i32,
    #[schema(example = "100.00")]
    pub price: String,
    pub validity_days: i32,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct PackagePatchDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_count: Option<i32>,
    pub price: Option<String>,
    pub validity_days: Option<i32>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct IntakeInputDoc {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    #[schema(example = "beginner")]
    pub experience_level: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
    /// Must be true.
    pub consent_booking: bool,
    pub consent_marketing: Option<bool>,
    /// Must be true.
    pub consent_privacy: bool,
}

#[derive(ToSchema)]
pub struct IntakePatchDoc {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub experience_level: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
    pub consent_booking: Option<bool>,
    pub consent_marketing: Option<bool>,
    pub consent_privacy: Option<bool>,
}

#[derive(ToSchema)]
pub struct DisclaimerInputDoc {
    #[schema(example = "1.1")]
    pub version: String,
    pub content: String,
    /// Deactivates every other version when true.
    pub active: Option<bool>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::catalog::list,
        crate::routes::catalog::create,
        crate::routes::catalog::get,
        crate::routes::catalog::update,
        crate::routes::catalog::delete,
        crate::routes::staff::list,
        crate::routes::staff::create,
        crate::routes::staff::get,
        crate::routes::staff::update,
        crate::routes::staff::delete,
        crate::routes::clients::list,
        crate::routes::clients::create,
        crate::routes::clients::get,
        crate::routes::clients::update,
        crate::routes::clients::delete,
        crate::routes::clients::export_csv,
        crate::routes::bookings::list,
        crate::routes::bookings::create,
        crate::routes::bookings::get,
        crate::routes::bookings::update,
        crate::routes::bookings::delete,
        crate::routes::bookings::cancel,
        crate::routes::bookings::slots,
        crate::routes::bookings::bulk_status,
        crate::routes::bookings::export_csv,
        crate::routes::schedules::list_business_hours,
        crate::routes::schedules::create_business_hours,
        crate::routes::schedules::get_business_hours,
        crate::routes::schedules::update_business_hours,
        crate::routes::schedules::delete_business_hours,
        crate::routes::schedules::list_staff_schedules,
        crate::routes::schedules::create_staff_schedule,
        crate::routes::schedules::get_staff_schedule,
        crate::routes::schedules::update_staff_schedule,
        crate::routes::schedules::delete_staff_schedule,
        crate::routes::schedules::list_closures,
        crate::routes::schedules::create_closure,
        crate::routes::schedules::get_closure,
        crate::routes::schedules::update_closure,
        crate::routes::schedules::delete_closure,
        crate::routes::schedules::list_staff_leave,
        crate::routes::schedules::create_staff_leave,
        crate::routes::schedules::get_staff_leave,
        crate::routes::schedules::update_staff_leave,
        crate::routes::schedules::delete_staff_leave,
        crate::routes::sessions::list,
        crate::routes::sessions::create,
        crate::routes::sessions::get,
        crate::routes::sessions::update,
        crate::routes::sessions::delete,
        crate::routes::sessions::enroll,
        crate::routes::sessions::unenroll,
        crate::routes::packages::list,
        crate::routes::packages::create,
        crate::routes::packages::get,
        crate::routes::packages::update,
        crate::routes::packages::delete,
        crate::routes::intake::list,
        crate::routes::intake::create,
        crate::routes::intake::get,
        crate::routes::intake::update,
        crate::routes::intake::delete,
        crate::routes::intake::status,
        crate::routes::intake::by_email,
        crate::routes::intake::expire,
        crate::routes::intake::expire_all,
        crate::routes::disclaimer::list,
        crate::routes::disclaimer::create,
        crate::routes::disclaimer::active,
        crate::routes::disclaimer::get,
        crate::routes::disclaimer::activate,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceInputDoc,
            ServicePatchDoc,
            StaffInputDoc,
            StaffPatchDoc,
            ClientInputDoc,
            ClientPatchDoc,
            BookingInputDoc,
            BookingPatchDoc,
            BulkStatusDoc,
            BusinessHoursInputDoc,
            BusinessHoursPatchDoc,
            StaffScheduleInputDoc,
            StaffSchedulePatchDoc,
            ClosureInputDoc,
            ClosurePatchDoc,
            StaffLeaveInputDoc,
            StaffLeavePatchDoc,
            SessionInputDoc,
            SessionPatchDoc,
            EnrollDoc,
            PackageInputDoc,
            PackagePatchDoc,
            IntakeInputDoc,
            IntakePatchDoc,
            DisclaimerInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "catalog"),
        (name = "staff"),
        (name = "clients"),
        (name = "bookings"),
        (name = "schedules"),
        (name = "sessions"),
        (name = "packages"),
        (name = "intake"),
        (name = "admin")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/bookings", "/api/bookings/slots", "/api/intake/status", "/api/intake-disclaimer/active"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
