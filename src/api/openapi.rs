//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, allocation_handler, auth_handler, complaint_handler, dashboard_handler,
    hostel_handler, leave_handler, notification_handler, payment_handler, profile_handler,
    room_handler,
};
use crate::domain::{
    AllocationResponse, Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus, Hostel,
    LeaveRequest, LeaveStatus, Notification, NotificationKind, Payment, PaymentStatus,
    RequestStatus, Room, RoomRequest, RoomStatus, RoomTypeConfig, UserResponse, UserRole,
    UserStatus,
};
use crate::services::{AdminStats, StudentDashboard, TokenResponse};
use crate::types::{PaginatedRoomRequests, PaginatedUsers, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hostel Manager API",
        version = "0.1.0",
        description = "Hostels, rooms, the room allocation workflow, complaints, leave and payments",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3002", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::reset_password,
        profile_handler::get_profile,
        profile_handler::update_profile,
        admin_handler::list_users,
        admin_handler::update_user_status,
        admin_handler::update_user_role,
        admin_handler::stats,
        hostel_handler::list_hostels,
        hostel_handler::get_hostel,
        hostel_handler::create_hostel,
        hostel_handler::update_hostel,
        hostel_handler::update_room_types,
        hostel_handler::reset_room_types,
        room_handler::list_rooms,
        room_handler::create_room,
        room_handler::update_room,
        room_handler::delete_room,
        allocation_handler::create_request,
        allocation_handler::list_requests,
        allocation_handler::my_requests,
        allocation_handler::get_request,
        allocation_handler::approve_request,
        allocation_handler::waitlist_request,
        allocation_handler::cancel_request,
        allocation_handler::available_rooms,
        allocation_handler::list_allocations,
        allocation_handler::my_allocations,
        allocation_handler::deallocate,
        complaint_handler::create_complaint,
        complaint_handler::my_complaints,
        complaint_handler::list_complaints,
        complaint_handler::update_complaint_status,
        leave_handler::create_leave,
        leave_handler::my_leaves,
        leave_handler::list_leaves,
        leave_handler::approve_leave,
        leave_handler::reject_leave,
        payment_handler::create_payment,
        payment_handler::my_payments,
        payment_handler::list_payments,
        payment_handler::pay,
        payment_handler::fail,
        payment_handler::refund,
        payment_handler::retry,
        notification_handler::list_notifications,
        notification_handler::mark_read,
        dashboard_handler::student_dashboard,
    ),
    components(
        schemas(
            UserRole,
            UserStatus,
            UserResponse,
            Hostel,
            RoomTypeConfig,
            Room,
            RoomStatus,
            RoomRequest,
            RequestStatus,
            AllocationResponse,
            Complaint,
            ComplaintCategory,
            ComplaintPriority,
            ComplaintStatus,
            LeaveRequest,
            LeaveStatus,
            Payment,
            PaymentStatus,
            Notification,
            NotificationKind,
            TokenResponse,
            AdminStats,
            StudentDashboard,
            PaginationMeta,
            PaginatedUsers,
            PaginatedRoomRequests,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ResetPasswordRequest,
            profile_handler::UpdateProfileRequest,
            admin_handler::UpdateStatusRequest,
            admin_handler::UpdateRoleRequest,
            hostel_handler::CreateHostelRequest,
            hostel_handler::UpdateHostelRequest,
            hostel_handler::RoomTypesRequest,
            room_handler::CreateRoomRequest,
            room_handler::UpdateRoomRequest,
            allocation_handler::CreateRoomRequestBody,
            allocation_handler::ApproveRequestBody,
            complaint_handler::CreateComplaintRequest,
            complaint_handler::UpdateComplaintStatusRequest,
            leave_handler::CreateLeaveRequest,
            payment_handler::CreatePaymentRequest,
            payment_handler::SettlePaymentRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Profiles", description = "The signed-in user's profile"),
        (name = "Admin", description = "User management and dashboard counters"),
        (name = "Hostels", description = "Hostel settings and room type templates"),
        (name = "Rooms", description = "Room inventory"),
        (name = "Room allocation", description = "Room requests, approval and deallocation"),
        (name = "Complaints", description = "Resident complaints"),
        (name = "Leave", description = "Leave requests"),
        (name = "Payments", description = "Fees and settlements"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Dashboard", description = "Student dashboard")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/room-allocation/requests/{id}/approve"));
        assert!(paths.contains_key("/api/room-allocations/{id}/deallocate"));
        assert!(paths.contains_key("/api/auth/reset-password"));
    }
}
