//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, RateLimitStore};
use crate::services::{
    AllocationService, AuthService, ComplaintService, DashboardService, HostelService,
    LeaveService, NotificationService, Notifier, PaymentService, RoomService, ServiceContainer,
    Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub hostel_service: Arc<dyn HostelService>,
    pub room_service: Arc<dyn RoomService>,
    pub allocation_service: Arc<dyn AllocationService>,
    pub complaint_service: Arc<dyn ComplaintService>,
    pub leave_service: Arc<dyn LeaveService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub dashboard_service: Arc<dyn DashboardService>,
    /// Request counters for the rate limit middleware
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Production wiring: Redis provides both the rate limiter and the
    /// room lock.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        notifier: Arc<dyn Notifier>,
        config: Config,
    ) -> Self {
        let services = Services::from_connection(
            database.get_connection(),
            config,
            cache.clone(),
            notifier,
        );
        Self::new(&services, cache, database)
    }

    /// Build state from any service container.
    pub fn new(
        services: &dyn ServiceContainer,
        rate_limiter: Arc<dyn RateLimitStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            hostel_service: services.hostels(),
            room_service: services.rooms(),
            allocation_service: services.allocations(),
            complaint_service: services.complaints(),
            leave_service: services.leaves(),
            payment_service: services.payments(),
            notification_service: services.notifications(),
            dashboard_service: services.dashboard(),
            rate_limiter,
            database,
        }
    }
}
