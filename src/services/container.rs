//! Service Container - Centralized service access with parallel execution support.
//!
//! Builds every service over one shared unit of work and hands them out as
//! trait objects, so the HTTP layer depends on service traits only.

use std::future::Future;
use std::sync::Arc;

use super::{
    AllocationManager, AllocationService, AuthService, Authenticator, ComplaintManager,
    ComplaintService, DashboardManager, DashboardService, HostelManager, HostelService,
    LeaveManager, LeaveService, NotificationManager, NotificationService, Notifier,
    PaymentManager, PaymentService, RoomManager, RoomService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{DistributedLock, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn hostels(&self) -> Arc<dyn HostelService>;
    fn rooms(&self) -> Arc<dyn RoomService>;
    fn allocations(&self) -> Arc<dyn AllocationService>;
    fn complaints(&self) -> Arc<dyn ComplaintService>;
    fn leaves(&self) -> Arc<dyn LeaveService>;
    fn payments(&self) -> Arc<dyn PaymentService>;
    fn notifications(&self) -> Arc<dyn NotificationService>;
    fn dashboard(&self) -> Arc<dyn DashboardService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    hostels: Arc<dyn HostelService>,
    rooms: Arc<dyn RoomService>,
    allocations: Arc<dyn AllocationService>,
    complaints: Arc<dyn ComplaintService>,
    leaves: Arc<dyn LeaveService>,
    payments: Arc<dyn PaymentService>,
    notifications: Arc<dyn NotificationService>,
    dashboard: Arc<dyn DashboardService>,
}

impl Services {
    /// Wire every service to one database connection.
    ///
    /// The lock and the notifier are passed in so callers can choose Redis
    /// and the job queue in production and fakes elsewhere.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        lock: Arc<dyn DistributedLock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config)),
            users: Arc::new(UserManager::new(uow.clone())),
            hostels: Arc::new(HostelManager::new(uow.clone())),
            rooms: Arc::new(RoomManager::new(uow.clone())),
            allocations: Arc::new(AllocationManager::new(uow.clone(), lock, notifier)),
            complaints: Arc::new(ComplaintManager::new(uow.clone())),
            leaves: Arc::new(LeaveManager::new(uow.clone())),
            payments: Arc::new(PaymentManager::new(uow.clone())),
            notifications: Arc::new(NotificationManager::new(uow.clone())),
            dashboard: Arc::new(DashboardManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn hostels(&self) -> Arc<dyn HostelService> {
        self.hostels.clone()
    }

    fn rooms(&self) -> Arc<dyn RoomService> {
        self.rooms.clone()
    }

    fn allocations(&self) -> Arc<dyn AllocationService> {
        self.allocations.clone()
    }

    fn complaints(&self) -> Arc<dyn ComplaintService> {
        self.complaints.clone()
    }

    fn leaves(&self) -> Arc<dyn LeaveService> {
        self.leaves.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payments.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notifications.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
///
/// If any operation fails, its error is returned as soon as it happens.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute three independent async operations in parallel.
    pub async fn join3<F1, F2, F3, T1, T2, T3>(
        f1: F1,
        f2: F2,
        f3: F3,
    ) -> AppResult<(T1, T2, T3)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
    {
        try_join!(f1, f2, f3)
    }

    /// Execute five independent async operations in parallel.
    pub async fn join5<F1, F2, F3, F4, F5, T1, T2, T3, T4, T5>(
        f1: F1,
        f2: F2,
        f3: F3,
        f4: F4,
        f5: F5,
    ) -> AppResult<(T1, T2, T3, T4, T5)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
        F4: Future<Output = AppResult<T4>>,
        F5: Future<Output = AppResult<T5>>,
    {
        try_join!(f1, f2, f3, f4, f5)
    }

    /// Execute a collection of homogeneous async operations in parallel.
    ///
    /// Results are returned in the same order as the input futures.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_parallel_join_all_keeps_order() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_parallel_join5_fails_on_first_error() {
        let result = parallel::join5(
            async { Ok::<_, AppError>(1) },
            async { Ok::<_, AppError>(2) },
            async { Err::<i32, _>(AppError::NotFound) },
            async { Ok::<_, AppError>(4) },
            async { Ok::<_, AppError>(5) },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
