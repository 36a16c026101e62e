// ==========================================
// 集成测试辅助工具
// ==========================================
// 职责: 内存版协作方桩 + 测试数据构造 + API 测试环境
// ==========================================

pub mod mock_registries;
pub mod test_data_builder;

use std::sync::{Arc, Mutex};

use predictive_maint::api::{AnalyticsApi, MaintenanceApi, OptimizationApi};
use predictive_maint::config::{EngineConfig, TaskCatalog};
use predictive_maint::db;
use predictive_maint::engine::{
    AnalyticsEngine, EngineRepositories, FleetOptimizer, ScheduleBuilder,
};
use predictive_maint::repository::{
    AnalyticsReportRepository, OptimizationRunRepository, ScheduleRepository, SqliteAuditLog,
};

use self::mock_registries::{
    InMemoryEquipmentRegistry, InMemorySopRegistry, InMemoryTechnicianDirectory,
};

// ==========================================
// API 测试环境
// ==========================================

/// API 测试环境
///
/// 包含所有 API 实例与内存协作方桩
pub struct ApiTestEnv {
    pub equipment_registry: Arc<InMemoryEquipmentRegistry>,
    pub technician_directory: Arc<InMemoryTechnicianDirectory>,
    pub sop_registry: Arc<InMemorySopRegistry>,
    pub schedule_repo: Arc<ScheduleRepository>,
    pub run_repo: Arc<OptimizationRunRepository>,
    pub report_repo: Arc<AnalyticsReportRepository>,
    pub audit_log: Arc<SqliteAuditLog>,
    pub maintenance_api: MaintenanceApi,
    pub optimization_api: OptimizationApi,
    pub analytics_api: AnalyticsApi,
    // 临时数据库文件,保持存活直到环境销毁
    _db_file: tempfile::NamedTempFile,
}

impl ApiTestEnv {
    /// 搭建测试环境 (临时 SQLite + 内存协作方桩)
    pub fn setup() -> Self {
        predictive_maint::logging::init_test();

        let db_file = tempfile::NamedTempFile::new().expect("创建临时数据库失败");
        let db_path = db_file.path().to_str().expect("临时路径非法").to_string();

        // 所有仓储共享同一连接,避免测试中的文件锁竞争
        let conn = db::open_sqlite_connection(&db_path).expect("打开数据库失败");
        let conn = Arc::new(Mutex::new(conn));

        let schedule_repo = Arc::new(ScheduleRepository::from_connection(conn.clone()));
        let run_repo = Arc::new(OptimizationRunRepository::from_connection(conn.clone()));
        let report_repo = Arc::new(AnalyticsReportRepository::from_connection(conn.clone()));
        let audit_log = Arc::new(SqliteAuditLog::from_connection(conn));

        let equipment_registry = Arc::new(InMemoryEquipmentRegistry::new());
        let technician_directory = Arc::new(InMemoryTechnicianDirectory::new());
        let sop_registry = Arc::new(InMemorySopRegistry::new());

        let repos = EngineRepositories::new(
            equipment_registry.clone(),
            technician_directory.clone(),
            sop_registry.clone(),
            schedule_repo.clone(),
            audit_log.clone(),
        );

        let config = EngineConfig::default();
        let builder = Arc::new(ScheduleBuilder::new(
            repos.clone(),
            config.clone(),
            TaskCatalog::default(),
        ));

        let maintenance_api = MaintenanceApi::new(
            builder,
            repos.clone(),
            config.batch.dependency_timeout_ms,
            config.batch.retry_backoff_ms,
        );

        let fleet = Arc::new(FleetOptimizer::new(
            schedule_repo.clone(),
            run_repo.clone(),
            audit_log.clone(),
        ));
        let optimization_api = OptimizationApi::new(fleet, run_repo.clone());

        let analytics_api = AnalyticsApi::new(
            AnalyticsEngine::new(config.analytics.clone()),
            repos,
            report_repo.clone(),
            config.batch.dependency_timeout_ms,
            config.batch.retry_backoff_ms,
        );

        Self {
            equipment_registry,
            technician_directory,
            sop_registry,
            schedule_repo,
            run_repo,
            report_repo,
            audit_log,
            maintenance_api,
            optimization_api,
            analytics_api,
            _db_file: db_file,
        }
    }
}
