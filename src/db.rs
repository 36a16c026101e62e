// ==========================================
// 预测性维护排程系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 内嵌建表语句，首次打开即可用
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 内嵌表结构
///
/// 复杂聚合 (任务/分派/影响/提案负载) 以 JSON 列存储,查询键单列展开
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS maintenance_schedule (
    schedule_id              TEXT PRIMARY KEY,
    equipment_id             TEXT NOT NULL,
    equipment_name           TEXT NOT NULL,
    equipment_category       TEXT NOT NULL,
    status                   TEXT NOT NULL,
    priority_level           TEXT NOT NULL,
    strategy                 TEXT NOT NULL,
    scheduled_date           TEXT NOT NULL,
    estimated_duration_hours REAL NOT NULL,
    total_cost_estimate      REAL NOT NULL,
    payload_json             TEXT NOT NULL,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL,
    revision                 INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_sched_equipment ON maintenance_schedule(equipment_id);
CREATE INDEX IF NOT EXISTS idx_sched_date ON maintenance_schedule(scheduled_date);

CREATE TABLE IF NOT EXISTS optimization_run (
    run_id               TEXT PRIMARY KEY,
    period_from          TEXT NOT NULL,
    period_to            TEXT NOT NULL,
    status               TEXT NOT NULL,
    snapshot_fingerprint TEXT NOT NULL,
    payload_json         TEXT NOT NULL,
    created_at           TEXT NOT NULL,
    created_by           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS analytics_report (
    report_id    TEXT PRIMARY KEY,
    period_from  TEXT NOT NULL,
    period_to    TEXT NOT NULL,
    report_json  TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_log (
    seq_no      INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id    TEXT NOT NULL,
    event_type  TEXT NOT NULL,
    entity_id   TEXT NOT NULL,
    operator    TEXT NOT NULL,
    detail_json TEXT,
    occurred_at TEXT NOT NULL
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 初始化表结构（幂等）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// 打开 SQLite 连接并应用统一配置与表结构
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_bootstrap_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('maintenance_schedule','optimization_run','analytics_report','audit_log')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 4);
    }
}
