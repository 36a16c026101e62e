// ==========================================
// 预测性维护排程系统 - 设备实体
// ==========================================
// 职责: 设备主数据与维护历史 (由外部资产台账拥有/变更)
// 红线: 引擎只读设备数据,缺失字段使用缺省值,不报错
// ==========================================

use crate::domain::types::MaintenanceKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceRecord - 历史维护记录
// ==========================================
/// 历史维护记录
///
/// 由外部资产台账提供,作为分析引擎 MTBF/MTTR/成本趋势的数据源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    /// 记录ID
    pub record_id: String,
    /// 设备ID
    pub equipment_id: String,
    /// 维护类型
    pub maintenance_kind: MaintenanceKind,
    /// 执行日期
    pub performed_date: NaiveDate,
    /// 维修工时 (小时)
    pub duration_hours: f64,
    /// 实际花费
    pub cost: f64,
    /// 是否成功
    pub success: bool,
    /// 执行技师ID
    #[serde(default)]
    pub technician_id: Option<String>,
    /// 备注
    #[serde(default)]
    pub notes: Option<String>,
}

// ==========================================
// Equipment - 设备主数据
// ==========================================
/// 设备主数据
///
/// install_date / usage_hours 允许缺失:
/// 预测引擎对缺失字段应用缺省值 (5年 / 8760小时 / 4次维护)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// 设备ID
    pub equipment_id: String,
    /// 设备名称
    pub name: String,
    /// 设备类别 (任务目录查表键,如 PUMP / MOTOR / COMPRESSOR)
    pub category: String,
    /// 安装日期 (可缺失)
    #[serde(default)]
    pub install_date: Option<NaiveDate>,
    /// 累计运行小时 (可缺失)
    #[serde(default)]
    pub usage_hours: Option<f64>,
    /// 安装位置
    #[serde(default)]
    pub location: Option<String>,
    /// 维护历史
    #[serde(default)]
    pub maintenance_history: Vec<MaintenanceRecord>,
    /// 台账更新时间
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Equipment {
    /// 设备年龄 (年)
    ///
    /// # 参数
    /// - today: 基准日期
    ///
    /// # 返回
    /// - Some(f64): 安装日期已知时的年龄
    /// - None: 安装日期缺失
    pub fn age_years(&self, today: NaiveDate) -> Option<f64> {
        self.install_date
            .map(|d| (today - d).num_days().max(0) as f64 / 365.25)
    }

    /// 历史维护次数
    pub fn maintenance_event_count(&self) -> usize {
        self.maintenance_history.len()
    }

    /// 最近一次维护日期
    pub fn last_maintenance_date(&self) -> Option<NaiveDate> {
        self.maintenance_history
            .iter()
            .map(|r| r.performed_date)
            .max()
    }

    /// 距上次维护的天数 (无历史时返回 None)
    pub fn days_since_last_maintenance(&self, today: NaiveDate) -> Option<i64> {
        self.last_maintenance_date()
            .map(|d| (today - d).num_days().max(0))
    }
}
