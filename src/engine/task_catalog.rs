// ==========================================
// 预测性维护排程系统 - 任务目录引擎
// ==========================================
// 职责: 按设备类别查表生成有序任务列表
// 输入: 设备类别 + 失效预测
// 输出: Vec<MaintenanceTask> (排程内任务ID唯一)
// ==========================================
// 规则: 失效概率 > 0.6 追加"关键部件更换"任务
//       (非零备件成本 + 上锁挂牌安全要求)
// ==========================================

use crate::config::catalog::{TaskCatalog, TaskTemplate};
use crate::config::params::CatalogParams;
use crate::domain::prediction::FailurePrediction;
use crate::domain::task::MaintenanceTask;
use crate::engine::error::{EngineError, EngineResult};
use tracing::debug;

// ==========================================
// TaskCatalogEngine - 任务目录引擎
// ==========================================
/// 任务目录引擎 (无状态,目录注入)
pub struct TaskCatalogEngine {
    catalog: TaskCatalog,
    params: CatalogParams,
}

impl TaskCatalogEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - catalog: 注入的任务目录
    /// - params: 目录参数
    pub fn new(catalog: TaskCatalog, params: CatalogParams) -> Self {
        Self { catalog, params }
    }

    /// 生成维护任务列表
    ///
    /// # 参数
    /// - category: 设备类别 (未知类别回退到兜底模板)
    /// - prediction: 失效预测 (决定是否追加关键部件更换)
    ///
    /// # 返回
    /// 有序任务列表,任务ID在排程内唯一 (T01 起顺序编号)
    pub fn generate(
        &self,
        category: &str,
        prediction: &FailurePrediction,
    ) -> EngineResult<Vec<MaintenanceTask>> {
        let templates = self.catalog.templates_for(category);

        let mut tasks: Vec<MaintenanceTask> = templates
            .iter()
            .enumerate()
            .map(|(i, tpl)| Self::materialize(tpl, i + 1))
            .collect();

        // 高失效概率: 追加关键部件更换
        if prediction.probability_of_failure > self.params.critical_task_probability_threshold {
            let task = Self::materialize(&self.catalog.critical_replacement, tasks.len() + 1);

            // 契约守卫: 关键部件更换必须带非零备件成本
            if task.parts_cost() <= 0.0 {
                return Err(EngineError::computation(
                    "关键部件更换任务备件成本为零",
                    format!(
                        "equipment_id={}, probability={}",
                        prediction.equipment_id, prediction.probability_of_failure
                    ),
                ));
            }
            tasks.push(task);
        }

        debug!(
            category = category,
            task_count = tasks.len(),
            probability = prediction.probability_of_failure,
            "任务目录生成完成"
        );

        Ok(tasks)
    }

    /// 模板实例化 (分配排程内任务ID)
    fn materialize(tpl: &TaskTemplate, seq: usize) -> MaintenanceTask {
        MaintenanceTask {
            task_id: format!("T{:02}", seq),
            name: tpl.name.clone(),
            description: tpl.description.clone(),
            estimated_minutes: tpl.estimated_minutes,
            required_skills: tpl.required_skills.clone(),
            tools: tpl.tools.clone(),
            parts: tpl.parts.clone(),
            safety_requirements: tpl.safety_requirements.clone(),
        }
    }
}
