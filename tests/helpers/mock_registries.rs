// ==========================================
// 集成测试辅助 - 内存版协作方桩
// ==========================================
// 说明: 实现外部协作方契约,数据存内存;
//       支持注入一次性瞬态故障以测试重试路径
// ==========================================

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use predictive_maint::domain::{Equipment, SopProcedure, Technician};
use predictive_maint::repository::{
    EquipmentRegistry, RepositoryError, RepositoryResult, SopRegistry, TechnicianDirectory,
};

// ==========================================
// 设备台账桩
// ==========================================
pub struct InMemoryEquipmentRegistry {
    equipment: Mutex<BTreeMap<String, Equipment>>,
    fail_next_transient: AtomicBool,
}

impl InMemoryEquipmentRegistry {
    pub fn new() -> Self {
        Self {
            equipment: Mutex::new(BTreeMap::new()),
            fail_next_transient: AtomicBool::new(false),
        }
    }

    pub fn put(&self, equipment: Equipment) {
        self.equipment
            .lock()
            .unwrap()
            .insert(equipment.equipment_id.clone(), equipment);
    }

    /// 注入一次瞬态故障 (下一次调用失败,之后恢复)
    pub fn fail_next_call_transiently(&self) {
        self.fail_next_transient.store(true, Ordering::SeqCst);
    }

    fn maybe_fail(&self) -> RepositoryResult<()> {
        if self.fail_next_transient.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::DependencyUnavailable {
                collaborator: "equipment-registry".to_string(),
                message: "injected transient failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EquipmentRegistry for InMemoryEquipmentRegistry {
    async fn get_equipment(&self, equipment_id: &str) -> RepositoryResult<Equipment> {
        self.maybe_fail()?;
        self.equipment
            .lock()
            .unwrap()
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Equipment".to_string(),
                id: equipment_id.to_string(),
            })
    }

    async fn list_equipment(&self) -> RepositoryResult<Vec<Equipment>> {
        self.maybe_fail()?;
        Ok(self.equipment.lock().unwrap().values().cloned().collect())
    }
}

// ==========================================
// 技师名录桩
// ==========================================
pub struct InMemoryTechnicianDirectory {
    technicians: Mutex<Vec<Technician>>,
}

impl InMemoryTechnicianDirectory {
    pub fn new() -> Self {
        Self {
            technicians: Mutex::new(Vec::new()),
        }
    }

    pub fn put(&self, technician: Technician) {
        self.technicians.lock().unwrap().push(technician);
    }
}

#[async_trait]
impl TechnicianDirectory for InMemoryTechnicianDirectory {
    async fn list_active_technicians(&self) -> RepositoryResult<Vec<Technician>> {
        Ok(self
            .technicians
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.active)
            .cloned()
            .collect())
    }
}

// ==========================================
// SOP 登记表桩
// ==========================================
pub struct InMemorySopRegistry {
    procedures: Mutex<Vec<SopProcedure>>,
}

impl InMemorySopRegistry {
    pub fn new() -> Self {
        Self {
            procedures: Mutex::new(Vec::new()),
        }
    }

    pub fn put(&self, procedure: SopProcedure) {
        self.procedures.lock().unwrap().push(procedure);
    }
}

#[async_trait]
impl SopRegistry for InMemorySopRegistry {
    async fn find_procedures_for_equipment(
        &self,
        equipment_id: &str,
    ) -> RepositoryResult<Vec<SopProcedure>> {
        Ok(self
            .procedures
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.dependencies.iter().any(|d| d.equipment_id == equipment_id))
            .cloned()
            .collect())
    }
}
