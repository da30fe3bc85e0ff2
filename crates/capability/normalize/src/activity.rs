//! 设备活跃检测：比较相邻两次轮询的序列键。

use domain::SequenceKey;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
struct DeviceActivity {
    last_key: SequenceKey,
    is_active: bool,
}

/// 进程级活跃状态（设备 ID → 上次序列键、是否活跃），不做持久化。
#[derive(Debug, Clone, Default)]
pub struct ActivityState {
    devices: HashMap<String, DeviceActivity>,
}

impl ActivityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单步边沿检测：已有上次键且本次键不同才算活跃，随后无条件记录本次键。
    /// 本次键缺失时不创建也不修改状态，返回上次结果。
    pub fn update(&mut self, device_id: &str, current_key: Option<&SequenceKey>) -> bool {
        let Some(current_key) = current_key else {
            return self.is_active(device_id);
        };
        let is_active = self
            .devices
            .get(device_id)
            .is_some_and(|previous| previous.last_key != *current_key);
        self.devices.insert(
            device_id.to_string(),
            DeviceActivity {
                last_key: current_key.clone(),
                is_active,
            },
        );
        is_active
    }

    pub fn is_active(&self, device_id: &str) -> bool {
        self.devices
            .get(device_id)
            .is_some_and(|activity| activity.is_active)
    }

    pub fn last_key(&self, device_id: &str) -> Option<&SequenceKey> {
        self.devices.get(device_id).map(|activity| &activity.last_key)
    }

    pub fn statuses(&self) -> BTreeMap<String, bool> {
        self.devices
            .iter()
            .map(|(device_id, activity)| (device_id.clone(), activity.is_active))
            .collect()
    }

    pub fn last_keys(&self) -> BTreeMap<String, SequenceKey> {
        self.devices
            .iter()
            .map(|(device_id, activity)| (device_id.clone(), activity.last_key.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
