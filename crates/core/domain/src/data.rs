use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 设备序列键：设备产生新读数时变化，只允许做相等比较。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceKey(pub Value);

impl From<i64> for SequenceKey {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for SequenceKey {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

/// 读数中按数值解析的测量字段。
const MEASUREMENT_FIELDS: [&str; 5] = ["battery", "current", "livepower", "totalpower", "voltage"];

/// 单个设备在某一时刻的原始读数。
///
/// 字段名与远端存储保持一致（`device`、`key`、`livepower` 等）。
/// 只要带字符串 `device` 字段就视为读数：缺失的测量字段保持缺失，
/// 类型不是数值的测量字段连同其他未识别字段一起保存在 `extra` 中原样透传。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DeviceReading {
    #[serde(rename = "device")]
    pub device_id: String,
    #[serde(rename = "key", skip_serializing_if = "Option::is_none")]
    pub sequence_key: Option<SequenceKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(rename = "livepower", skip_serializing_if = "Option::is_none")]
    pub live_power: Option<f64>,
    #[serde(rename = "totalpower", skip_serializing_if = "Option::is_none")]
    pub total_power: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceReading {
    pub fn new(device_id: impl Into<String>, sequence_key: Option<SequenceKey>) -> Self {
        Self {
            device_id: device_id.into(),
            sequence_key,
            battery: None,
            current: None,
            live_power: None,
            total_power: None,
            voltage: None,
            extra: Map::new(),
        }
    }
}

impl TryFrom<Map<String, Value>> for DeviceReading {
    type Error = DecodeError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let device_id = match fields.remove("device") {
            Some(Value::String(device_id)) => device_id,
            _ => return Err(DecodeError::NotAReading),
        };
        let sequence_key = match fields.remove("key") {
            None | Some(Value::Null) => None,
            Some(key) => Some(SequenceKey(key)),
        };
        let [battery, current, live_power, total_power, voltage] =
            MEASUREMENT_FIELDS.map(|field| take_number(&mut fields, field));
        Ok(Self {
            device_id,
            sequence_key,
            battery,
            current,
            live_power,
            total_power,
            voltage,
            extra: fields,
        })
    }
}

/// 取出数值字段；非数值保留在原 map 中。
fn take_number(fields: &mut Map<String, Value>, field: &str) -> Option<f64> {
    let value = fields.get(field)?.as_f64()?;
    fields.remove(field);
    Some(value)
}

/// 远端存储根节点下的一项：设备读数或无法识别的原始值。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoreEntry {
    Reading(DeviceReading),
    Opaque(Value),
}

impl StoreEntry {
    /// 在存储边界做一次解码：带字符串 `device` 字段的对象视为读数，其余原样保留。
    pub fn decode(raw: Value) -> Self {
        if !raw.is_object() {
            return Self::Opaque(raw);
        }
        match DeviceReading::deserialize(&raw) {
            Ok(reading) => Self::Reading(reading),
            Err(_) => Self::Opaque(raw),
        }
    }

    pub fn reading(&self) -> Option<&DeviceReading> {
        match self {
            Self::Reading(reading) => Some(reading),
            Self::Opaque(_) => None,
        }
    }
}

/// 快照解码错误。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected snapshot root: {0}")]
    UnexpectedRoot(&'static str),
    #[error("entry has no string `device` field")]
    NotAReading,
}

/// 同一时刻从远端存储取得的完整快照（根键 → 条目）。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub entries: BTreeMap<String, StoreEntry>,
}

impl Snapshot {
    /// 从远端根节点 JSON 解码；`null` 视为空快照。
    pub fn from_root(root: Value) -> Result<Self, DecodeError> {
        let object = match root {
            Value::Null => return Ok(Self::default()),
            Value::Object(object) => object,
            Value::Array(_) => return Err(DecodeError::UnexpectedRoot("array")),
            Value::Bool(_) => return Err(DecodeError::UnexpectedRoot("bool")),
            Value::Number(_) => return Err(DecodeError::UnexpectedRoot("number")),
            Value::String(_) => return Err(DecodeError::UnexpectedRoot("string")),
        };
        let entries = object
            .into_iter()
            .map(|(key, value)| (key, StoreEntry::decode(value)))
            .collect();
        Ok(Self { entries })
    }

    pub fn readings(&self) -> impl Iterator<Item = &DeviceReading> {
        self.entries.values().filter_map(StoreEntry::reading)
    }
}

/// 附加了活跃状态与电费的设备读数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    #[serde(flatten)]
    pub reading: DeviceReading,
    #[serde(rename = "deviceStatus", default)]
    pub is_active: bool,
    /// 旧版历史文件中没有该字段，读取时按 0 处理。
    #[serde(rename = "calculatedCost", default)]
    pub calculated_cost: f64,
}

/// 标准化后的快照条目；非设备条目原样透传。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedEntry {
    Record(NormalizedRecord),
    Opaque(Value),
}

impl NormalizedEntry {
    pub fn record(&self) -> Option<&NormalizedRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Opaque(_) => None,
        }
    }
}

/// 标准化后的快照（根键 → 条目）。
pub type NormalizedSnapshot = BTreeMap<String, NormalizedEntry>;

/// 历史日志中的一项：时间戳 + 当次标准化快照。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: String,
    pub data: NormalizedSnapshot,
}

impl HistoryEntry {
    pub fn new(time: impl Into<String>, data: NormalizedSnapshot) -> Self {
        Self {
            time: time.into(),
            data,
        }
    }

    /// 查找指定设备在本条目中的记录。
    pub fn record_for(&self, device_id: &str) -> Option<&NormalizedRecord> {
        self.data
            .values()
            .filter_map(NormalizedEntry::record)
            .find(|record| record.reading.device_id == device_id)
    }
}

/// 单设备历史查询的一行。
///
/// `time` 与 `status` 取自历史条目；读数中同名的透传字段在投影时丢弃，
/// 保证输出的 JSON 对象没有重复键。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceHistoryPoint {
    pub time: String,
    pub status: bool,
    #[serde(flatten)]
    pub record: NormalizedRecord,
}

impl DeviceHistoryPoint {
    pub fn new(time: impl Into<String>, mut record: NormalizedRecord) -> Self {
        record.reading.extra.remove("time");
        record.reading.extra.remove("status");
        Self {
            time: time.into(),
            status: record.is_active,
            record,
        }
    }
}
