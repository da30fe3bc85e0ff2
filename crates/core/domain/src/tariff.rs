//! 阶梯电价表。
//!
//! `ranges[i]` 形如 `"min-max"`，与 `monthly_cost[i]`、`unit_price[i]` 共同组成一档。
//! 电价表只能整体替换固定费用与单价，档位范围本身不可通过更新接口修改。

use serde::{Deserialize, Serialize};

/// 电价表校验错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TariffError {
    #[error("malformed range at tier {index}: {range:?}")]
    MalformedRange { index: usize, range: String },
    #[error("expected {expected} {field} values, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid {field} at tier {index}: {value}")]
    InvalidPrice {
        field: &'static str,
        index: usize,
        value: f64,
    },
}

/// 持久化的电价表（与仪表盘的 JSON 结构一致）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub ranges: Vec<String>,
    pub monthly_cost: Vec<f64>,
    pub unit_price: Vec<f64>,
}

/// 解析后的一档电价。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub min: f64,
    pub max: f64,
    pub fixed_cost: f64,
    pub unit_price: f64,
}

impl Tier {
    pub fn contains(&self, usage: f64) -> bool {
        self.min <= usage && usage <= self.max
    }

    /// 固定费用 + 单价 × 用量（全精度，不做舍入）。
    pub fn cost(&self, usage: f64) -> f64 {
        self.fixed_cost + self.unit_price * usage
    }
}

impl RateTable {
    /// 校验并解析所有档位。
    pub fn tiers(&self) -> Result<Vec<Tier>, TariffError> {
        let expected = self.ranges.len();
        check_len("monthlyCost", expected, self.monthly_cost.len())?;
        check_len("unitPrice", expected, self.unit_price.len())?;

        self.ranges
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let (min, max) = parse_range(index, range)?;
                let fixed_cost = check_price("monthlyCost", index, self.monthly_cost[index])?;
                let unit_price = check_price("unitPrice", index, self.unit_price[index])?;
                Ok(Tier {
                    min,
                    max,
                    fixed_cost,
                    unit_price,
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), TariffError> {
        self.tiers().map(|_| ())
    }

    /// 用新的固定费用与单价替换当前表，档位范围保持不变。
    pub fn with_prices(
        &self,
        monthly_cost: Vec<f64>,
        unit_price: Vec<f64>,
    ) -> Result<Self, TariffError> {
        let updated = Self {
            ranges: self.ranges.clone(),
            monthly_cost,
            unit_price,
        };
        updated.validate()?;
        Ok(updated)
    }
}

impl Default for RateTable {
    /// 首次启动时写入的居民用电阶梯。
    fn default() -> Self {
        Self {
            ranges: ["0-30", "31-60", "61-90", "91-120", "121-180", "181-250"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            monthly_cost: vec![150.0, 300.0, 400.0, 1000.0, 1500.0, 2000.0],
            unit_price: vec![8.0, 20.0, 30.0, 50.0, 50.0, 75.0],
        }
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), TariffError> {
    if expected != actual {
        return Err(TariffError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_price(field: &'static str, index: usize, value: f64) -> Result<f64, TariffError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TariffError::InvalidPrice {
            field,
            index,
            value,
        });
    }
    Ok(value)
}

fn parse_range(index: usize, range: &str) -> Result<(f64, f64), TariffError> {
    let malformed = || TariffError::MalformedRange {
        index,
        range: range.to_string(),
    };
    let (min, max) = range.split_once('-').ok_or_else(malformed)?;
    let min = min.trim().parse::<f64>().map_err(|_| malformed())?;
    let max = max.trim().parse::<f64>().map_err(|_| malformed())?;
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(malformed());
    }
    Ok((min, max))
}
