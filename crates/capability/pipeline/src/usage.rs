//! 按本地日期汇总用电量。
//!
//! `totalpower` 是累计读数：相邻两次历史条目之间的正增量计入后一条目所在的日期，
//! 读数回退（设备重置）与缺少 `totalpower` 的记录不计入。

use chrono::NaiveDate;
use domain::HistoryEntry;
use meter_normalize::round_cost;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub total_usage: f64,
}

/// 按日期升序返回每日所有设备的用电量之和。时间戳无法解析的条目跳过。
pub fn daily_usage(entries: &[HistoryEntry]) -> Vec<DailyUsage> {
    let mut last_total: HashMap<&str, f64> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for entry in entries {
        let Some(date) = domain::local_date(&entry.time) else {
            continue;
        };
        let day = per_day.entry(date).or_insert(0.0);
        for record in entry.data.values().filter_map(|entry| entry.record()) {
            let reading = &record.reading;
            let Some(total_power) = reading.total_power else {
                continue;
            };
            if let Some(previous) = last_total.insert(&reading.device_id, total_power) {
                let delta = total_power - previous;
                if delta > 0.0 {
                    *day += delta;
                }
            }
        }
    }

    per_day
        .into_iter()
        .map(|(date, total)| DailyUsage {
            date,
            total_usage: round_cost(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DeviceReading, NormalizedEntry, NormalizedRecord};

    fn entry(time: &str, readings: &[(&str, f64)]) -> HistoryEntry {
        let data = readings
            .iter()
            .map(|(device, total)| {
                let mut reading = DeviceReading::new(*device, None);
                reading.total_power = Some(*total);
                (
                    device.to_string(),
                    NormalizedEntry::Record(NormalizedRecord {
                        reading,
                        is_active: false,
                        calculated_cost: 0.0,
                    }),
                )
            })
            .collect();
        HistoryEntry::new(time, data)
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn sums_positive_deltas_per_day() {
        let entries = vec![
            entry("2024-03-01T10:00:00+05:30", &[("A", 100.0), ("B", 10.0)]),
            entry("2024-03-01T12:00:00+05:30", &[("A", 105.5), ("B", 12.0)]),
            entry("2024-03-02T09:00:00+05:30", &[("A", 110.0), ("B", 11.0)]),
        ];
        let usage = daily_usage(&entries);
        assert_eq!(
            usage,
            vec![
                DailyUsage {
                    date: date("2024-03-01"),
                    total_usage: 7.5,
                },
                DailyUsage {
                    date: date("2024-03-02"),
                    total_usage: 4.5,
                },
            ]
        );
    }

    #[test]
    fn device_absent_in_between_keeps_baseline() {
        let entries = vec![
            entry("2024-03-01T10:00:00+05:30", &[("A", 100.0)]),
            entry("2024-03-01T11:00:00+05:30", &[]),
            entry("2024-03-01T12:00:00+05:30", &[("A", 103.0)]),
        ];
        assert_eq!(daily_usage(&entries)[0].total_usage, 3.0);
    }

    #[test]
    fn unparsable_time_is_skipped() {
        let entries = vec![entry("yesterday", &[("A", 100.0)])];
        assert!(daily_usage(&entries).is_empty());
    }
}
