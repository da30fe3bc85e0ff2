//! 阶梯电费计算。

use domain::Tier;

/// 按档位顺序找到第一个覆盖用量的档位计费；
/// 没有档位覆盖时沿用最后一档外推，空表费用为 0。
pub fn calculate_cost(total_power: f64, tiers: &[Tier]) -> f64 {
    let Some(last) = tiers.last() else {
        return 0.0;
    };
    let tier = tiers
        .iter()
        .find(|tier| tier.contains(total_power))
        .unwrap_or(last);
    round_cost(tier.cost(total_power))
}

/// 保留两位小数。
pub fn round_cost(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::RateTable;

    fn tiers() -> Vec<Tier> {
        RateTable {
            ranges: vec!["0-60".to_string(), "61-120".to_string()],
            monthly_cost: vec![5.0, 10.0],
            unit_price: vec![2.0, 3.0],
        }
        .tiers()
        .expect("tiers")
    }

    #[test]
    fn cost_within_first_tier() {
        assert_eq!(calculate_cost(50.0, &tiers()), 105.0);
    }

    #[test]
    fn cost_within_second_tier() {
        assert_eq!(calculate_cost(90.0, &tiers()), 280.0);
    }

    #[test]
    fn cost_beyond_all_tiers_uses_last_tier() {
        assert_eq!(calculate_cost(500.0, &tiers()), 1510.0);
    }

    #[test]
    fn cost_in_gap_uses_last_tier() {
        // 60 与 61 之间的空隙没有档位覆盖。
        assert_eq!(calculate_cost(60.5, &tiers()), round_cost(10.0 + 3.0 * 60.5));
    }

    #[test]
    fn cost_of_empty_table_is_zero() {
        assert_eq!(calculate_cost(42.0, &[]), 0.0);
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(calculate_cost(60.0, &tiers()), 125.0);
        assert_eq!(calculate_cost(61.0, &tiers()), 193.0);
    }

    #[test]
    fn first_matching_tier_wins_regardless_of_later_tiers() {
        let tiers = RateTable {
            ranges: vec!["0-100".to_string(), "0-1000".to_string(), "50-60".to_string()],
            monthly_cost: vec![1.0, 100.0, 1000.0],
            unit_price: vec![1.0, 10.0, 100.0],
        }
        .tiers()
        .expect("tiers");
        assert_eq!(calculate_cost(55.0, &tiers), 56.0);
    }

    #[test]
    fn result_is_rounded_to_cents() {
        let tiers = RateTable {
            ranges: vec!["0-10".to_string()],
            monthly_cost: vec![0.0],
            unit_price: vec![0.333],
        }
        .tiers()
        .expect("tiers");
        assert_eq!(calculate_cost(1.0, &tiers), 0.33);
    }
}
