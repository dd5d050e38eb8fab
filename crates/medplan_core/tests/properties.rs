use chrono::{Days, NaiveDate};
use medplan_core::date::day_key;
use medplan_core::progress::{self, Tier};
use medplan_core::schedule::{self, TOTAL_DAYS};
use medplan_core::transfer;
use proptest::prelude::*;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..80_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

proptest! {
    #[test]
    fn sixty_consecutive_days_from_start(start in any_date(), today in any_date()) {
        let generated = schedule::generate(&day_key(start).to_string(), today).unwrap();
        prop_assert_eq!(generated.rows.len(), TOTAL_DAYS as usize);
        prop_assert_eq!(generated.rows[0].date, start);
        for pair in generated.rows.windows(2) {
            prop_assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
            prop_assert!(pair[0].key < pair[1].key);
        }
    }

    #[test]
    fn completed_iff_not_after_today(start in any_date(), today in any_date()) {
        let generated = schedule::generate(&day_key(start).to_string(), today).unwrap();
        let today_key = day_key(today);
        for row in &generated.rows {
            prop_assert_eq!(row.completed, row.key <= today_key);
            prop_assert_eq!(generated.plan.days.get(&row.key), Some(&row.completed));
        }
    }

    #[test]
    fn checking_one_more_day_never_lowers_progress(start in any_date(), today in any_date(), pick in 0usize..60) {
        let generated = schedule::generate(&day_key(start).to_string(), today).unwrap();
        let before = progress::evaluate(&generated.plan.days);
        let mut days = generated.plan.days.clone();
        if let Some(flag) = days.values_mut().nth(pick) {
            *flag = true;
        }
        let after = progress::evaluate(&days);
        prop_assert!(after.completed_count >= before.completed_count);
        prop_assert!(after.tier >= before.tier);
        let expected = match after.completed_count {
            60 => Tier::Complete,
            45..=59 => Tier::Warning,
            _ => Tier::Normal,
        };
        prop_assert_eq!(after.tier, expected);
    }

    #[test]
    fn backup_round_trips(start in any_date(), today in any_date()) {
        let plan = schedule::generate(&day_key(start).to_string(), today).unwrap().plan;
        let bytes = transfer::to_bytes(&plan).unwrap();
        prop_assert_eq!(transfer::import(&bytes).unwrap(), plan);
    }
}
