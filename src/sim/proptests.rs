//! Property tests for the simulation models

use proptest::prelude::*;

use super::history::{HistoryBuffer, HistoryEntry};
use super::incline::{self, InclineParams};
use super::induction::{self, FieldRegion, InductionParams, InductionSim, Polarity};
use super::tick::Scenario;
use crate::settings::{ClockConfig, InductionConfig};

const FIELD: FieldRegion = FieldRegion {
    start: 3.2,
    end: 6.2,
};

fn induction_params() -> impl Strategy<Value = InductionParams> {
    (0.0f64..2.0, 0.05f64..2.0, 0.1f64..3.0, 0.1f64..10.0, 0.0f64..3.0).prop_map(
        |(field_strength, height, width, resistance, speed)| InductionParams {
            field_strength,
            height,
            width,
            resistance,
            speed,
            ..Default::default()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    // Overlap never exceeds the frame or the field
    #[test]
    fn overlap_is_bounded(x in -100.0f64..100.0, w in 0.01f64..10.0) {
        let overlap = induction::overlap_width(x, w, FIELD);
        prop_assert!(overlap >= 0.0);
        prop_assert!(overlap <= w + 1e-12);
        prop_assert!(overlap <= FIELD.width() + 1e-12);
    }

    // Polarity only flips signs and the current label
    #[test]
    fn polarity_flip_is_symmetric(params in induction_params(), x in 0.0f64..8.0) {
        let mut flipped = params.clone();
        flipped.polarity = Polarity::OutOfPage;
        let a = induction::measure(&params, FIELD, x);
        let b = induction::measure(&flipped, FIELD, x);

        prop_assert_eq!(a.emf, -b.emf);
        prop_assert_eq!(a.current, -b.current);
        prop_assert_eq!(a.flux.abs(), b.flux.abs());
        prop_assert_eq!(a.force, b.force);
        prop_assert_eq!(a.status, b.status);
        if a.direction != induction::CurrentDirection::None {
            prop_assert_ne!(a.direction, b.direction);
        } else {
            prop_assert_eq!(b.direction, induction::CurrentDirection::None);
        }
    }

    // Linear motion does not depend on how time is sliced
    #[test]
    fn position_is_additive(
        speed in 0.01f64..1.0,
        dts in prop::collection::vec(0.0f64..0.033, 1..200),
    ) {
        let config = InductionConfig {
            start_x: 0.0,
            initial: InductionParams { speed, ..Default::default() },
            ..Default::default()
        };
        let mut sim = InductionSim::new(config, &ClockConfig::default());
        sim.play();
        for dt in &dts {
            sim.tick(*dt);
        }
        let total: f64 = dts.iter().sum();
        prop_assert!((sim.state().x - speed * total).abs() < 1e-9);
        prop_assert!((sim.state().t - total).abs() < 1e-9);
    }

    // Capacity holds and eviction is FIFO
    #[test]
    fn history_evicts_in_order(capacity in 1usize..64, extra in 0usize..64) {
        let mut history = HistoryBuffer::new(capacity);
        let total = capacity + extra;
        for i in 0..total {
            history.push(HistoryEntry {
                t: i as f64,
                current: 0.0,
                emf: 0.0,
                flux: 0.0,
                force: 0.0,
                x: 0.0,
            });
            prop_assert!(history.len() <= capacity);
        }
        let times: Vec<f64> = history.iter().map(|e| e.t).collect();
        let expected: Vec<f64> = (extra..total).map(|i| i as f64).collect();
        prop_assert_eq!(times, expected);
    }

    // Without friction or push the block accelerates at exactly g·sinθ
    #[test]
    fn free_slide_acceleration(deg in 0.0f64..89.99, mass in 0.1f64..50.0) {
        let params = InclineParams { angle_deg: deg, mass, ..Default::default() };
        prop_assert_eq!(incline::acceleration(&params, 10.0), 10.0 * deg.to_radians().sin());
    }

    // Friction at or above tanθ holds the block
    #[test]
    fn friction_holds_block(deg in 0.0f64..80.0, margin in 0.0f64..1.0) {
        let theta = deg.to_radians();
        let params = InclineParams {
            angle_deg: deg,
            friction_on: true,
            friction_coeff: theta.tan() + margin,
            ..Default::default()
        };
        prop_assert_eq!(incline::acceleration(&params, 10.0), 0.0);
    }
}
