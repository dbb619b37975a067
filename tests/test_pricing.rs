use alloy::primitives::U256;

use fleet_commander::DecayType;
use fleet_commander::auction::pricing::current_price;

// ── Constants ────────────────────────────────────────────────────────

const DAY: u64 = 86_400;
const START: u64 = 1_700_000_000;

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn price(now: u64, decay: DecayType) -> U256 {
    current_price(ether(100), ether(50), START, START + DAY, now, decay).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn price_is_monotonically_non_increasing() {
    for decay in [DecayType::Linear, DecayType::Quadratic] {
        let mut last = price(START, decay);
        // Walk the whole day in 10-minute steps.
        for t in (START..=START + DAY).step_by(600) {
            let p = price(t, decay);
            assert!(p <= last, "{decay:?} price rose at t={t}: {p} > {last}");
            last = p;
        }
    }
}

#[test]
fn boundary_prices_are_exact() {
    for decay in [DecayType::Linear, DecayType::Quadratic] {
        assert_eq!(price(START, decay), ether(100));
        assert_eq!(price(START + DAY, decay), ether(50));
        assert_eq!(price(START + DAY + 12 * 3600, decay), ether(50));
        // Before the start the clock clamps to the start.
        assert_eq!(price(START - 500, decay), ether(100));
    }
}

#[test]
fn linear_half_way_is_seventy_five() {
    assert_eq!(price(START + DAY / 2, DecayType::Linear), ether(75));
}

#[test]
fn quadratic_half_way_is_sixty_two_and_a_half() {
    // end + (start-end) * (d/2)^2 / d^2 = 50 + 50 * 0.25 = 62.5 ether
    let expected = ether(50) + ether(50) / U256::from(4u64);
    assert_eq!(price(START + DAY / 2, DecayType::Quadratic), expected);
}

#[test]
fn quadratic_sits_below_linear_inside_the_interval() {
    // Convex decay drops fast up front and coasts into the floor: at
    // every interior point the quadratic price is strictly below the
    // linear one.
    for t in (START + 1..START + DAY).step_by(3600) {
        assert!(price(t, DecayType::Quadratic) < price(t, DecayType::Linear));
    }
}

#[test]
fn long_auction_squared_term_does_not_overflow() {
    // 30 days is the longest duration the engine expects; the squared
    // remaining-time term must survive it.
    let duration = 30 * DAY;
    let p = current_price(
        ether(1_000_000),
        ether(1),
        START,
        START + duration,
        START + duration / 3,
        DecayType::Quadratic,
    )
    .unwrap();
    assert!(p < ether(1_000_000) && p > ether(1));
}
