//! End-to-end adder tests: build, simulate, and analyze complete circuits.

use gatewave_cells::{Adder, Clock, FullAdder, FullAdderCell, HalfAdder, RippleAdder};
use gatewave_common::{Bit, SimTime};
use gatewave_sim::{Circuit, ModuleId, VcdWriter, RUN_TO_COMPLETION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ripple8(c: &mut Circuit) -> ModuleId {
    RippleAdder::new(8, FullAdder::new()).build(c)
}

/// Clears the adder, drives the operands, and runs it to completion.
fn add(c: &mut Circuit, adder: ModuleId, x: u64, y: u64, ci: u64) -> (Option<u64>, Option<u64>) {
    c.reset(adder);
    c.assign_value(c.input(adder, "X"), x);
    c.assign_value(c.input(adder, "Y"), y);
    c.assign_value(c.input(adder, "Ci"), ci);
    c.simulate(adder);
    (c.value(c.output(adder, "S")), c.value(c.output(adder, "Co")))
}

fn bit(v: u64) -> Bit {
    if v == 0 {
        Bit::Low
    } else {
        Bit::High
    }
}

// ---------------------------------------------------------------------------
// Functional results
// ---------------------------------------------------------------------------

#[test]
fn ripple_adder_sums_two_bytes() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    assert_eq!(add(&mut c, adder, 0b0110_0110, 0b0010_1010, 0), (Some(0b1001_0000), Some(0)));
}

#[test]
fn carry_in_ripples_through_every_stage() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    assert_eq!(add(&mut c, adder, 255, 0, 1), (Some(0), Some(1)));
}

#[test]
fn ripple_of_leaf_full_adders() {
    let mut c = Circuit::new();
    let adder = RippleAdder::new(8, FullAdderCell::new()).build(&mut c);
    assert_eq!(add(&mut c, adder, 102, 42, 0), (Some(144), Some(0)));
}

#[test]
fn sum_appears_only_after_the_carry_chain() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    add(&mut c, adder, 255, 0, 1);
    let settled = c.last_time(c.output(adder, "S")).expect("sum was driven");
    let msb = c.output_range(adder, "S", 7, 7);
    assert_eq!(c.last_time(msb), Some(settled));
    assert!(c.last_time(c.output_range(adder, "S", 0, 0)) < Some(settled));
}

#[test]
fn repeated_runs_after_reset() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..16 {
        let x = rng.gen_range(0..256u64);
        let y = rng.gen_range(0..256u64);
        let ci = rng.gen_range(0..2u64);
        let total = x + y + ci;
        assert_eq!(
            add(&mut c, adder, x, y, ci),
            (Some(total & 0xff), Some(total >> 8)),
            "{x} + {y} + {ci}"
        );
    }
}

#[test]
fn carry_in_toggle_settles_on_the_latest_sum() {
    let mut c = Circuit::new();
    let clk = c.add_leaf(Clock::new(1, 20, 20, 0));
    let fa = c.add_leaf(FullAdderCell::new());
    c.connect(c.output(clk, "CLK"), c.input(fa, "Ci"));
    c.assign(c.input(fa, "X"), Bit::High);
    c.assign(c.input(fa, "Y"), Bit::Low);
    c.sim_start([clk, fa], RUN_TO_COMPLETION);

    // The operand change at 0 takes the slow path to S; the carry-in fall at
    // 20 takes the fast one and must win.
    let s = c.output(fa, "S");
    assert_eq!(c.value(s), Some(1));
    assert_eq!(c.last_time(s), Some(SimTime::from_ticks(82)));
    assert_eq!(c.value(c.output(fa, "Co")), Some(0));
}

#[test]
fn half_adder_truth_table() {
    for x in 0..2u64 {
        for y in 0..2u64 {
            let mut c = Circuit::new();
            let ha = c.add_leaf(HalfAdder::new());
            c.assign(c.input(ha, "X"), bit(x));
            c.assign(c.input(ha, "Y"), bit(y));
            c.simulate(ha);
            assert_eq!(c.value(c.output(ha, "S")), Some(x ^ y), "S of {x},{y}");
            assert_eq!(c.value(c.output(ha, "C")), Some(x & y), "C of {x},{y}");
        }
    }
}

#[test]
fn full_adder_truth_tables() {
    let mut c = Circuit::new();
    let leaf = c.add_leaf(FullAdderCell::new());
    let composite = FullAdder::new().build(&mut c);
    for fa in [leaf, composite] {
        for n in 0..8u64 {
            let (x, y, ci) = (n & 1, (n >> 1) & 1, n >> 2);
            let expected = (Some(x ^ y ^ ci), Some(u64::from(x + y + ci >= 2)));
            assert_eq!(add(&mut c, fa, x, y, ci), expected, "{} on {x},{y},{ci}", c.label(fa));
        }
    }
}

// ---------------------------------------------------------------------------
// Static analysis
// ---------------------------------------------------------------------------

#[test]
fn critical_path_grows_with_width() {
    let mut previous = 0;
    for n in [1, 2, 4, 8] {
        let mut c = Circuit::new();
        let adder = RippleAdder::new(n, FullAdder::new()).build(&mut c);
        let path = c.critical_path(adder).expect("adder has timing arcs");
        assert_eq!(path.input, 0, "width {n} starts at X[0]");
        assert_eq!(path.output, n - 1, "width {n} ends at the top sum bit");
        assert!(path.delay >= previous, "width {n}");
        previous = path.delay;

        let co = n;
        let worst_to_co = (0..2 * n + 1).filter_map(|i| c.delay(adder, i, co)).max();
        assert_eq!(c.delay(adder, 0, co), worst_to_co);
        assert_eq!(c.delay(adder, n, co), worst_to_co);
    }
}

#[test]
fn eight_bit_ripple_timing() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    // X[0] to Co of stage 0, six middle carries, then Ci to S of stage 7.
    assert_eq!(c.delay(adder, 0, 7), Some(121 + 6 * 50 + 62));
    assert_eq!(c.delay(adder, 16, 8), Some(8 * 50 - 9));
    // Only bits at or above an operand bit depend on it.
    assert_eq!(c.delay(adder, 3, 2), None);
    assert_eq!(c.delay(adder, 3, 3), Some(133));
}

#[test]
fn area_and_load() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    assert_eq!(c.area(adder), 8.0 * 14.0);
    assert_eq!(c.load(adder, 0), 9);
    assert_eq!(c.load(adder, 16), 9);
}

#[test]
fn power_after_a_run() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    add(&mut c, adder, 102, 42, 0);
    let stats = c.sim_power_stats(adder);
    assert!(stats.average > 0.0);
    assert!(stats.peak >= stats.average);

    c.reset(adder);
    let idle = c.sim_power_stats(adder);
    assert_eq!(idle.average, 0.0);
    assert_eq!(idle.peak, 0.0);
}

// ---------------------------------------------------------------------------
// Waveform dump
// ---------------------------------------------------------------------------

#[test]
fn vcd_dump_of_an_addition() {
    let mut c = Circuit::new();
    let adder = ripple8(&mut c);
    add(&mut c, adder, 102, 42, 0);
    let end = c.last_output_time(adder).expect("outputs were driven");
    assert!(end > SimTime::ZERO);

    let mut vcd = VcdWriter::with_scope("adder");
    for name in ["X", "Y", "S", "Co"] {
        vcd.add_signal(&c, adder, name).unwrap();
    }
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("adder.vcd");
    vcd.write_to_file(&c, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("$scope module adder $end"));
    assert!(text.contains("$var wire 8 ! RippleAdder<8,FullAdder>.X $end"));
    assert!(text.contains("$var wire 1 $ RippleAdder<8,FullAdder>.Co $end"));
    assert!(text.contains("b01100110 !"));
    assert!(text.contains("b00101010 \""));
    assert!(text.contains(&format!("#{}\n", end.ticks())));
    assert!(text.contains("b10010000 #"));
}
