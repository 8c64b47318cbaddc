//! Loops, local variable layout, and arithmetic on fixed widths

use super::{body, Specimens};
use crate::jvm::model::Method;
use crate::jvm::{BaseType, Error, FieldType, LocalsLayout};
use crate::runtime::{dcmpg, dcmpl, narrow_int, Value};
use std::iter;

/// Where a counting loop ended up
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Induction<T> {
    /// Value of the induction variable when the loop exited
    pub last: T,

    /// Number of times the loop body ran
    pub increments: u64,
}

/// `for (i = 0; i < bound; ++i) {}`
pub fn spin_int(bound: i32) -> Induction<i32> {
    let mut i: i32 = 0;
    let mut increments = 0;
    while i < bound {
        i = i.wrapping_add(1);
        increments += 1;
    }
    Induction {
        last: i,
        increments,
    }
}

/// `++s` on a `short`: add in `int`, then narrow back with `i2s`
pub fn next_short(s: i32) -> i32 {
    narrow_int(BaseType::Short, s.wrapping_add(1))
}

/// Successive values of a `short` induction variable starting at zero
///
/// Wraps from `32767` to `-32768` and keeps going.
pub fn short_inductions() -> impl Iterator<Item = i32> {
    iter::successors(Some(0), |s| Some(next_short(*s)))
}

/// `for (s = 0; s < bound; ++s) {}` with `short s`
///
/// The comparison widens `s` to `int`, but the increment wraps at 16 bits. A bound above
/// `i16::MAX` is never reached, so the loop does not terminate.
pub fn spin_short(bound: i32) -> Induction<i16> {
    let mut s: i32 = 0;
    let mut increments = 0;
    while s < bound {
        s = next_short(s);
        increments += 1;
    }
    Induction {
        last: s as i16,
        increments,
    }
}

/// `for (d = 0; d < bound; ++d) {}`
///
/// `javac` compiles `d < bound` to `dcmpg` so that a NaN bound exits immediately. An infinite
/// bound never terminates.
pub fn spin_double(bound: f64) -> Induction<f64> {
    let mut d: f64 = 0.0;
    let mut increments = 0;
    while dcmpg(d, bound) < 0 {
        d += 1.0;
        increments += 1;
    }
    Induction {
        last: d,
        increments,
    }
}

/// Locals written by `useManyNumeric`
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ManyNumeric {
    pub i: i32,
    pub j: i32,
    pub l1: i64,
    pub l2: i64,
    pub d: f64,
}

/// Constants of `useManyNumeric`, as `javac` pushes them
///
/// `0xffffffff` is a `long` literal here, so `l2` is `4294967295` and not `-1`.
pub fn use_many_numeric() -> ManyNumeric {
    ManyNumeric {
        i: 100,
        j: 1000000,
        l1: 1,
        l2: 0xffff_ffff,
        d: 2.2,
    }
}

/// Round `i` up to a multiple of `grain` (which should be a power of two)
pub fn align2grain(i: i32, grain: i32) -> i32 {
    i.wrapping_add(grain).wrapping_sub(1) & !grain.wrapping_sub(1)
}

/// `d < 100.0 ? 1 : -1`
pub fn less_than100(d: f64) -> i32 {
    if dcmpg(d, 100.0) < 0 {
        1
    } else {
        -1
    }
}

/// `d > 100.0 ? 1 : -1`
pub fn greater_than100(d: f64) -> i32 {
    if dcmpl(d, 100.0) > 0 {
        1
    } else {
        -1
    }
}

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Result<Vec<Method<'g>>, Error> {
    let spin = &specimens.members.spin;
    let mut methods = vec![];

    // public void spin() { int i; for (i = 0; i < 100; ++i) {} }
    let mut locals = LocalsLayout::for_method(&spin.spin)?;
    let i = locals.declare(FieldType::int())?;
    methods.push(
        Method::with_body(
            spin.spin,
            body(move |_vm, frame| {
                frame.istore(i, 0)?;
                while frame.iload(i)? < 100 {
                    frame.iinc(i, 1)?;
                }
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // public void spinDouble() { double d; for (d = 0; d < 100.0; ++d) {} }
    let mut locals = LocalsLayout::for_method(&spin.spin_double)?;
    let d = locals.declare(FieldType::double())?;
    methods.push(
        Method::with_body(
            spin.spin_double,
            body(move |_vm, frame| {
                frame.dstore(d, 0.0)?;
                while dcmpg(frame.dload(d)?, 100.0) < 0 {
                    frame.dstore(d, frame.dload(d)? + 1.0)?;
                }
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // public double doubleLocals(double d1, double d2) { return d1 + d2; }
    methods.push(Method::with_body(
        spin.double_locals,
        body(|_vm, frame| Ok(Some(Value::Double(frame.dload(1)? + frame.dload(3)?)))),
    ));

    // public void spinShort() { short s; for (s = 0; s < 100; ++s) {} }
    let mut locals = LocalsLayout::for_method(&spin.spin_short)?;
    let s = locals.declare(FieldType::short())?;
    methods.push(
        Method::with_body(
            spin.spin_short,
            body(move |_vm, frame| {
                frame.istore(s, 0)?;
                while frame.iload(s)? < 100 {
                    frame.istore(s, next_short(frame.iload(s)?))?;
                }
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // int align2grain(int i, int grain) { return ((i + grain - 1) & ~(grain - 1)); }
    methods.push(Method::with_body(
        spin.align2grain,
        body(|_vm, frame| {
            let aligned = align2grain(frame.iload(1)?, frame.iload(2)?);
            Ok(Some(Value::Int(aligned)))
        }),
    ));

    // void useManyNumeric() {
    //     int i = 100; int j = 1000000;
    //     long l1 = 1; long l2 = 0xffffffff;
    //     double d = 2.2;
    // }
    let mut locals = LocalsLayout::for_method(&spin.use_many_numeric)?;
    let i = locals.declare(FieldType::int())?;
    let j = locals.declare(FieldType::int())?;
    let l1 = locals.declare(FieldType::long())?;
    let l2 = locals.declare(FieldType::long())?;
    let d = locals.declare(FieldType::double())?;
    methods.push(
        Method::with_body(
            spin.use_many_numeric,
            body(move |_vm, frame| {
                let constants = use_many_numeric();
                frame.istore(i, constants.i)?;
                frame.istore(j, constants.j)?;
                frame.lstore(l1, constants.l1)?;
                frame.lstore(l2, constants.l2)?;
                frame.dstore(d, constants.d)?;
                log::trace!(
                    "useManyNumeric locals: i={} j={} l1={} l2={} d={}",
                    frame.iload(i)?,
                    frame.iload(j)?,
                    frame.lload(l1)?,
                    frame.lload(l2)?,
                    frame.dload(d)?
                );
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    // int lessThan100(double d) { if (d < 100.0) return 1; else return -1; }
    methods.push(Method::with_body(
        spin.less_than100,
        body(|_vm, frame| Ok(Some(Value::Int(less_than100(frame.dload(1)?))))),
    ));

    // int greaterThan100(double d) { if (d > 100.0) return 1; else return -1; }
    methods.push(Method::with_body(
        spin.greater_than100,
        body(|_vm, frame| Ok(Some(Value::Int(greater_than100(frame.dload(1)?))))),
    ));

    Ok(methods)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn int_loop() {
        assert_eq!(
            spin_int(100),
            Induction {
                last: 100,
                increments: 100
            }
        );
        assert_eq!(spin_int(0).increments, 0);
        assert_eq!(spin_int(-5).last, 0);
    }

    #[test]
    fn short_loop_widens_at_the_comparison() {
        assert_eq!(
            spin_short(100),
            Induction {
                last: 100,
                increments: 100
            }
        );
        let top = spin_short(i16::MAX as i32);
        assert_eq!(top.last, i16::MAX);
        assert_eq!(top.increments, i16::MAX as u64);
        assert_eq!(spin_short(-1).increments, 0);
    }

    #[test]
    fn short_induction_wraps_past_the_top() {
        let values: Vec<i32> = short_inductions().skip(32766).take(4).collect();
        assert_eq!(values, vec![32766, 32767, -32768, -32767]);
        assert_eq!(short_inductions().nth(32768), Some(-32768));
        assert_eq!(short_inductions().nth(65536), Some(0));
        assert_eq!(next_short(-1), 0);
    }

    #[test]
    fn many_numeric_constants() {
        let constants = use_many_numeric();
        assert_eq!(constants.i, 100);
        assert_eq!(constants.j, 1_000_000);
        assert_eq!(constants.l1, 1);
        assert_eq!(constants.l2, 4_294_967_295);
        assert_ne!(constants.l2, -1);
        assert_eq!(constants.d, 2.2);
    }

    #[test]
    fn double_loop() {
        assert_eq!(
            spin_double(100.0),
            Induction {
                last: 100.0,
                increments: 100
            }
        );
        assert_eq!(spin_double(0.5).increments, 1);
        let nan = spin_double(f64::NAN);
        assert_eq!(nan.increments, 0);
        assert_eq!(nan.last, 0.0);
    }

    #[test]
    fn alignment() {
        for grain in [1, 2, 4, 8, 64, 4096] {
            for i in [-4097, -1, 0, 1, 7, 8, 9, 100, 4095, 4096, 4097] {
                let aligned = align2grain(i, grain);
                assert_eq!(aligned % grain, 0, "align2grain({}, {})", i, grain);
                assert!(aligned >= i && aligned - i < grain, "align2grain({}, {})", i, grain);
            }
        }
        assert_eq!(align2grain(13, 8), 16);
        assert_eq!(align2grain(16, 8), 16);

        // The top multiple of the grain wraps around
        assert_eq!(align2grain(i32::MAX, 16), i32::MIN);

        // Not a power of two: the formula as written
        assert_eq!(align2grain(5, 3), (5 + 3 - 1) & !2);
    }

    #[test]
    fn comparisons_with_nan() {
        assert_eq!(less_than100(99.0), 1);
        assert_eq!(less_than100(100.0), -1);
        assert_eq!(less_than100(f64::NAN), -1);
        assert_eq!(less_than100(f64::NEG_INFINITY), 1);
        assert_eq!(greater_than100(101.0), 1);
        assert_eq!(greater_than100(100.0), -1);
        assert_eq!(greater_than100(f64::NAN), -1);
        assert_eq!(greater_than100(f64::INFINITY), 1);
    }
}
