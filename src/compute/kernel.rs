use crate::compute::bytecode::OpCode;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    DivisionByZero,
    /// Stack underflow, leftover operands, or an unresolved load.
    Malformed,
}

/// Evaluates one postfix tape against a slice of node values.
#[inline]
pub fn evaluate(tape: &[OpCode], values: &[f64]) -> Result<f64, Fault> {
    let mut stack: SmallVec<[f64; 16]> = SmallVec::new();

    for op in tape {
        match *op {
            OpCode::Literal(v) => stack.push(v),
            OpCode::Load(slot) => {
                let v = values.get(slot as usize).copied().ok_or(Fault::Malformed)?;
                stack.push(v);
            }
            OpCode::Neg => {
                let top = stack.last_mut().ok_or(Fault::Malformed)?;
                *top = -*top;
            }
            binary => {
                let rhs = stack.pop().ok_or(Fault::Malformed)?;
                let lhs = stack.last_mut().ok_or(Fault::Malformed)?;
                *lhs = match binary {
                    OpCode::Add => *lhs + rhs,
                    OpCode::Sub => *lhs - rhs,
                    OpCode::Mul => *lhs * rhs,
                    OpCode::Div => {
                        if rhs == 0.0 {
                            return Err(Fault::DivisionByZero);
                        }
                        *lhs / rhs
                    }
                    OpCode::Min => lhs.min(rhs),
                    OpCode::Max => lhs.max(rhs),
                    _ => return Err(Fault::Malformed),
                };
            }
        }
    }

    match stack.as_slice() {
        [v] => Ok(*v),
        _ => Err(Fault::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[OpCode::Literal(2.0), OpCode::Load(0), OpCode::Mul], 21.0)]
    #[case(&[OpCode::Load(0), OpCode::Literal(4.0), OpCode::Sub, OpCode::Neg], -6.5)]
    #[case(&[OpCode::Load(0), OpCode::Literal(3.0), OpCode::Min], 3.0)]
    #[case(&[OpCode::Load(0), OpCode::Literal(3.0), OpCode::Max], 10.5)]
    #[case(&[OpCode::Load(0), OpCode::Literal(2.0), OpCode::Div], 5.25)]
    fn test_evaluate(#[case] tape: &[OpCode], #[case] expected: f64) {
        assert_eq!(evaluate(tape, &[10.5]), Ok(expected));
    }

    #[test]
    fn test_division_by_zero_faults() {
        let tape = [OpCode::Literal(1.0), OpCode::Load(0), OpCode::Div];
        assert_eq!(evaluate(&tape, &[0.0]), Err(Fault::DivisionByZero));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[OpCode::Add])]
    #[case(&[OpCode::Literal(1.0), OpCode::Literal(2.0)])]
    #[case(&[OpCode::Load(7)])]
    fn test_malformed_tapes(#[case] tape: &[OpCode]) {
        assert_eq!(evaluate(tape, &[1.0]), Err(Fault::Malformed));
    }
}
