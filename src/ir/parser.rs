use crate::ir::{BinaryOp, Instruction, Value, Variable};
use chumsky::prelude::*;
use chumsky::Parser;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("IR parse error at byte {offset}: {message}")]
pub struct IrParseError {
    pub offset: usize,
    pub message: String,
}

/// Reads a textual IR listing, one `(KIND, result, operand...)` tuple per
/// instruction, e.g. `(ADD, $0, a, 5)` or `(RET, , $0)`.
pub fn parse(source: &str) -> Result<Vec<Instruction>, Vec<IrParseError>> {
    parser().parse(source).into_result().map_err(|errs| {
        errs.into_iter()
            .map(|e| IrParseError {
                offset: e.span().start,
                message: e.to_string(),
            })
            .collect()
    })
}

fn parser<'src>() -> impl Parser<'src, &'src str, Vec<Instruction>, extra::Err<Rich<'src, char>>> {
    let comma = just(',').padded();

    /*
     * Operand atoms
     * `a`, `$3`, `-12`
     */
    let named = text::ident()
        .padded()
        .map(|name: &str| Variable::Named(name.to_string()));

    let temporary = just('$')
        .ignore_then(text::int(10))
        .try_map(|digits: &str, span| {
            digits
                .parse::<u32>()
                .map_err(|err| Rich::custom(span, format!("invalid temporary '${}': {}", digits, err)))
        })
        .padded()
        .map(Variable::Temporary);

    let variable = temporary.or(named);

    let immediate = just('-')
        .or_not()
        .then(text::int(10))
        .to_slice()
        .try_map(|digits: &str, span| {
            digits
                .parse::<i32>()
                .map_err(|err| Rich::custom(span, format!("invalid immediate '{}': {}", digits, err)))
        })
        .padded();

    let value = variable
        .clone()
        .map(Value::Var)
        .or(immediate.map(Value::Imm));

    /*
     * Instruction bodies
     * MOV, dest, src
     * RET, , value
     * OP, dest, lhs, rhs
     */
    let mov = text::keyword("MOV")
        .padded()
        .ignore_then(comma.clone())
        .ignore_then(variable.clone())
        .then_ignore(comma.clone())
        .then(value.clone())
        .map(|(dest, src)| Instruction::Mov { dest, src });

    let ret = text::keyword("RET")
        .padded()
        .ignore_then(comma.clone())
        .ignore_then(comma.clone().or_not())
        .ignore_then(value.clone())
        .map(|value| Instruction::Ret { value });

    let binary_op = choice((
        text::keyword("ADD").to(BinaryOp::Add),
        text::keyword("SUB").to(BinaryOp::Sub),
        text::keyword("MUL").to(BinaryOp::Mul),
        text::keyword("GT").to(BinaryOp::Gt),
        text::keyword("LT").to(BinaryOp::Lt),
        text::keyword("CMOV").to(BinaryOp::CMov),
    ))
    .padded();

    let binary = binary_op
        .then_ignore(comma.clone())
        .then(variable)
        .then_ignore(comma.clone())
        .then(value.clone())
        .then_ignore(comma)
        .then(value)
        .map(|(((op, dest), lhs), rhs)| Instruction::Binary { op, dest, lhs, rhs });

    let instruction = choice((mov, ret, binary))
        .delimited_by(just('('), just(')'))
        .padded();

    instruction.repeated().collect::<Vec<_>>().then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_listing() {
        let source = "
            (MOV, a, 10)
            (ADD, $0, a, -5)
            (CMOV, $1, $0, a)
            (RET, , $1)
        ";
        let a = Variable::named("a");
        let ir = parse(source).unwrap();
        assert_eq!(
            ir,
            vec![
                Instruction::mov(a.clone(), 10),
                Instruction::add(Variable::temp(0), a.clone(), -5),
                Instruction::cmov(Variable::temp(1), Variable::temp(0), a),
                Instruction::ret(Variable::temp(1)),
            ]
        );
    }

    #[test]
    fn test_parse_accepts_short_return() {
        let ir = parse("(RET, 7)").unwrap();
        assert_eq!(ir, vec![Instruction::ret(7)]);
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let source = "(GT, $2, x, y)\n(MUL, $3, $2, 4)\n(RET, , $3)";
        let ir = parse(source).unwrap();
        let rendered: Vec<String> = ir.iter().map(ToString::to_string).collect();
        assert_eq!(rendered.join("\n"), "(GT, $2, x, y)\n(MUL, $3, $2, 4)\n(RET, , $3)");
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(parse("(ADD, a, 1)").is_err());
        assert!(parse("(MOV, a, 1, 2)").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let errs = parse("(MOV, a, 1)\n(DIV, b, a, 2)").unwrap_err();
        assert!(!errs.is_empty());
        assert!(errs[0].offset >= "(MOV, a, 1)\n".len());
    }

    #[test]
    fn test_parse_rejects_out_of_range_immediate() {
        assert!(parse("(MOV, a, 99999999999)").is_err());
    }
}
