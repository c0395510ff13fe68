#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use minipas::analyzer::SemanticVisitor;
use minipas::ir::{Instr, IrGenerator, Label, Operand};
use minipas::optimizer::{eval_binary, eval_unary, Optimizer, Value};
use minipas::parser::Parser;

const STEP_LIMIT: usize = 100_000;

/// Parses, checks and lowers `source`.
pub fn lower(source: &str) -> Vec<Instr> {
    let program = Parser::new(source).unwrap().parse().unwrap();
    SemanticVisitor::new().visit_program(&program).unwrap();
    IrGenerator::new().generate(&program)
}

pub fn optimize(code: Vec<Instr>) -> Vec<Instr> {
    Optimizer::new(minipas::MAX_OPTIMIZER_PASSES).optimize(code).code
}

pub fn render(code: &[Instr]) -> Vec<String> {
    code.iter().map(|i| i.to_string()).collect()
}

fn show(value: &Value) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Real(r) if r.fract() == 0.0 => format!("{}", *r as i64),
        Value::Real(r) => r.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Int(n) => *n != 0,
        Value::Real(r) => *r != 0.0,
        Value::Bool(b) => *b,
        Value::Text(s) => !s.is_empty(),
    }
}

/// Executes intermediate code, feeding `input` to `read` and returning what
/// `write` printed, one entry per write.
pub fn run(code: &[Instr], input: &[&str]) -> Vec<String> {
    let labels: HashMap<Label, usize> = code
        .iter()
        .enumerate()
        .filter_map(|(i, instr)| match instr {
            Instr::Label(l) => Some((*l, i)),
            _ => None,
        })
        .collect();
    let mut input: VecDeque<&str> = input.iter().copied().collect();
    let mut env: HashMap<Operand, Value> = HashMap::new();
    let mut output = vec![];

    let get = |env: &HashMap<Operand, Value>, o: &Operand| -> Value {
        match o {
            Operand::Const(c) => Value::parse(c).unwrap_or_else(|| panic!("bad constant {}", c)),
            name => env
                .get(name)
                .cloned()
                .unwrap_or_else(|| panic!("{} read before written", name)),
        }
    };

    let mut pc = 0;
    let mut steps = 0;
    while pc < code.len() {
        steps += 1;
        assert!(steps < STEP_LIMIT, "program does not terminate");
        let mut next = pc + 1;
        match &code[pc] {
            Instr::Assign { dest, src } => {
                let v = get(&env, src);
                env.insert(dest.clone(), v);
            }
            Instr::Init { dest, value } => {
                env.insert(dest.clone(), Value::parse(value).unwrap());
            }
            Instr::Op { dest, lhs, op, rhs } => {
                let v = eval_binary(*op, &get(&env, lhs), &get(&env, rhs))
                    .unwrap_or_else(|| panic!("cannot evaluate {}", code[pc]));
                env.insert(dest.clone(), v);
            }
            Instr::Unary { dest, op, operand } => {
                let v = eval_unary(*op, &get(&env, operand)).unwrap();
                env.insert(dest.clone(), v);
            }
            Instr::Goto(l) => next = labels[l],
            Instr::If { label, cond } => {
                if truthy(&get(&env, cond)) {
                    next = labels[label];
                }
            }
            Instr::IfFalse { label, cond } => {
                if !truthy(&get(&env, cond)) {
                    next = labels[label];
                }
            }
            Instr::Label(_) => (),
            Instr::Read(dest) => {
                let raw = input.pop_front().expect("input exhausted");
                let v = Value::parse(raw).unwrap_or_else(|| Value::Text(raw.to_string()));
                env.insert(dest.clone(), v);
            }
            Instr::Write(src) => output.push(show(&get(&env, src))),
        }
        pc = next;
    }
    output
}
