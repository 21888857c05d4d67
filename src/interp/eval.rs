//! Tree-walking evaluator.
//!
//! Input statements read from the caller-supplied map and never consume its
//! entries; the first name missing from the map suspends the run. Arithmetic
//! follows the promotion rules in the language reference: integers stay exact
//! where possible, division falls back to floats, and `+` concatenates when
//! either side is a string.

use std::collections::HashMap;

use super::ast::{BinOp, DeclType, Expr, Stmt, UnaryOp};
use super::env::Environment;
use super::{EngineError, Outcome, Value};
use crate::protocol::InputMap;

const MAX_CALL_DEPTH: usize = 200;

pub struct Evaluator<'a> {
    inputs: &'a InputMap,
    env: Environment,
    functions: HashMap<String, Function>,
    output: String,
    depth: usize,
}

#[derive(Clone)]
struct Function {
    params: Vec<String>,
    body: Vec<Stmt>,
}

/// Why a statement stopped executing early.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Conditions that unwind the whole run.
enum Interrupt {
    Error(String),
    NeedInput(String),
}

fn fail<T>(message: impl Into<String>) -> Result<T, Interrupt> {
    Err(Interrupt::Error(message.into()))
}

impl<'a> Evaluator<'a> {
    pub fn new(inputs: &'a InputMap) -> Self {
        Evaluator {
            inputs,
            env: Environment::new(),
            functions: HashMap::new(),
            output: String::new(),
            depth: 0,
        }
    }

    pub fn run(mut self, program: &[Stmt]) -> Result<Outcome, EngineError> {
        match self.exec_all(program) {
            Ok(Flow::Normal) => Ok(Outcome::Finished(self.output)),
            Ok(Flow::Return(_)) => Err(EngineError::Runtime("'slay' outside of a function".into())),
            Ok(Flow::Break) => Err(EngineError::Runtime("'and_i_oop' outside of a loop".into())),
            Ok(Flow::Continue) => Err(EngineError::Runtime("'as_if' outside of a loop".into())),
            Err(Interrupt::NeedInput(variable)) => Ok(Outcome::NeedsInput(variable)),
            Err(Interrupt::Error(message)) => Err(EngineError::Runtime(message)),
        }
    }

    fn exec_all(&mut self, stmts: &[Stmt]) -> Result<Flow, Interrupt> {
        for stmt in stmts {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, Interrupt> {
        match stmt {
            Stmt::Print(expr) => {
                let value = self.eval(expr)?;
                self.output.push_str(&value.to_string());
                self.output.push('\n');
                Ok(Flow::Normal)
            }
            Stmt::Input(name) => {
                match self.inputs.get(name) {
                    Some(supplied) => {
                        // an undeclared target silently drops the value
                        self.env.assign(name, Value::Str(supplied.to_string()));
                        Ok(Flow::Normal)
                    }
                    None => Err(Interrupt::NeedInput(name.clone())),
                }
            }
            Stmt::Declare { ty, name, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                let value = if value == Value::Null {
                    default_for(*ty)
                } else {
                    value
                };
                self.env.define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value } => {
                let value = self.eval(value)?;
                if self.env.assign(name, value) {
                    Ok(Flow::Normal)
                } else {
                    fail(format!("Undefined variable: {}", name))
                }
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.eval(condition)?.is_truthy() {
                    match self.exec_stmt(body)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                match self.exec_stmt(init)? {
                    Flow::Normal => {}
                    flow => return Ok(flow),
                }
                while self.eval(condition)?.is_truthy() {
                    match self.exec_stmt(body)? {
                        Flow::Break => break,
                        // `as_if` skips the rest of the body but still updates
                        Flow::Normal | Flow::Continue => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                    match self.exec_stmt(update)? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function { name, params, body } => {
                self.functions.insert(
                    name.clone(),
                    Function {
                        params: params.clone(),
                        body: body.clone(),
                    },
                );
                Ok(Flow::Normal)
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Block(stmts) => {
                self.env.push_scope();
                let result = self.exec_all(stmts);
                self.env.pop_scope();
                result
            }
            Stmt::Expression(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, Interrupt> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Variable(name) => match self.env.get(name) {
                Some(value) => Ok(value.clone()),
                None => fail(format!("Undefined variable: {}", name)),
            },
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                unary(*op, value)
            }
            Expr::Binary { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, left, right)
            }
            Expr::Call { name, args } => {
                let function = match self.functions.get(name) {
                    Some(function) => function.clone(),
                    None => return fail(format!("'{}' is not a function", name)),
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                self.call(function, values)
            }
        }
    }

    fn call(&mut self, function: Function, args: Vec<Value>) -> Result<Value, Interrupt> {
        if self.depth >= MAX_CALL_DEPTH {
            return fail("Maximum recursion depth exceeded");
        }
        self.depth += 1;
        self.env.push_frame();
        for (i, param) in function.params.iter().enumerate() {
            // missing arguments bind as ghost; extras are dropped
            let value = args.get(i).cloned().unwrap_or(Value::Null);
            self.env.define(param.clone(), value);
        }
        let flow = self.exec_all(&function.body);
        self.env.pop_frame();
        self.depth -= 1;
        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Break => fail("'and_i_oop' outside of a loop"),
            Flow::Continue => fail("'as_if' outside of a loop"),
        }
    }
}

fn default_for(ty: DeclType) -> Value {
    match ty {
        DeclType::Lit => Value::Int(0),
        DeclType::Tea => Value::Str(String::new()),
        DeclType::Mood => Value::Bool(false),
        DeclType::Stan => Value::List(Vec::new()),
    }
}

enum Nums {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric(l: &Value, r: &Value) -> Option<Nums> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(Nums::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Some(Nums::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Some(Nums::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(Nums::Floats(*a, *b)),
        _ => None,
    }
}

fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Int(0)) || matches!(value, Value::Float(f) if *f == 0.0)
}

fn overflow<T>() -> Result<T, Interrupt> {
    fail("Integer overflow")
}

fn unary(op: UnaryOp, value: Value) -> Result<Value, Interrupt> {
    match op {
        UnaryOp::Neg => match value {
            Value::Int(n) => match n.checked_neg() {
                Some(n) => Ok(Value::Int(n)),
                None => overflow(),
            },
            Value::Float(f) => Ok(Value::Float(-f)),
            other => fail(format!("Cannot negate {}", other.type_name())),
        },
        UnaryOp::Pos => match value {
            Value::Int(_) | Value::Float(_) => Ok(value),
            other => fail(format!("Cannot apply unary '+' to {}", other.type_name())),
        },
    }
}

fn binary(op: BinOp, l: Value, r: Value) -> Result<Value, Interrupt> {
    match op {
        BinOp::Add => {
            if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
                return Ok(Value::Str(format!("{}{}", l, r)));
            }
            match numeric(&l, &r) {
                Some(Nums::Ints(a, b)) => match a.checked_add(b) {
                    Some(n) => Ok(Value::Int(n)),
                    None => overflow(),
                },
                Some(Nums::Floats(a, b)) => Ok(Value::Float(a + b)),
                None => fail(format!(
                    "Cannot add {} and {}",
                    l.type_name(),
                    r.type_name()
                )),
            }
        }
        BinOp::Sub => match numeric(&l, &r) {
            Some(Nums::Ints(a, b)) => match a.checked_sub(b) {
                Some(n) => Ok(Value::Int(n)),
                None => overflow(),
            },
            Some(Nums::Floats(a, b)) => Ok(Value::Float(a - b)),
            None => fail(format!(
                "Cannot subtract {} from {}",
                r.type_name(),
                l.type_name()
            )),
        },
        BinOp::Mul => match numeric(&l, &r) {
            Some(Nums::Ints(a, b)) => match a.checked_mul(b) {
                Some(n) => Ok(Value::Int(n)),
                None => overflow(),
            },
            Some(Nums::Floats(a, b)) => Ok(Value::Float(a * b)),
            None => fail(format!(
                "Cannot multiply {} and {}",
                l.type_name(),
                r.type_name()
            )),
        },
        BinOp::Div => {
            if is_zero(&r) {
                return fail("Division by zero");
            }
            match numeric(&l, &r) {
                // integer division stays exact when it divides evenly
                Some(Nums::Ints(a, b)) => match a.checked_rem(b) {
                    Some(0) => match a.checked_div(b) {
                        Some(n) => Ok(Value::Int(n)),
                        None => overflow(),
                    },
                    Some(_) => Ok(Value::Float(a as f64 / b as f64)),
                    None => overflow(),
                },
                Some(Nums::Floats(a, b)) => Ok(Value::Float(a / b)),
                None => fail(format!(
                    "Cannot divide {} by {}",
                    l.type_name(),
                    r.type_name()
                )),
            }
        }
        BinOp::Mod => {
            if is_zero(&r) {
                return fail("Division by zero");
            }
            match numeric(&l, &r) {
                // the result takes the divisor's sign
                Some(Nums::Ints(a, b)) => match a.checked_rem(b) {
                    Some(m) if m != 0 && (m < 0) != (b < 0) => Ok(Value::Int(m + b)),
                    Some(m) => Ok(Value::Int(m)),
                    None => overflow(),
                },
                Some(Nums::Floats(a, b)) => {
                    let m = a % b;
                    if m != 0.0 && (m < 0.0) != (b < 0.0) {
                        Ok(Value::Float(m + b))
                    } else {
                        Ok(Value::Float(m))
                    }
                }
                None => fail(format!(
                    "Cannot take the remainder of {} and {}",
                    l.type_name(),
                    r.type_name()
                )),
            }
        }
        BinOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => compare(op, l, r),
    }
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match numeric(l, r) {
        Some(Nums::Ints(a, b)) => a == b,
        Some(Nums::Floats(a, b)) => a == b,
        None => l == r,
    }
}

fn compare(op: BinOp, l: Value, r: Value) -> Result<Value, Interrupt> {
    use std::cmp::Ordering;

    let ord = match (&l, &r) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match numeric(&l, &r) {
            Some(Nums::Ints(a, b)) => Some(a.cmp(&b)),
            Some(Nums::Floats(a, b)) => a.partial_cmp(&b),
            None => None,
        },
    };
    match ord {
        Some(ord) => {
            let result = match op {
                BinOp::Lt => ord == Ordering::Less,
                BinOp::Gt => ord == Ordering::Greater,
                BinOp::Le => ord != Ordering::Greater,
                BinOp::Ge => ord != Ordering::Less,
                _ => false,
            };
            Ok(Value::Bool(result))
        }
        None => fail(format!(
            "Cannot compare {} and {}",
            l.type_name(),
            r.type_name()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::super::run;
    use super::*;

    fn finish(source: &str) -> String {
        match run(source, &InputMap::new()) {
            Ok(Outcome::Finished(out)) => out,
            other => panic!("expected completion, got {:?}", other),
        }
    }

    fn finish_with(source: &str, inputs: &InputMap) -> String {
        match run(source, inputs) {
            Ok(Outcome::Finished(out)) => out,
            other => panic!("expected completion, got {:?}", other),
        }
    }

    fn runtime_err(source: &str) -> String {
        match run(source, &InputMap::new()) {
            Err(EngineError::Runtime(message)) => message,
            other => panic!("expected a runtime error, got {:?}", other),
        }
    }

    #[test]
    fn block_locals_do_not_leak() {
        let src = "lit x = 1;\n\
                   lets_go lit x = 2; spill_the_tea(x); yeet\n\
                   spill_the_tea(x);";
        assert_eq!(finish(src), "2\n1\n");
        assert_eq!(
            runtime_err("lets_go lit y = 1; yeet spill_the_tea(y);"),
            "Undefined variable: y"
        );
    }

    #[test]
    fn functions_see_globals_but_not_caller_locals() {
        let src = "lit g = 10;\n\
                   rizz_up show() lets_go spill_the_tea(g); yeet\n\
                   show();";
        assert_eq!(finish(src), "10\n");
        let src = "rizz_up peek() lets_go spill_the_tea(hidden); yeet\n\
                   rizz_up outer() lets_go lit hidden = 1; peek(); yeet\n\
                   outer();";
        assert_eq!(runtime_err(src), "Undefined variable: hidden");
    }

    #[test]
    fn missing_arguments_bind_as_ghost() {
        let src = "rizz_up pair(a, b) lets_go spill_the_tea(a); spill_the_tea(b); yeet\n\
                   pair(1);";
        assert_eq!(finish(src), "1\nghost\n");
    }

    #[test]
    fn function_without_return_yields_ghost() {
        let src = "rizz_up noop() lets_go yeet spill_the_tea(noop());";
        assert_eq!(finish(src), "ghost\n");
    }

    #[test]
    fn calling_a_non_function_is_an_error() {
        assert_eq!(runtime_err("nope(1);"), "'nope' is not a function");
    }

    #[test]
    fn recursion_depth_is_bounded() {
        let src = "rizz_up spin() lets_go slay spin(); yeet spin();";
        assert_eq!(runtime_err(src), "Maximum recursion depth exceeded");
    }

    #[test]
    fn break_outside_a_loop_is_an_error() {
        assert_eq!(runtime_err("and_i_oop;"), "'and_i_oop' outside of a loop");
        let src = "rizz_up f() lets_go and_i_oop; yeet f();";
        assert_eq!(runtime_err(src), "'and_i_oop' outside of a loop");
    }

    #[test]
    fn return_escapes_nested_loops() {
        let src = "rizz_up find() lets_go\n\
                     highkey (lit i = 0; i < 10; i = i + 1) lets_go\n\
                       no_cap (i == 2) slay i;\n\
                     yeet\n\
                   yeet\n\
                   spill_the_tea(find());";
        assert_eq!(finish(src), "2\n");
    }

    #[test]
    fn equality_promotes_numbers_but_not_types() {
        assert_eq!(finish("spill_the_tea(2 / 2 == 1);"), "this_slaps\n");
        // a float produced by division compares equal to the integer it names
        assert_eq!(finish("spill_the_tea(3 / 2 * 2 == 3);"), "this_slaps\n");
        assert_eq!(finish("spill_the_tea(\"1\" == 1);"), "im_dead\n");
        assert_eq!(finish("spill_the_tea(ghost == ghost);"), "this_slaps\n");
        assert_eq!(finish("spill_the_tea(1 != 2);"), "this_slaps\n");
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert_eq!(finish("spill_the_tea(\"apple\" < \"banana\");"), "this_slaps\n");
        assert_eq!(
            runtime_err("spill_the_tea(\"apple\" < 1);"),
            "Cannot compare tea and lit"
        );
    }

    #[test]
    fn remainder_takes_the_divisor_sign() {
        assert_eq!(finish("spill_the_tea(0 - 7 % 3);"), "-1\n");
        assert_eq!(finish("spill_the_tea((0 - 7) % 3);"), "2\n");
        assert_eq!(finish("spill_the_tea(7 % (0 - 3));"), "-2\n");
    }

    #[test]
    fn arithmetic_overflow_is_an_error() {
        assert_eq!(
            runtime_err("spill_the_tea(9223372036854775807 + 1);"),
            "Integer overflow"
        );
    }

    #[test]
    fn negation_rejects_non_numbers() {
        assert_eq!(runtime_err("spill_the_tea(-\"x\");"), "Cannot negate tea");
    }

    #[test]
    fn truthiness_covers_every_type() {
        let src = "no_cap (\"\") spill_the_tea(1); cap spill_the_tea(0);\n\
                   no_cap (\"x\") spill_the_tea(1); cap spill_the_tea(0);\n\
                   no_cap (ghost) spill_the_tea(1); cap spill_the_tea(0);\n\
                   stan empty; no_cap (empty) spill_the_tea(1); cap spill_the_tea(0);";
        assert_eq!(finish(src), "0\n1\n0\n0\n");
    }

    #[test]
    fn input_to_undeclared_name_is_dropped() {
        let inputs: InputMap = [("phantom", "42")].into_iter().collect();
        let src = "vibe_check phantom; spill_the_tea(\"done\");";
        assert_eq!(finish_with(src, &inputs), "done\n");
    }

    #[test]
    fn inputs_are_reread_not_consumed() {
        let inputs: InputMap = [("n", "7")].into_iter().collect();
        let src = "tea n;\n\
                   lit i = 0;\n\
                   lowkey (i < 2) lets_go vibe_check n; spill_the_tea(n); i = i + 1; yeet";
        assert_eq!(finish_with(src, &inputs), "7\n7\n");
    }

    #[test]
    fn continue_still_runs_the_for_update() {
        let src = "highkey (lit i = 0; i < 5; i = i + 1) lets_go\n\
                     no_cap (i == 2) as_if;\n\
                     spill_the_tea(i);\n\
                   yeet";
        assert_eq!(finish(src), "0\n1\n3\n4\n");
    }

    #[test]
    fn redeclaring_a_function_replaces_it() {
        let src = "rizz_up f() lets_go slay 1; yeet\n\
                   rizz_up f() lets_go slay 2; yeet\n\
                   spill_the_tea(f());";
        assert_eq!(finish(src), "2\n");
    }
}
