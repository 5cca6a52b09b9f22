//! Canonical `OpenQASM` 2.0 text from an AST.

use std::fmt::Write as _;

use crate::ast::{GateCall, GateDecl, OpaqueDecl, Program, RegisterRef, Statement};

/// Emit a program as canonical QASM 2.0 source code.
///
/// One statement per line, gate bodies indented by two spaces, and
/// expressions printed with the fewest parentheses that preserve their tree.
/// Parsing the output yields the same AST minus source positions.
pub fn emit(program: &Program) -> String {
    let mut emitter = Emitter::new();
    for statement in &program.statements {
        emitter.emit_statement(statement);
    }
    emitter.output
}

struct Emitter {
    output: String,
    indent: usize,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Version(v) => self.writeln(&format!("OPENQASM {}.{};", v.major, v.minor)),
            Statement::Include(inc) => self.writeln(&format!("include \"{}\";", inc.path)),
            Statement::Register(reg) => {
                self.writeln(&format!("{} {}[{}];", reg.kind, reg.name, reg.size));
            }
            Statement::GateDecl(decl) => self.emit_gate_decl(decl),
            Statement::Opaque(decl) => self.emit_opaque(decl),
            Statement::GateCall(call) => self.writeln(&format!("{};", format_call(call))),
            Statement::Measure(m) => {
                self.writeln(&format!("measure {} -> {};", m.source, m.target));
            }
            Statement::Reset(r) => self.writeln(&format!("reset {};", r.target)),
            Statement::Barrier(b) => {
                self.writeln(&format!("barrier {};", format_args_list(&b.targets)));
            }
            Statement::If(cond) => self.writeln(&format!(
                "if ({} == {}) {};",
                cond.creg,
                cond.value,
                format_call(&cond.body)
            )),
        }
    }

    fn emit_gate_decl(&mut self, decl: &GateDecl) {
        self.writeln(&format!(
            "gate {} {{",
            format_header(&decl.name, &decl.params, &decl.qargs)
        ));
        self.indent += 1;
        for call in &decl.body {
            self.writeln(&format!("{};", format_call(call)));
        }
        self.indent -= 1;
        self.writeln("}");
    }

    fn emit_opaque(&mut self, decl: &OpaqueDecl) {
        self.writeln(&format!(
            "opaque {};",
            format_header(&decl.name, &decl.params, &decl.qargs)
        ));
    }

    fn writeln(&mut self, line: &str) {
        let indent = "  ".repeat(self.indent);
        self.output.push_str(&indent);
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// `name(p, q) a, b`, omitting empty parentheses.
fn format_header(name: &str, params: &[String], qargs: &[String]) -> String {
    let mut header = name.to_string();
    if !params.is_empty() {
        let _ = write!(header, "({})", params.join(", "));
    }
    let _ = write!(header, " {}", qargs.join(", "));
    header
}

fn format_call(call: &GateCall) -> String {
    let mut text = call.name.clone();
    if !call.params.is_empty() {
        let params: Vec<String> = call.params.iter().map(ToString::to_string).collect();
        let _ = write!(text, "({})", params.join(", "));
    }
    let _ = write!(text, " {}", format_args_list(&call.qargs));
    text
}

fn format_args_list(args: &[RegisterRef]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::{ParseMode, parse_program};

    fn roundtrip(source: &str) -> String {
        let program = parse_program(tokenize(source).unwrap(), ParseMode::Circuit).unwrap();
        emit(&program)
    }

    #[test]
    fn test_emit_bell_state() {
        let qasm = roundtrip(
            "OPENQASM 2.0; include \"qelib1.inc\"; qreg q[2]; creg c[2]; h q[0]; cx q[0],q[1]; measure q -> c;",
        );

        assert_eq!(
            qasm,
            "OPENQASM 2.0;\n\
             include \"qelib1.inc\";\n\
             qreg q[2];\n\
             creg c[2];\n\
             h q[0];\n\
             cx q[0], q[1];\n\
             measure q -> c;\n"
        );
    }

    #[test]
    fn test_emit_gate_definition() {
        let qasm = roundtrip("gate r(theta,phi) a,b { U((theta),-(phi+1),pi/2) a; CX a,b; }");

        assert_eq!(
            qasm,
            "gate r(theta, phi) a, b {\n  U(theta, -(phi + 1), pi / 2) a;\n  CX a, b;\n}\n"
        );
    }

    #[test]
    fn test_emit_opaque_and_empty_body() {
        assert_eq!(roundtrip("opaque m() a;"), "opaque m a;\n");
        assert_eq!(roundtrip("gate nop a {}"), "gate nop a {\n}\n");
    }

    #[test]
    fn test_emit_other_statements() {
        let qasm = roundtrip("reset q[0]; barrier q,r[1]; if(c==2) u1(0.5) q[0];");

        assert_eq!(
            qasm,
            "reset q[0];\nbarrier q, r[1];\nif (c == 2) u1(0.5) q[0];\n"
        );
    }

    #[test]
    fn test_emit_is_fixed_point() {
        let source = "OPENQASM 2.0; gate g(a) q { rz(-a^2 - (a - 1) * 2e3) q; } qreg q[1]; g(2^-1) q;";
        let once = roundtrip(source);
        let twice = roundtrip(&once);
        assert_eq!(once, twice);
    }
}
