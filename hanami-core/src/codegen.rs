//! Code-generation orchestration.
//!
//! Each target language has its own emitter module with no shared
//! mutable state; a failure in one backend is captured in that target's
//! map slot and never suppresses the others. Emission is a pure
//! function of the AST, so it can run without semantic analysis having
//! happened (best-effort output for invalid programs).

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::ast::{Decl, FunctionDecl, Namespace, Program};
use crate::error::{CodegenError, CoreError};
use crate::{codegen_cpp, codegen_java, codegen_js, codegen_python};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Cpp,
    Python,
    JavaScript,
    Java,
}

impl Target {
    pub fn all() -> [Target; 4] {
        [Target::Cpp, Target::Python, Target::JavaScript, Target::Java]
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Cpp => "cpp",
            Target::Python => "python",
            Target::JavaScript => "javascript",
            Target::Java => "java",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cpp" | "c++" => Ok(Target::Cpp),
            "python" | "py" => Ok(Target::Python),
            "javascript" | "js" => Ok(Target::JavaScript),
            "java" => Ok(Target::Java),
            other => Err(CoreError::UnknownTarget(other.to_string())),
        }
    }
}

/// Generated text (or the captured failure) per requested target.
pub type GeneratedCode = BTreeMap<Target, Result<String, CodegenError>>;

/// Emit the program for every requested target independently.
pub fn generate(program: &Program, targets: &[Target]) -> GeneratedCode {
    let mut output = GeneratedCode::new();
    for &target in targets {
        let result = match target {
            Target::Cpp => codegen_cpp::emit(program),
            Target::Python => codegen_python::emit(program),
            Target::JavaScript => codegen_js::emit(program),
            Target::Java => codegen_java::emit(program),
        };
        output.insert(target, result);
    }
    output
}

/// Pick the function a runnable translation unit should start from:
/// `main` wins, then `mainGarden`, then a sole parameterless free
/// function. Programs with none of these are emitted library-style,
/// without an entry point.
pub fn entry_function(garden: &Namespace) -> Option<&FunctionDecl> {
    let functions: Vec<&FunctionDecl> = garden
        .declarations
        .iter()
        .filter_map(|decl| match decl {
            Decl::FunctionDecl(function) => Some(function),
            _ => None,
        })
        .collect();

    functions
        .iter()
        .find(|f| f.name == "main")
        .or_else(|| functions.iter().find(|f| f.name == "mainGarden"))
        .or_else(|| {
            if functions.len() == 1 && functions[0].parameters.is_empty() {
                functions.first()
            } else {
                None
            }
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn parse_program(source: &str) -> Program {
        parse(&lex(source).expect("lex")).expect("parse")
    }

    #[test]
    fn all_four_targets_are_emitted_independently() {
        let program = parse_program("garden G\ngrow f() -> void { bloom << \"hi\"; }");
        let output = generate(&program, &Target::all());
        assert_eq!(output.len(), 4);
        for (target, result) in &output {
            let text = result.as_ref().unwrap_or_else(|e| panic!("{target}: {e}"));
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn only_requested_targets_appear() {
        let program = parse_program("garden G\ngrow f() -> void { blossom; }");
        let output = generate(&program, &[Target::Python]);
        assert_eq!(output.len(), 1);
        assert!(output.contains_key(&Target::Python));
    }

    #[test]
    fn entry_point_prefers_main_then_main_garden() {
        let program = parse_program(
            "garden G\ngrow helper() -> void { blossom; }\ngrow mainGarden() -> void { blossom; }",
        );
        assert_eq!(
            entry_function(&program.garden).map(|f| f.name.as_str()),
            Some("mainGarden")
        );

        let program = parse_program("garden G\ngrow calculate() -> int { blossom 1; }");
        assert_eq!(
            entry_function(&program.garden).map(|f| f.name.as_str()),
            Some("calculate")
        );

        let program = parse_program(
            "garden G\ngrow a() -> void { blossom; }\ngrow b() -> void { blossom; }",
        );
        assert!(entry_function(&program.garden).is_none());
    }

    #[test]
    fn target_names_parse_back() {
        for target in Target::all() {
            assert_eq!(target.name().parse::<Target>().expect("parse"), target);
        }
        assert!("fortran".parse::<Target>().is_err());
    }
}
