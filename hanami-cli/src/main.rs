use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hanami_core::codegen::Target;
use hanami_core::compiler;

/// Command-line driver for the Hanami compiler pipeline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, help = "Input file (defaults to stdin)")]
    input: Option<String>,

    #[arg(short, long, help = "Output file (defaults to stdout)")]
    output: Option<String>,

    #[arg(
        long,
        value_name = "STAGE",
        default_value = "all",
        help = "Pipeline stage to run: lex, parse, analyze, codegen, all"
    )]
    stage: String,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "source",
        help = "Input format: source, tokens (lex dump), ast (JSON)"
    )]
    from: String,

    #[arg(
        long,
        value_name = "LIST",
        default_value = "cpp,python,javascript,java",
        help = "Comma-separated codegen targets"
    )]
    targets: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {path}"))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let targets = parse_targets(&cli.targets)?;
    let output = match cli.stage.as_str() {
        "lex" => run_lex(&cli, &input)?,
        "parse" => run_parse(&cli, &input)?,
        "analyze" => run_analyze(&cli, &input)?,
        "codegen" => run_codegen(&cli, &input, &targets)?,
        "all" => run_all(&cli, &input, &targets)?,
        other => bail!("unknown stage: {other}"),
    };

    match &cli.output {
        Some(path) => write_output(path, output.as_bytes())?,
        None => print!("{output}"),
    }
    Ok(())
}

fn parse_targets(list: &str) -> Result<Vec<Target>> {
    list.split(',')
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().parse::<Target>().map_err(Into::into))
        .collect()
}

fn run_lex(cli: &Cli, input: &str) -> Result<String> {
    expect_format(cli, &["source"])?;
    Ok(compiler::lex_to_dump(input)?)
}

fn run_parse(cli: &Cli, input: &str) -> Result<String> {
    expect_format(cli, &["source", "tokens"])?;
    let program = match cli.from.as_str() {
        "tokens" => compiler::parse_dump(input)?,
        _ => compiler::parse_source(input)?,
    };
    Ok(compiler::program_to_json(&program))
}

fn run_analyze(cli: &Cli, input: &str) -> Result<String> {
    expect_format(cli, &["source", "ast"])?;
    let report = match cli.from.as_str() {
        "ast" => compiler::analyze_json(input)?,
        _ => compiler::analyze_source(input)?,
    };
    Ok(compiler::report_to_json(&report))
}

fn run_codegen(cli: &Cli, input: &str, targets: &[Target]) -> Result<String> {
    expect_format(cli, &["source", "ast"])?;
    let generated = match cli.from.as_str() {
        "ast" => compiler::generate_json(input, targets)?,
        _ => compiler::generate_source(input, targets)?,
    };

    if let [target] = targets {
        // A single target prints bare, ready to pipe into a file.
        return match generated.get(target) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(err)) => bail!("{target}: {err}"),
            None => bail!("target {target} produced no output"),
        };
    }

    let mut out = String::new();
    for (target, result) in &generated {
        match result {
            Ok(text) => {
                out.push_str(&format!("===== {target} =====\n"));
                out.push_str(text);
            }
            Err(err) => {
                out.push_str(&format!("===== {target} (failed) =====\n{err}\n"));
            }
        }
        out.push('\n');
    }
    Ok(out)
}

fn run_all(cli: &Cli, input: &str, targets: &[Target]) -> Result<String> {
    expect_format(cli, &["source"])?;

    let mut out = String::from("# Compilation Pipeline Results\n\n");

    out.push_str("## Lexical Analysis\n");
    out.push_str(&compiler::lex_to_dump(input)?);
    out.push('\n');

    let program = compiler::parse_source(input)?;
    out.push_str("## Abstract Syntax Tree\n");
    out.push_str(&compiler::program_to_json(&program));
    out.push_str("\n\n");

    let report = hanami_core::analyze(&program);
    out.push_str("## Semantic Analysis\n");
    out.push_str(&compiler::report_to_json(&report));
    out.push_str("\n\n");

    out.push_str("## Generated Code\n");
    let generated = hanami_core::generate(&program, targets);
    for (target, result) in &generated {
        match result {
            Ok(text) => {
                out.push_str(&format!("===== {target} =====\n"));
                out.push_str(text);
            }
            Err(err) => {
                out.push_str(&format!("===== {target} (failed) =====\n{err}\n"));
            }
        }
        out.push('\n');
    }
    Ok(out)
}

fn expect_format(cli: &Cli, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&cli.from.as_str()) {
        Ok(())
    } else {
        bail!(
            "stage '{}' does not accept input format '{}' (allowed: {})",
            cli.stage,
            cli.from,
            allowed.join(", ")
        )
    }
}

fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = PathBuf::from(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::tempdir;

    const MATH_TEST: &str = r#"garden MathTest

grow calculate() -> int {
    int a = 10;
    int b = 5 * (a - 3);
    int c = (a + b) % 8;
    bloom << "Result: " << c;
    blossom c;
}
"#;

    fn cli() -> Command {
        Command::cargo_bin("hanami-cli").expect("binary exists")
    }

    #[test]
    fn lexes_a_source_file_to_a_token_dump() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.hanami");
        fs::write(&input_path, MATH_TEST).expect("write input");

        cli()
            .arg("--input")
            .arg(&input_path)
            .arg("--stage")
            .arg("lex")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("GARDEN 1 1"))
            .stdout(predicate::str::contains("IDENTIFIER MathTest 1 8"))
            .stdout(predicate::str::contains("EOF_TOKEN"));
    }

    #[test]
    fn reads_source_from_stdin() {
        cli()
            .arg("--stage")
            .arg("parse")
            .write_stdin(MATH_TEST)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"type\": \"Program\""))
            .stdout(predicate::str::contains("\"name\": \"calculate\""));
    }

    #[test]
    fn token_dump_feeds_back_into_the_parser() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.hanami");
        let dump_path = dir.path().join("tokens.txt");
        fs::write(&input_path, MATH_TEST).expect("write input");

        cli()
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&dump_path)
            .arg("--stage")
            .arg("lex")
            .assert()
            .success();

        cli()
            .arg("--input")
            .arg(&dump_path)
            .arg("--stage")
            .arg("parse")
            .arg("--from")
            .arg("tokens")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"type\": \"Program\""));
    }

    #[test]
    fn ast_json_feeds_back_into_analyze_and_codegen() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.hanami");
        let ast_path = dir.path().join("program.ast.json");
        fs::write(&input_path, MATH_TEST).expect("write input");

        cli()
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&ast_path)
            .arg("--stage")
            .arg("parse")
            .assert()
            .success();

        cli()
            .arg("--input")
            .arg(&ast_path)
            .arg("--stage")
            .arg("analyze")
            .arg("--from")
            .arg("ast")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"errors\": []"));

        cli()
            .arg("--input")
            .arg(&ast_path)
            .arg("--stage")
            .arg("codegen")
            .arg("--from")
            .arg("ast")
            .arg("--targets")
            .arg("cpp")
            .assert()
            .success()
            .stdout(predicate::str::contains("namespace MathTest {"));
    }

    #[test]
    fn semantic_errors_still_exit_successfully_with_a_report() {
        cli()
            .arg("--stage")
            .arg("analyze")
            .write_stdin("garden G\ngrow f() -> void { bloom << missing; }")
            .assert()
            .success()
            .stdout(predicate::str::contains("UndeclaredIdentifier"))
            .stdout(predicate::str::contains("missing"));
    }

    #[test]
    fn parse_errors_fail_with_position_information() {
        cli()
            .arg("--stage")
            .arg("parse")
            .write_stdin("garden G\nint x = (1 + 2;")
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected ')' after expression"))
            .stderr(predicate::str::contains("line 2"));
    }

    #[test]
    fn multiple_targets_print_headed_sections() {
        cli()
            .arg("--stage")
            .arg("codegen")
            .arg("--targets")
            .arg("cpp,python")
            .write_stdin(MATH_TEST)
            .assert()
            .success()
            .stdout(predicate::str::contains("===== cpp ====="))
            .stdout(predicate::str::contains("===== python ====="))
            .stdout(predicate::str::contains(
                "print(\"Result: \", c, sep='', end='')",
            ));
    }

    #[test]
    fn full_pipeline_writes_every_section() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.hanami");
        let output_path = dir.path().join("out.md");
        fs::write(&input_path, MATH_TEST).expect("write input");

        cli()
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&output_path)
            .assert()
            .success();

        let output = fs::read_to_string(&output_path).expect("read output");
        assert!(output.contains("## Lexical Analysis"));
        assert!(output.contains("## Abstract Syntax Tree"));
        assert!(output.contains("## Semantic Analysis"));
        assert!(output.contains("===== java ====="));
        assert!(output.contains("===== javascript ====="));
    }

    #[test]
    fn rejects_unknown_targets() {
        cli()
            .arg("--stage")
            .arg("codegen")
            .arg("--targets")
            .arg("cpp,fortran")
            .write_stdin(MATH_TEST)
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown target language: fortran"));
    }
}
