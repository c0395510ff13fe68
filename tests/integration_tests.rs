mod common;

use minipas::ir::{Instr, Operand};
use minipas::{compile, CompileOptions, ErrorKind};

use common::{lower, optimize, render, run};

fn optimized_options() -> CompileOptions {
    CompileOptions {
        show_intermediate: true,
        optimize: true,
        verbose_trace: false,
    }
}

#[test]
fn constant_assignment_folds_down_to_two_instructions() {
    let c = compile("integer x; begin x <- 5 + 3 end", &optimized_options()).unwrap();
    assert_eq!(
        render(&c.intermediate.as_ref().unwrap().code),
        ["x = 0  // init", "t1 = 5 + 3", "x = t1"]
    );
    let optimized = c.optimized.as_ref().unwrap();
    assert_eq!(render(&optimized.code), ["x = 0  // init", "x = 8"]);
    assert!(!optimized.changed_last_pass);

    let report = c.report.unwrap().to_string();
    assert!(report.contains("instructions before: 3"));
    assert!(report.contains("instructions after:  2"));
    assert!(report.contains("(33.3%)"));
}

#[test]
fn uninitialized_read_warns_but_compiles() {
    let c = compile(
        "integer x, y; begin x <- y + 3 end",
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(c.diagnostics.len(), 1);
    assert!(c.diagnostics[0].message.contains("'y'"));
    assert!(c.target.contains("x = (y + 3)"));
}

#[test]
fn missing_semicolon_points_at_begin() {
    let err = compile("integer x begin end", &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.position(), (1, 11));
    assert!(err.message().contains("'begin'"));
    assert_eq!(
        err.to_string(),
        "syntax error: expected ';', found 'begin' (line 1, column 11)"
    );
}

#[test]
fn error_kinds_by_phase() {
    let lexical = compile("integer x; begin x <- 1 @ end", &CompileOptions::default());
    assert_eq!(lexical.unwrap_err().kind(), ErrorKind::Lexical);

    let unterminated = compile("text s; begin s <- \"abc end", &CompileOptions::default());
    let err = unterminated.unwrap_err();
    assert_eq!(err.message(), "unterminated text literal");
    assert_eq!(err.position(), (1, 20));

    let duplicate = compile("integer x; integer x; begin end", &CompileOptions::default());
    assert_eq!(duplicate.unwrap_err().kind(), ErrorKind::Semantic);
}

#[test]
fn nested_for_restarts_inner_counter() {
    let source = "integer i, j, n; begin \
                  n <- 0 \
                  for i from 1 to 3 do for j from 1 to 2 do n <- n + 1 endfor endfor \
                  write(n, i, j) end";
    let code = lower(source);
    assert_eq!(run(&code, &[]), ["6", "4", "3"]);
    assert_eq!(run(&optimize(code), &[]), ["6", "4", "3"]);

    let c = compile(source, &CompileOptions::default()).unwrap();
    assert!(c.target.contains(
        "    while i <= _end_1:\n        j = 1\n        _end_2 = 2\n        while j <= _end_2:\n"
    ));
}

#[test]
fn for_bound_is_evaluated_once() {
    let source = "integer i, n, k; begin \
                  n <- 3 k <- 0 \
                  for i from 1 to n do n <- n + 1 k <- k + 1 endfor \
                  write(k) end";
    assert_eq!(run(&lower(source), &[]), ["3"]);
}

#[test]
fn empty_and_descending_loops() {
    let source = "integer i, k; begin \
                  k <- 0 \
                  for i from 5 to 1 do k <- k + 1 endfor \
                  for i from 1 to 5 step -1 do k <- k + 1 endfor \
                  for i from 10 to 1 step -3 do write(i) endfor \
                  write(k) end";
    assert_eq!(run(&lower(source), &[]), ["10", "7", "4", "1", "0"]);
}

#[test]
fn reads_feed_the_program() {
    let source = "integer a, b; begin read(a, b) \
                  if a > b then write(a) else write(b) endif \
                  while a > 0 do a <- a - 2 endwhile write(a) end";
    let code = lower(source);
    assert_eq!(run(&code, &["7", "3"]), ["7", "-1"]);
    assert_eq!(run(&optimize(code), &["2", "9"]), ["9", "0"]);
}

#[test]
fn optimizer_keeps_every_user_assignment() {
    let source = "integer a, b, c; real r; begin \
                  a <- 2 * 3 b <- a + 0 c <- b * 1 r <- c / 1 \
                  if a == 6 then c <- 0 * b endif write(r) end";
    let code = lower(source);
    let user_writes = |code: &[Instr]| {
        code.iter()
            .filter(|i| matches!(i.dest(), Some(Operand::Var(_))))
            .count()
    };
    let optimized = optimize(code.clone());
    assert_eq!(user_writes(&optimized), user_writes(&code));
    assert!(optimized.len() < code.len());
    assert_eq!(run(&optimized, &[]), run(&code, &[]));
}

#[test]
fn whole_python_program() {
    let source = "integer n; boolean big; \
                  begin read(n) big <- n > 10 \
                  if big then write(\"big\", n) else write(\"small\") endif end";
    let c = compile(source, &CompileOptions::default()).unwrap();
    assert_eq!(
        c.target,
        "# Generated by minipas\n\
         \n\
         def main():\n\
         \x20   n = 0\n\
         \x20   big = False\n\
         \x20   try:\n\
         \x20       n = int(input(\"Enter a value: \"))\n\
         \x20   except (ValueError, EOFError):\n\
         \x20       n = 0\n\
         \x20   big = (n > 10)\n\
         \x20   if big:\n\
         \x20       print(\"big\", n)\n\
         \x20   else:\n\
         \x20       print(\"small\")\n\
         \n\
         \n\
         if __name__ == '__main__':\n\
         \x20   main()\n"
    );
    assert!(c.diagnostics.is_empty());
}
