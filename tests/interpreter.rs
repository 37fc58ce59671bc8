mod common;

#[cfg(test)]
mod interpreter_tests {
    use loxwalk as lox;

    use lox::config::{Config, DumpFormat};
    use lox::error::{EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};
    use pretty_assertions::assert_eq;

    use super::common::{output_of, run, Session};

    /// A run that must fail: (stdout, stderr, exit status).
    fn failure(source: &str) -> (String, String, i32) {
        let (out, err, outcome) = run(source);
        let exit = outcome.expect_err("run should fail");
        (out, err, exit.status)
    }

    // ───────────────────────── expressions ─────────────────────────

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(output_of("print 2 + 3 * 4;"), "14\n");
        assert_eq!(output_of("print (2 + 3) * 4;"), "20\n");
        assert_eq!(output_of("print 2 ** 3 ** 2;"), "512\n");
        assert_eq!(output_of("print 10 - 4 - 3;"), "3\n");
        assert_eq!(output_of("print -2 ** 2;"), "4\n");
    }

    #[test]
    fn test_number_printing() {
        assert_eq!(output_of("print 7 / 2;"), "3.5\n");
        assert_eq!(output_of("print 1 / 0;"), "nan\n");
        assert_eq!(output_of("print -1 / 0;"), "nan\n");
        assert_eq!(output_of("print 3.0;"), "3\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(output_of("print \"foo\" + \"bar\";"), "foobar\n");
    }

    #[test]
    fn test_type_discipline() {
        let (_, err, status) = failure("print 1 + \"a\";");
        assert_eq!(
            err,
            "[line 1] RuntimeError at '+': Operands must be two numbers or two strings.\n"
        );
        assert_eq!(status, EXIT_RUNTIME_ERROR);

        let (_, err, _) = failure("print \"a\" < \"b\";");
        assert_eq!(err, "[line 1] RuntimeError at '<': Operands must be numbers.\n");

        let (_, err, _) = failure("print -\"x\";");
        assert_eq!(err, "[line 1] RuntimeError at '-': Operand must be a number.\n");
    }

    #[test]
    fn test_equality_never_coerces() {
        assert_eq!(
            output_of("print 1 == \"1\"; print nil == false; print \"a\" == \"a\"; print nil == nil; print 0 / 0 == 0 / 0;"),
            "false\nfalse\ntrue\ntrue\nfalse\n"
        );
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(
            output_of("print !nil; print !false; print !0; print !\"\";"),
            "true\ntrue\nfalse\nfalse\n"
        );
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        assert_eq!(
            output_of("print nil or \"x\"; print 1 and 2; print false and boom; print 1 or boom;"),
            "x\n2\nfalse\n1\n"
        );
    }

    #[test]
    fn test_ternary_evaluates_one_branch() {
        assert_eq!(
            output_of("print true ? 1 : boom; print nil ? 1 : false ? 2 : 3;"),
            "1\n3\n"
        );
    }

    #[test]
    fn test_undefined_variable() {
        let (_, err, status) = failure("print nope;");
        assert_eq!(err, "[line 1] RuntimeError at 'nope': Undefined variable 'nope'.\n");
        assert_eq!(status, EXIT_RUNTIME_ERROR);

        let (_, err, _) = failure("nope = 1;");
        assert_eq!(err, "[line 1] RuntimeError at 'nope': Undefined variable 'nope'.\n");
    }

    // ───────────────────────── statements & scope ──────────────────

    #[test]
    fn test_shadowing() {
        assert_eq!(
            output_of("var a = \"global\"; { var a = \"local\"; print a; } print a;"),
            "local\nglobal\n"
        );
    }

    #[test]
    fn test_closures_bind_at_resolution() {
        let source = "
            var a = \"global\";
            {
                fun show() { print a; }
                show();
                var a = \"block\";
                show();
            }
        ";

        assert_eq!(output_of(source), "global\nglobal\n");
    }

    #[test]
    fn test_own_initializer_is_a_static_error() {
        let (out, err, status) = failure("print 1; { var a = 1; { var a = a; } }");

        assert_eq!(out, "");
        assert!(err.contains("Cannot read local variable in its own initializer."));
        assert_eq!(status, EXIT_STATIC_ERROR);

        let (out, err, status) = failure("{ var a = (a = 1); print a; }");

        assert_eq!(out, "");
        assert_eq!(
            err,
            "[line 1] ResolutionError at 'a': Cannot read local variable in its own initializer.\n"
        );
        assert_eq!(status, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_loops() {
        assert_eq!(
            output_of("for (var i = 0; i < 3; i = i + 1) print i;"),
            "0\n1\n2\n"
        );
        assert_eq!(
            output_of("var i = 3; while (i > 0) { print i; i = i - 1; }"),
            "3\n2\n1\n"
        );
    }

    #[test]
    fn test_loop_closures_share_the_loop_variable() {
        let source = "
            var first;
            for (var i = 0; i < 3; i = i + 1) {
                if (first == nil) first = fun () { return i; };
            }
            print first();
        ";

        assert_eq!(output_of(source), "3\n");
    }

    #[test]
    fn test_switch() {
        let source = "
            var n = 0;
            fun next() { n = n + 1; return n; }
            switch (next()) {
                1 => print \"one\";
                2 => print \"two\";
                _ => print \"other\";
            }
            print n;
        ";
        assert_eq!(output_of(source), "one\n1\n");

        let falls_through = "
            var n = 0;
            fun next() { n = n + 1; return n + 10; }
            switch (next()) {
                1 => print \"a\";
                2 => print \"b\";
                3 => print \"c\";
                _ => print \"d\";
            }
            print n;
        ";
        assert_eq!(output_of(falls_through), "d\n1\n");

        assert_eq!(
            output_of("switch (5) { 1 => print 1; _ => { print \"default\"; } }"),
            "default\n"
        );
        assert_eq!(output_of("switch (5) { 1 => print 1; }"), "");
        assert_eq!(
            output_of("var s = \"b\"; switch (s) { \"a\" => print 1; \"b\" => print 2; }"),
            "2\n"
        );
    }

    // ───────────────────────── functions ───────────────────────────

    #[test]
    fn test_closure_counter() {
        let source = "
            fun makeCounter() {
                var i = 0;
                fun count() { i = i + 1; return i; }
                return count;
            }
            var c = makeCounter();
            print c();
            print c();
            var d = makeCounter();
            print d();
            print c();
        ";

        assert_eq!(output_of(source), "1\n2\n1\n3\n");
    }

    #[test]
    fn test_return_unwinds_to_call() {
        let source = "
            fun f() {
                var i = 0;
                while (true) {
                    i = i + 1;
                    if (i == 3) return i;
                }
            }
            print f();
            fun g() {}
            print g();
        ";

        assert_eq!(output_of(source), "3\nnil\n");
    }

    #[test]
    fn test_mutual_recursion_between_globals() {
        let source = "
            fun isEven(n) { if (n == 0) return true; return isOdd(n - 1); }
            fun isOdd(n) { if (n == 0) return false; return isEven(n - 1); }
            print isEven(10);
            print isOdd(7);
        ";

        assert_eq!(output_of(source), "true\ntrue\n");
    }

    #[test]
    fn test_recursion() {
        let source = "fun fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } print fib(15);";

        assert_eq!(output_of(source), "610\n");
    }

    #[test]
    fn test_anonymous_functions() {
        assert_eq!(
            output_of("var add = fun (a, b) { return a + b; }; print add(2, 3);"),
            "5\n"
        );
        assert_eq!(output_of("print (fun (x) { return x * 2; })(21);"), "42\n");
    }

    #[test]
    fn test_arity_errors_name_expected_and_found() {
        let (_, err, status) = failure("fun f(a, b) {} f(1);");

        assert_eq!(err, "[line 1] RuntimeError at '(': Expected 2 arguments but got 1.\n");
        assert_eq!(status, EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn test_only_callables_can_be_called() {
        let (_, err, _) = failure("\"x\"();");
        assert_eq!(err, "[line 1] RuntimeError at '(': Can only call functions and classes.\n");
    }

    #[test]
    fn test_callable_display() {
        assert_eq!(
            output_of("fun f() {} print f; print fun () {}; class A {} print A; print A();"),
            "<fn f>\n<fn>\nA\nA instance\n"
        );
    }

    #[test]
    fn test_recursion_limit() {
        let (_, err, status) = failure("fun f() { f(); } f();");

        assert!(err.contains("Maximum recursion depth exceeded."), "got: {}", err);
        assert_eq!(status, EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn test_recursion_limit_is_configurable() {
        let mut session = Session::with_config(Config {
            reduced_errors: true,
            max_call_depth: 10,
            ..Config::default()
        });

        let source = "fun down(n) { if (n == 0) return 0; return down(n - 1); }";
        assert!(session.run(source).is_ok());
        assert!(session.run("print down(9);").is_ok());
        assert!(session.run("print down(10);").is_err());
        assert_eq!(session.stdout(), "0\n");
    }

    // ───────────────────────── classes ─────────────────────────────

    #[test]
    fn test_class_with_initializer() {
        let source = "
            class Point {
                init(x, y) { this.x = x; this.y = y; }
                sum() { return this.x + this.y; }
            }
            var p = Point(1, 2);
            print p.sum();
            print p.x;
            var q = p.init(5, 6);
            print q == p;
            print p.sum();
        ";

        assert_eq!(output_of(source), "3\n1\ntrue\n11\n");
    }

    #[test]
    fn test_bound_methods_keep_their_receiver() {
        let source = "
            class Box { init(n) { this.n = n; } get() { return this.n; } }
            var a = Box(1);
            var g = a.get;
            var b = Box(2);
            print g();
            print b.get();
        ";

        assert_eq!(output_of(source), "1\n2\n");
    }

    #[test]
    fn test_field_defaults() {
        let source = "
            class Counter { count = 10; var label; }
            var c = Counter();
            print c.count;
            print c.label;
            c.count = 11;
            print c.count;
            print Counter().count;
        ";

        assert_eq!(output_of(source), "10\nnil\n11\n10\n");
    }

    #[test]
    fn test_instances_compare_by_identity() {
        assert_eq!(
            output_of("class A {} var a = A(); var b = A(); print a == a; print a == b;"),
            "true\nfalse\n"
        );
    }

    #[test]
    fn test_property_errors() {
        let (_, err, _) = failure("var x = 1; print x.y;");
        assert_eq!(err, "[line 1] RuntimeError at 'y': Only instances have properties.\n");

        let (_, err, _) = failure("class A {} print A().nope;");
        assert_eq!(err, "[line 1] RuntimeError at 'nope': Undefined property 'nope'.\n");

        let (_, err, _) = failure("var x = 1; x.y = 2;");
        assert_eq!(err, "[line 1] RuntimeError at 'y': Only instances have fields.\n");

        let (_, err, _) = failure("class A { init(a) {} } A();");
        assert_eq!(err, "[line 1] RuntimeError at '(': Expected 1 arguments but got 0.\n");
    }

    // ───────────────────────── sessions & driver ───────────────────

    #[test]
    fn test_output_before_runtime_error_is_kept() {
        let (out, _, status) = failure("print 1; print nil + 1; print 2;");

        assert_eq!(out, "1\n");
        assert_eq!(status, EXIT_RUNTIME_ERROR);
    }

    #[test]
    fn test_static_errors_prevent_execution() {
        let (out, err, status) = failure("print 1; print ;");
        assert_eq!(out, "");
        assert_eq!(err, "[line 1] SyntaxError at ';': Expect expression.\n");
        assert_eq!(status, EXIT_STATIC_ERROR);

        let (out, err, status) = failure("print 1; $");
        assert_eq!(out, "");
        assert_eq!(err, "[line 1] LexicalError at '$': Unexpected character '$'.\n");
        assert_eq!(status, EXIT_STATIC_ERROR);
    }

    #[test]
    fn test_session_keeps_globals_between_runs() {
        let mut session = Session::new();

        assert!(session.run("var a = 1;").is_ok());
        assert!(session.run("fun f() { return a + 1; }").is_ok());
        assert!(session.run("print f();").is_ok());
        assert!(session.run("print b;").is_err());
        assert!(session.run("print a;").is_ok());

        assert_eq!(session.stdout(), "2\n1\n");
        assert_eq!(session.stderr(), "[line 1] RuntimeError at 'b': Undefined variable 'b'.\n");
    }

    #[test]
    fn test_session_closures_survive_later_runs() {
        let mut session = Session::new();

        assert!(session
            .run("fun mk() { var x = 10; fun g() { return x; } return g; }")
            .is_ok());
        assert!(session.run("var g = mk();").is_ok());
        assert!(session.run("{ var y = 5; print g() + y; }").is_ok());
        assert!(session.run("print g();").is_ok());

        assert_eq!(session.stdout(), "15\n10\n");
    }

    #[test]
    fn test_errors_in_earlier_runs_point_at_their_own_source() {
        let mut session = Session::new();

        assert!(session.run("fun f(a) {\n  return a + 1;\n}").is_ok());
        let exit = session.run("\n\nprint f(\"x\");").unwrap_err();

        assert_eq!(exit.status, EXIT_RUNTIME_ERROR);
        assert_eq!(
            session.stderr(),
            "[line 2] RuntimeError at '+': Operands must be two numbers or two strings.\n"
        );
    }

    #[test]
    fn test_rejected_run_does_not_disturb_the_session() {
        let mut session = Session::new();

        assert!(session.run("{ var a = (a = 1); print a; }").is_err());
        assert!(session.run("var b = 2; { var c = b; print c; }").is_ok());

        assert_eq!(session.stdout(), "2\n");
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(output_of("print 1;\r\nprint 2;\r\n"), "1\n2\n");
    }

    #[test]
    fn test_full_diagnostic_rendering() {
        let mut session = Session::with_config(Config::default());
        let outcome = session.run("var a = 1;\nprint a + ;\n");

        assert!(outcome.is_err());
        assert_eq!(
            session.stderr(),
            format!(
                "\n\t2 | print a + ;\n\t{}^\nSyntaxError: Line 2: Expect expression.\n",
                " ".repeat(14)
            )
        );
    }

    #[test]
    fn test_dump_tokens() {
        let mut session = Session::with_config(Config {
            dump_tokens: true,
            stop_after_parse: true,
            ..Config::default()
        });

        assert!(session.run("1 + x;").is_ok());
        assert_eq!(
            session.stdout(),
            "NUMBER 1 1.0\nPLUS + null\nIDENTIFIER x null\nSEMICOLON ; null\nEOF  null\n"
        );
    }

    #[test]
    fn test_dump_ast_and_stop() {
        let mut session = Session::with_config(Config {
            dump_ast: true,
            stop_after_parse: true,
            ..Config::default()
        });

        assert!(session.run("print 1 + 2; print nope;").is_ok());
        assert_eq!(session.stdout(), "(print (+ 1.0 2.0))\n(print nope)\n");
    }

    #[test]
    fn test_json_token_dump() {
        let mut session = Session::with_config(Config {
            dump_tokens: true,
            stop_after_parse: true,
            dump_format: DumpFormat::Json,
            ..Config::default()
        });

        assert!(session.run("print 2;").is_ok());

        let dumped: serde_json::Value = serde_json::from_str(&session.stdout()).unwrap();
        let tokens = dumped.as_array().unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0]["token_type"], "PRINT");
        assert_eq!(tokens[1]["token_type"]["NUMBER"], 2.0);
        assert_eq!(tokens[1]["lexeme"], "2");
    }

    #[test]
    fn test_stop_after_resolve_still_checks_scopes() {
        let config = Config {
            stop_after_resolve: true,
            reduced_errors: true,
            ..Config::default()
        };

        let mut session = Session::with_config(config.clone());
        assert!(session.run("print 1;").is_ok());
        assert_eq!(session.stdout(), "");

        let mut session = Session::with_config(config);
        assert!(session.run("return 1;").is_err());
        assert_eq!(
            session.stderr(),
            "[line 1] ResolutionError at 'return': Can't return from top-level code.\n"
        );
    }
}
