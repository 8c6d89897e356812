//! 端到端测试：真实脚本的编译与执行

mod common;

use std::sync::{Arc, Mutex};

use common::*;
use mwscript_core::compiler::DiagnosticKind;
use mwscript_core::extensions::codes;
use mwscript_core::{
    CompileError, Data, ErrorHandler, Extensions, MemoryContext, RunOutcome, ScriptCompiler,
    VarType, WarningsMode,
};

const BASIC_LOGIC: &str = r#"Begin basic_logic
; Comment
short one
short two

set one to two

if ( one == two )
    set one to 1
elseif ( two == 1 )
    set one to 2
else
    set one to 3
endif

while ( one < two )
    set one to ( one + 1 )
endwhile

End"#;

const ADD_TOPIC: &str = r#"Begin addtopic

AddTopic "OpenMW Unit Test"

End"#;

const MATH: &str = r#"Begin math

short a
short b
short c
short d
short e

set b to ( a + 1 )
set c to ( a - 1 )
set d to ( b * c )
set e to ( d / a )

End"#;

const ISSUE_3006: &str = r#"Begin issue3006

short a

if ( a == 1 )
    set a to 2
else set a to 3
endif

End"#;

const ISSUE_3725: &str = r#"Begin issue3725

onactivate

if onactivate
    ; do something
endif

End"#;

const ISSUE_4451: &str = r#"Begin, GlassDisplayScript

;[Script body]

End, GlassDisplayScript"#;

const ISSUE_4597: &str = r#"Begin issue4597

short a
short b
short c
short d

set c to 0
set d to 0

if ( a <> b )
    set c to ( c + 1 )
endif
if ( a << b )
    set c to ( c + 1 )
endif
if ( a < b )
    set c to ( c + 1 )
endif

if ( a >< b )
    set d to ( d + 1 )
endif
if ( a >> b )
    set d to ( d + 1 )
endif
if ( a > b )
    set d to ( d + 1 )
endif

End"#;

const ISSUE_4598: &str = r#"Begin issue4598

StartScript kal_S_Pub_Jejubãr_Faraminos

End"#;

const ISSUE_4867: &str = r#"Begin issue4867

float PcMagickaMult :  The gameplay setting fPcBaseMagickaMult - 1.0000

End"#;

const ISSUE_4888: &str = r#"Begin issue4888

if (player->GameHour == 10)
set player->GameHour to 20
endif

End"#;

const ISSUE_5087: &str = r#"Begin Begin

player->sethealth 0
stopscript Begin

End Begin"#;

const ISSUE_5097: &str = r#"Begin issue5097

setscale "0.3"

End"#;

#[test]
fn test_invalid_script_is_unrecoverable() {
    let (result, errors) = compile_with("this is not a valid script", &standard_extensions());
    let err = result.unwrap_err();
    assert!(matches!(err, CompileError::Unrecoverable(_)));
    assert_eq!(err.diagnostic().kind, DiagnosticKind::MissingBegin);
    assert_eq!(errors.error_count(), 1);
}

#[test]
fn test_basic_logic() {
    let extensions = Arc::new(standard_extensions());
    let script = compile_ok(BASIC_LOGIC, &extensions);
    assert_eq!(script.name(), "basic_logic");

    let mut context = MemoryContext::new(&script);
    let outcome = run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    // (one == two) == 0：相等分支把 one 设为 1，循环体不执行
    assert_eq!(local_int(&context, &script, "one"), 1);
    assert_eq!(local_int(&context, &script, "two"), 0);
}

#[test]
fn test_no_extensions() {
    let (result, errors) = compile_with(ADD_TOPIC, &Extensions::new());
    assert!(result.is_ok());
    assert!(!errors.is_good());
    assert!(errors
        .errors()
        .any(|d| d.kind == DiagnosticKind::UnknownInstruction("addtopic".into())));
}

#[test]
fn test_function_receives_string_argument() {
    let mut extensions = standard_extensions();
    let seen = Arc::new(Mutex::new(None::<String>));
    let sink = Arc::clone(&seen);
    extensions
        .install(codes::ADD_TOPIC, move |runtime, _| {
            let topic = runtime.pop_string()?;
            *sink.lock().unwrap() = Some(topic.to_string());
            Ok(())
        })
        .unwrap();
    let extensions = Arc::new(extensions);

    let script = compile_ok(ADD_TOPIC, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(seen.lock().unwrap().as_deref(), Some("OpenMW Unit Test"));
}

#[test]
fn test_math() {
    let extensions = Arc::new(standard_extensions());
    let script = compile_ok(MATH, &extensions);

    for a in 1..1000i16 {
        let mut context = MemoryContext::new(&script);
        set_short(&mut context, &script, "a", a);
        run_in(&script, Arc::clone(&extensions), &mut context).unwrap();

        // 每次写入 short 都截断为 16 位
        let b = a.wrapping_add(1);
        let c = a.wrapping_sub(1);
        let d = (i32::from(b) * i32::from(c)) as i16;
        let e = (i32::from(d) / i32::from(a)) as i16;
        assert_eq!(local_int(&context, &script, "a"), i32::from(a));
        assert_eq!(local_int(&context, &script, "b"), i32::from(b), "a = {a}");
        assert_eq!(local_int(&context, &script, "c"), i32::from(c), "a = {a}");
        assert_eq!(local_int(&context, &script, "d"), i32::from(d), "a = {a}");
        assert_eq!(local_int(&context, &script, "e"), i32::from(e), "a = {a}");
    }
}

#[test]
fn test_issue_3006_same_line_else() {
    let extensions = Arc::new(standard_extensions());
    let script = compile_ok(ISSUE_3006, &extensions);

    // 单行 else 按块形式执行；旧引擎会跳过这里的 set，a 保持 0
    let mut context = MemoryContext::new(&script);
    run_in(&script, Arc::clone(&extensions), &mut context).unwrap();
    assert_eq!(local_int(&context, &script, "a"), 3);

    let mut context = MemoryContext::new(&script);
    set_short(&mut context, &script, "a", 1);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(local_int(&context, &script, "a"), 2);
}

#[test]
fn test_issue_3725_function_as_statement_and_condition() {
    let mut extensions = standard_extensions();
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    extensions
        .install(codes::ON_ACTIVATE, move |runtime, _| {
            *counter.lock().unwrap() += 1;
            runtime.push_integer(1)
        })
        .unwrap();
    let extensions = Arc::new(extensions);

    let script = compile_ok(ISSUE_3725, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(*calls.lock().unwrap(), 2);
}

#[test]
fn test_issue_4451_commas_after_begin_and_end() {
    let script = compile_ok(ISSUE_4451, &standard_extensions());
    assert_eq!(script.name(), "GlassDisplayScript");
}

#[test]
fn test_issue_4597_comparison_aliases() {
    let extensions = Arc::new(standard_extensions());
    let script = compile_ok(ISSUE_4597, &extensions);

    for a in 0..20i16 {
        for b in 0..20i16 {
            let mut context = MemoryContext::new(&script);
            set_short(&mut context, &script, "a", a);
            set_short(&mut context, &script, "b", b);
            run_in(&script, Arc::clone(&extensions), &mut context).unwrap();

            let c = local_int(&context, &script, "c");
            let d = local_int(&context, &script, "d");
            assert_eq!(c == 3, a < b, "a = {a}, b = {b}");
            assert_eq!(d == 3, a > b, "a = {a}, b = {b}");
            assert!(c == 0 || c == 3);
            assert!(d == 0 || d == 3);
        }
    }
}

#[test]
fn test_issue_4598_non_ascii_name() {
    let extensions = Arc::new(standard_extensions());
    let script = compile_ok(ISSUE_4598, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    let running: Vec<_> = context.running_scripts().collect();
    assert_eq!(running, vec!["kal_s_pub_jejubãr_faraminos"]);
}

#[test]
fn test_issue_4867_declaration_trailing_text() {
    let (result, errors) = compile_with(ISSUE_4867, &standard_extensions());
    let script = result.unwrap();
    assert!(errors.is_good());
    assert_eq!(errors.warning_count(), 1);
    assert_eq!(script.locals().search("pcmagickamult"), Some((VarType::Float, 0)));

    // 严格模式下警告升级为错误
    let context = compiler_context();
    let extensions = standard_extensions();
    let mut strict = ErrorHandler::with_warnings_mode(WarningsMode::Strict);
    ScriptCompiler::new(&context, &extensions)
        .compile(ISSUE_4867, &mut strict)
        .unwrap();
    assert!(!strict.is_good());

    let mut ignored = ErrorHandler::with_warnings_mode(WarningsMode::Ignore);
    ScriptCompiler::new(&context, &extensions)
        .compile(ISSUE_4867, &mut ignored)
        .unwrap();
    assert!(ignored.diagnostics().is_empty());
}

#[test]
fn test_issue_4888_explicit_reference_to_global() {
    let extensions = Arc::new(standard_extensions());
    let (result, errors) = compile_with(ISSUE_4888, &extensions);
    let script = result.unwrap();
    assert!(errors.is_good());
    assert!(errors.warnings().all(|d| matches!(
        d.kind,
        DiagnosticKind::ExplicitReferenceIgnored { .. }
    )));

    let mut context = MemoryContext::new(&script);
    context.define_global("GameHour", VarType::Float, Data::Float(10.0));
    run_in(&script, Arc::clone(&extensions), &mut context).unwrap();
    assert_eq!(context.global("gamehour"), Some(Data::Float(20.0)));

    let mut context = MemoryContext::new(&script);
    context.define_global("GameHour", VarType::Float, Data::Float(11.0));
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(context.global("gamehour"), Some(Data::Float(11.0)));
}

#[test]
fn test_issue_5087_keyword_as_script_name() {
    let mut extensions = standard_extensions();
    let health = Arc::new(Mutex::new(None::<(String, f32)>));
    let sink = Arc::clone(&health);
    extensions
        .install(codes::SET_HEALTH_EXPLICIT, move |runtime, _| {
            let object = runtime.pop_string()?.to_string();
            let value = runtime.pop_float()?;
            *sink.lock().unwrap() = Some((object, value));
            Ok(())
        })
        .unwrap();
    let extensions = Arc::new(extensions);

    let script = compile_ok(ISSUE_5087, &extensions);
    assert_eq!(script.name(), "Begin");

    let mut context = MemoryContext::new(&script);
    let outcome = run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(
        health.lock().unwrap().clone(),
        Some(("player".to_string(), 0.0))
    );
}

#[test]
fn test_issue_5097_numeric_string_argument() {
    let mut extensions = standard_extensions();
    let scale = Arc::new(Mutex::new(None::<f32>));
    let sink = Arc::clone(&scale);
    extensions
        .install(codes::SET_SCALE, move |runtime, _| {
            *sink.lock().unwrap() = Some(runtime.pop_float()?);
            Ok(())
        })
        .unwrap();
    let extensions = Arc::new(extensions);

    let script = compile_ok(ISSUE_5097, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(*scale.lock().unwrap(), Some(0.3));
}

#[test]
fn test_non_numeric_string_argument() {
    let (_, errors) = compile_with(
        "begin t\nsetscale \"big\"\nend",
        &standard_extensions(),
    );
    assert!(errors
        .errors()
        .any(|d| d.kind == DiagnosticKind::NotANumber("big".into())));
}

#[test]
fn test_registering_an_extension_makes_a_script_compile() {
    let source = "begin t\nPlaySound \"click\"\nend";
    let mut extensions = standard_extensions();
    assert!(!compiles(source, &extensions));

    extensions
        .register_instruction(
            "PlaySound",
            "S",
            mwscript_core::bytecode::Opcode::segment4(0x2000),
            None,
        )
        .unwrap();
    assert!(compiles(source, &extensions));
}

#[test]
fn test_compilation_is_deterministic() {
    let extensions = standard_extensions();
    let first = compile_ok(ISSUE_4597, &extensions);
    let second = compile_ok(ISSUE_4597, &extensions);
    assert_eq!(first, second);
}

#[test]
fn test_message_box_optional_arguments() {
    let mut extensions = standard_extensions();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    extensions
        .install(codes::MESSAGE_BOX, move |runtime, optional| {
            let format = runtime.pop_string()?.to_string();
            let mut values = Vec::new();
            for _ in 0..optional {
                values.push(runtime.pop_float()?);
            }
            sink.lock().unwrap().push((format, values));
            Ok(())
        })
        .unwrap();
    let extensions = Arc::new(extensions);

    let source = r#"begin msg
short count
set count to 4
MessageBox "Count: %g of %g" count 10
MessageBox "plain"
end"#;
    let script = compile_ok(source, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("Count: %g of %g".to_string(), vec![4.0, 10.0]),
            ("plain".to_string(), vec![]),
        ]
    );
}

#[test]
fn test_while_loop_counts() {
    let extensions = Arc::new(standard_extensions());
    let source = r#"begin counter
long total
short i
while ( i < 10 )
    set i to i + 1
    set total to total + i * 2
endwhile
end"#;
    let script = compile_ok(source, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(local_int(&context, &script, "i"), 10);
    assert_eq!(local_int(&context, &script, "total"), 110);
}

#[test]
fn test_return_ends_the_run() {
    let extensions = Arc::new(standard_extensions());
    let source = r#"begin early
short a
set a to 1
if ( a == 1 )
    return
endif
set a to 2
end"#;
    let script = compile_ok(source, &extensions);
    let mut context = MemoryContext::new(&script);
    let outcome = run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(local_int(&context, &script, "a"), 1);
}

#[test]
fn test_float_arithmetic_and_conversion() {
    let extensions = Arc::new(standard_extensions());
    let source = r#"begin floats
float f
short s
set f to 7 / 2.0
set s to f * 3
end"#;
    let script = compile_ok(source, &extensions);
    let mut context = MemoryContext::new(&script);
    run_in(&script, extensions, &mut context).unwrap();
    assert_eq!(local_float(&context, &script, "f"), 3.5);
    // float 写入 short 时向零截断
    assert_eq!(local_int(&context, &script, "s"), 10);
}
