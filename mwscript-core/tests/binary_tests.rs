//! 二进制容器与反汇编的端到端测试

mod common;

use std::sync::Arc;

use common::*;
use mwscript_core::binary::{self, DecodeError, SectionKind};
use mwscript_core::{CompiledScript, Data, Disassembler, MemoryContext, VarType};

const SOURCE: &str = r#"Begin container
short count
float ratio
long total

set ratio to 0.25
while ( count < 8 )
    set count to count + 1
    set total to total + count * ratio * 4
endwhile
if ( player->GameHour > 12 )
    set total to -total
endif
StartScript follower
End"#;

fn run_script(script: &CompiledScript) -> MemoryContext {
    let extensions = Arc::new(standard_extensions());
    let mut context = MemoryContext::new(script);
    context.define_global("gamehour", VarType::Float, Data::Float(13.5));
    run_in(script, extensions, &mut context).unwrap();
    context
}

#[test]
fn test_decoded_script_behaves_identically() {
    let script = compile_ok(SOURCE, &standard_extensions());
    let bytes = binary::encode(&script);
    assert!(binary::is_container(&bytes));

    let decoded = binary::decode(&bytes).unwrap();
    assert_eq!(decoded, script);

    let original = run_script(&script);
    let restored = run_script(&decoded);
    assert_eq!(original.locals.shorts, restored.locals.shorts);
    assert_eq!(original.locals.longs, restored.locals.longs);
    assert_eq!(original.locals.floats, restored.locals.floats);
    assert_eq!(local_int(&restored, &decoded, "total"), -36);
    assert_eq!(
        restored.running_scripts().collect::<Vec<_>>(),
        vec!["follower"]
    );
}

#[test]
fn test_json_form_matches_binary_form() {
    let script = compile_ok(SOURCE, &standard_extensions());
    let json = script.to_json().unwrap();
    let from_json = CompiledScript::from_json(&json).unwrap();
    let from_binary = binary::decode(&binary::encode(&script)).unwrap();
    assert_eq!(from_json, from_binary);
}

#[test]
fn test_every_truncation_is_rejected() {
    let bytes = binary::encode(&compile_ok(SOURCE, &standard_extensions()));
    for len in 0..bytes.len() {
        assert!(binary::decode(&bytes[..len]).is_err(), "length {len}");
    }
}

#[test]
fn test_corrupted_section_directory() {
    let script = compile_ok(SOURCE, &standard_extensions());
    let mut bytes = binary::encode(&script);
    // 把 directory 里第一个 section 的类型改成未知值
    let dir_offset = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    bytes[dir_offset] = 0x7f;
    assert!(matches!(
        binary::decode(&bytes),
        Err(DecodeError::Section(_))
    ));
}

#[test]
fn test_reader_exposes_sections() {
    let script = compile_ok(SOURCE, &standard_extensions());
    let bytes = binary::encode(&script);
    let reader = binary::BinaryReader::from_bytes(&bytes).unwrap();
    assert_eq!(reader.header().section_count, 4);
    for kind in SectionKind::ALL {
        assert!(reader.has_section(kind));
    }
    assert_eq!(reader.read_section(SectionKind::Name).unwrap(), b"container");
}

#[test]
fn test_disassembly_lists_every_instruction() {
    let extensions = standard_extensions();
    let script = compile_ok(SOURCE, &extensions);
    let listing = Disassembler::new(&script).with_extensions(&extensions).render();

    assert!(listing.starts_with("== container ==\n"));
    assert!(listing.contains("short [0] count"));
    assert!(listing.contains("string [0]"));
    assert!(listing.contains("startscript"));
    let code_lines = listing
        .lines()
        .skip_while(|line| *line != "code:")
        .skip(1)
        .count();
    assert_eq!(code_lines, script.code().len());
}
